//! Entity documents and parsing.
//!
//! An entity document is mostly opaque JSON. The two fields the roll-up
//! engine reads, `Resources` and `Components`, are typed here so nothing
//! downstream has to trust the raw shape. Entries of the wrong shape are
//! dropped with a warning instead of failing the whole document.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::error::Category;
use serde_json::{Map, Value};

use crate::entity::name::EntityName;
use crate::error::{Error, Result};
use crate::resources::entry::ResourceLedger;

/// Reference from one entity to a sub-component entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRef {
    #[serde(rename = "Entity")]
    pub entity: EntityName,
    /// Placement, orientation and any other per-component fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A well-formed entity document.
///
/// `Resources` and `Components` keep the order they have in the document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Entity {
    #[serde(
        rename = "Resources",
        default,
        deserialize_with = "lenient_resources",
        skip_serializing_if = "Option::is_none"
    )]
    pub resources: Option<ResourceLedger>,
    #[serde(
        rename = "Components",
        default,
        deserialize_with = "lenient_components",
        skip_serializing_if = "Option::is_none"
    )]
    pub components: Option<IndexMap<String, ComponentRef>>,
    #[serde(rename = "Metadata", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A value of the expected shape, or whatever JSON was there instead.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Parsed(T),
    Other(Value),
}

fn lenient_resources<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<ResourceLedger>, D::Error> {
    lenient_map("Resources", deserializer)
}

fn lenient_components<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<IndexMap<String, ComponentRef>>, D::Error> {
    lenient_map("Components", deserializer)
}

/// Ordered map of well-formed entries. A field that is not an object at all
/// reads as absent.
fn lenient_map<'de, D, T>(
    field: &str,
    deserializer: D,
) -> std::result::Result<Option<IndexMap<String, T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw: Option<Lenient<IndexMap<String, Lenient<T>>>> = Option::deserialize(deserializer)?;
    let entries = match raw {
        None => return Ok(None),
        Some(Lenient::Other(value)) => {
            log::warn!("Ignoring {} that is not an object: {}", field, value);
            return Ok(None);
        }
        Some(Lenient::Parsed(entries)) => entries,
    };

    let map = entries
        .into_iter()
        .filter_map(|(key, entry)| match entry {
            Lenient::Parsed(entry) => Some((key, entry)),
            Lenient::Other(value) => {
                log::warn!("Skipping malformed {} entry '{}': {}", field, key, value);
                None
            }
        })
        .collect();
    Ok(Some(map))
}

/// What a resolve delivers: a parsed entity, or the invalid sentinel when the
/// fetch or the parse failed.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityDocument {
    Valid(Entity),
    Invalid,
}

impl EntityDocument {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Valid(entity) => Some(entity),
            Self::Invalid => None,
        }
    }

    /// The entity's own resources. Always `None` for the invalid sentinel.
    pub fn resources(&self) -> Option<&ResourceLedger> {
        self.as_entity().and_then(|e| e.resources.as_ref())
    }

    pub fn has_components(&self) -> bool {
        self.as_entity()
            .and_then(|e| e.components.as_ref())
            .is_some_and(|c| !c.is_empty())
    }

    /// Components in document order, as `(component name, reference)`.
    pub fn components(&self) -> impl Iterator<Item = (&str, &ComponentRef)> {
        self.as_entity()
            .and_then(|e| e.components.as_ref())
            .into_iter()
            .flatten()
            .map(|(name, component)| (name.as_str(), component))
    }

    /// JSON form. The invalid sentinel renders as
    /// `{"Invalid": "True", "Metadata": {"Entity": "Invalid"}}`.
    pub fn to_json(&self) -> Result<Value> {
        match self {
            Self::Valid(entity) => Ok(serde_json::to_value(entity)?),
            Self::Invalid => Ok(serde_json::json!({
                "Invalid": "True",
                "Metadata": {"Entity": "Invalid"}
            })),
        }
    }
}

impl From<Entity> for EntityDocument {
    fn from(entity: Entity) -> Self {
        Self::Valid(entity)
    }
}

/// Turns a successful response body into an entity.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<Entity>;
}

/// Default parser: the body must be a JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl DocumentParser for JsonParser {
    fn parse(&self, bytes: &[u8]) -> Result<Entity> {
        let first = bytes.iter().find(|b| !b.is_ascii_whitespace());
        if first != Some(&b'{') {
            let value: Value = serde_json::from_slice(bytes)?;
            return Err(Error::InvalidDocument(format!(
                "expected a JSON object, found {}",
                json_kind(&value)
            )));
        }

        // Straight from bytes: going through `Value` would sort object keys.
        serde_json::from_slice(bytes).map_err(|e| match e.classify() {
            Category::Data => Error::InvalidDocument(e.to_string()),
            _ => Error::Json(e),
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
