//! Entity names.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::defaults::{ENTITY_PATH_PREFIX, ENTITY_PATH_SUFFIX};
use crate::error::{Error, Result};

/// A fully qualified entity name, like `Vehicle/Rocket/Starship`.
///
/// Names are compared byte-for-byte and are never trimmed or normalised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityName(String);

impl EntityName {
    /// Create a name, rejecting the empty string.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyEntityName);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Server path for this entity's JSON document.
    ///
    /// Each `/`-separated segment is percent-encoded; the separators are kept.
    pub fn url_path(&self) -> String {
        let encoded: Vec<_> = self.0.split('/').map(urlencoding::encode).collect();
        format!(
            "{}{}{}",
            ENTITY_PATH_PREFIX,
            encoded.join("/"),
            ENTITY_PATH_SUFFIX
        )
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntityName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for EntityName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for EntityName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for EntityName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
