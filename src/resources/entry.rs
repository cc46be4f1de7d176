//! Resource ledger entries.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resource name -> quantity, in document order.
pub type ResourceLedger = IndexMap<String, ResourceEntry>;

/// A single resource quantity, like `{"Value": 5, "Unit": "kg"}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// Raw quantity. Only numeric values take part in merging.
    #[serde(rename = "Value", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(rename = "Unit", default)]
    pub unit: String,
    /// Entries whose unit could not be converted into `unit`, in the order they were met.
    #[serde(
        rename = "IncompatibleUnits",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub incompatible_units: Vec<ResourceEntry>,
    /// Any other fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceEntry {
    pub fn new(amount: f64, unit: impl Into<String>) -> Self {
        Self {
            value: Some(Value::from(amount)),
            unit: unit.into(),
            ..Default::default()
        }
    }

    /// The quantity as a number, if it is one.
    pub fn amount(&self) -> Option<f64> {
        self.value.as_ref().and_then(Value::as_f64)
    }

    /// Replace the quantity. Non-finite amounts have no JSON form, so they
    /// are refused and the previous value is kept.
    pub fn set_amount(&mut self, amount: f64) -> bool {
        if !amount.is_finite() {
            log::warn!(
                "Refusing non-finite amount {} ({}), keeping {:?}",
                amount,
                self.unit,
                self.value
            );
            return false;
        }
        self.value = Some(Value::from(amount));
        true
    }
}
