use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::StockRecord;

/// Attribute names that identify a record, in the order they are
/// collected into a key: the item identifier plus any partition
/// fields present on the record.
pub const KEY_FIELDS: [&str; 4] = ["productId", "itemId", "tenantId", "branchId"];

/// The full identifying key of one stock record.
///
/// A key carries every identifying field present on the record it was
/// built from; omitting a partition field would target the wrong
/// record in a partitioned table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreKey(BTreeMap<String, String>);

impl StoreKey {
    /// Creates an empty key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the key for a record from whichever of [`KEY_FIELDS`]
    /// it carries.
    pub fn from_record(record: &StockRecord) -> Self {
        let mut key = Self::new();
        for field in KEY_FIELDS {
            if let Some(value) = record.get(field) {
                key.insert(field, key_part(value));
            }
        }
        key
    }

    /// Adds a key field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Returns the value of a key field, if present.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// True when the key has no fields (the record carried no
    /// identifying attribute).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the key fields in attribute-name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, value) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{field}={value}")?;
            first = false;
        }
        Ok(())
    }
}

/// Renders a JSON value as a key part. Keys in the store are scalar;
/// strings are used verbatim and numbers via their decimal form.
fn key_part(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
