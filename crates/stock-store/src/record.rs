use common::ProductId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute names that may carry a record's item identifier, in
/// priority order.
pub const ID_FIELDS: [&str; 4] = ["productId", "itemId", "id", "product_id"];

/// One inventory line, as stored.
///
/// The record schema is not fixed: quantity attributes go by several
/// names across deployments, and partition fields may or may not be
/// present. The record is therefore kept as a plain attribute map and
/// interpreted through resolved field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockRecord(Map<String, Value>);

impl StockRecord {
    /// Creates a record from an attribute map.
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }

    /// Returns an attribute value, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// True when the record carries the attribute.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Reads an attribute as a number.
    ///
    /// Numeric strings are accepted too; store-serialized numbers
    /// arrive as strings when a record skipped typed-value decoding.
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.0.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Writes a numeric attribute.
    pub fn set_number(&mut self, field: &str, value: f64) {
        let number = serde_json::Number::from_f64(value)
            .unwrap_or_else(|| serde_json::Number::from(0));
        self.0.insert(field.to_string(), Value::Number(number));
    }

    /// Returns the record's item identifier from the first of
    /// [`ID_FIELDS`] present.
    pub fn identifier(&self) -> Option<ProductId> {
        for field in ID_FIELDS {
            match self.0.get(field) {
                Some(Value::String(s)) => return Some(ProductId::new(s.clone())),
                Some(Value::Number(n)) => return Some(ProductId::new(n.to_string())),
                _ => {}
            }
        }
        None
    }

    /// Borrows the underlying attribute map.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the record, returning the attribute map.
    pub fn into_attributes(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for StockRecord {
    fn from(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }
}
