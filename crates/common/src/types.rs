use serde::{Deserialize, Serialize};

/// Identifier for a product line in the inventory store.
///
/// Wraps the raw string identifier carried by requests and stock
/// records to prevent mixing it up with other string-based fields
/// (branch ids, tenant ids, event bus names).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_id_preserves_value() {
        let id = ProductId::new("SKU-001");
        assert_eq!(id.as_str(), "SKU-001");
        assert_eq!(id.to_string(), "SKU-001");
    }

    #[test]
    fn product_id_from_conversions() {
        let a = ProductId::from("A");
        let b = ProductId::from("A".to_string());
        assert_eq!(a, b);
    }

    #[test]
    fn product_id_serialization_roundtrip() {
        let id = ProductId::new("SKU-042");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"SKU-042\"");
        let deserialized: ProductId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
