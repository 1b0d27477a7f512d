//! Quantity attribute-name resolution.
//!
//! Stock record schemas differ across deployments: the attribute
//! holding available quantity goes by several names, and so does the
//! reserved counter. The two names are resolved once per batch and
//! applied to every record in it; batches are assumed
//! schema-homogeneous.

use serde::{Deserialize, Serialize};
use stock_store::StockRecord;

/// Candidate names for the available-quantity attribute, in priority order.
pub const AVAILABLE_CANDIDATES: [&str; 5] =
    ["quantityAvailable", "stock", "available", "quantity", "qty"];

/// Candidate names for the reserved-quantity attribute, in priority order.
pub const RESERVED_CANDIDATES: [&str; 4] = ["quantityReserved", "reserved", "qtyReserved", "held"];

const DEFAULT_AVAILABLE: &str = "stock";
const DEFAULT_RESERVED: &str = "reserved";

/// The resolved attribute names to read and write for one batch.
///
/// Normally inferred from a sample record; callers that know their
/// schema can construct an explicit mapping and inject it into the
/// saga instead, skipping inference entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityFields {
    /// Attribute holding available quantity.
    pub available: String,
    /// Attribute holding reserved quantity.
    pub reserved: String,
}

impl QuantityFields {
    /// Creates an explicit mapping.
    pub fn new(available: impl Into<String>, reserved: impl Into<String>) -> Self {
        Self {
            available: available.into(),
            reserved: reserved.into(),
        }
    }

    /// Picks the first candidate present on the sample record, per
    /// attribute, falling back to the defaults when none match.
    pub fn infer(sample: &StockRecord) -> Self {
        let available = AVAILABLE_CANDIDATES
            .iter()
            .find(|f| sample.contains(f))
            .copied()
            .unwrap_or(DEFAULT_AVAILABLE);
        let reserved = RESERVED_CANDIDATES
            .iter()
            .find(|f| sample.contains(f))
            .copied()
            .unwrap_or(DEFAULT_RESERVED);
        Self::new(available, reserved)
    }
}

impl Default for QuantityFields {
    fn default() -> Self {
        Self::new(DEFAULT_AVAILABLE, DEFAULT_RESERVED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> StockRecord {
        StockRecord::new(value.as_object().unwrap().clone())
    }

    #[test]
    fn infer_prefers_quantity_available() {
        let fields = QuantityFields::infer(&record(json!({
            "quantityAvailable": 10,
            "stock": 99,
            "quantityReserved": 0
        })));
        assert_eq!(fields.available, "quantityAvailable");
        assert_eq!(fields.reserved, "quantityReserved");
    }

    #[test]
    fn infer_walks_candidates_in_order() {
        let fields = QuantityFields::infer(&record(json!({"available": 3, "held": 1})));
        assert_eq!(fields.available, "available");
        assert_eq!(fields.reserved, "held");
    }

    #[test]
    fn infer_defaults_when_nothing_matches() {
        let fields = QuantityFields::infer(&record(json!({"productId": "A"})));
        assert_eq!(fields, QuantityFields::default());
        assert_eq!(fields.available, "stock");
        assert_eq!(fields.reserved, "reserved");
    }

    #[test]
    fn infer_resolves_attributes_independently() {
        let fields = QuantityFields::infer(&record(json!({"qty": 5})));
        assert_eq!(fields.available, "qty");
        assert_eq!(fields.reserved, "reserved");
    }
}
