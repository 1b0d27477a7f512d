use async_trait::async_trait;

use crate::key::StoreKey;
use crate::record::StockRecord;
use crate::Result;

/// Predicate guarding a conditional write.
///
/// Models "the record exists and its available quantity is at least
/// `min_available` at write time" — the store-side compare-and-swap
/// that makes single-record reservation safe under concurrency.
#[derive(Debug, Clone, PartialEq)]
pub struct ReserveGuard {
    /// The attribute holding available quantity for this batch.
    pub available_field: String,
    /// Minimum available quantity required for the write to apply.
    pub min_available: f64,
}

impl ReserveGuard {
    /// Requires `field >= qty` on the current record.
    pub fn at_least(field: impl Into<String>, qty: f64) -> Self {
        Self {
            available_field: field.into(),
            min_available: qty,
        }
    }
}

/// Signed adjustment of a record's quantity attributes.
///
/// A reservation decrements available and increments reserved; its
/// rollback is the mirror image. A missing reserved attribute is
/// treated as 0 before the adjustment is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityDelta {
    /// The attribute holding available quantity.
    pub available_field: String,
    /// The attribute holding reserved quantity.
    pub reserved_field: String,
    /// Amount added to the available attribute (negative to reserve).
    pub available_by: f64,
    /// Amount added to the reserved attribute.
    pub reserved_by: f64,
}

impl QuantityDelta {
    /// Delta that reserves `qty`: available -= qty, reserved += qty.
    pub fn reserve(available_field: &str, reserved_field: &str, qty: f64) -> Self {
        Self {
            available_field: available_field.to_string(),
            reserved_field: reserved_field.to_string(),
            available_by: -qty,
            reserved_by: qty,
        }
    }

    /// Delta that releases `qty`: available += qty, reserved -= qty.
    /// The reversing write of [`QuantityDelta::reserve`].
    pub fn release(available_field: &str, reserved_field: &str, qty: f64) -> Self {
        Self {
            available_field: available_field.to_string(),
            reserved_field: reserved_field.to_string(),
            available_by: qty,
            reserved_by: -qty,
        }
    }

    /// Applies the delta to a record in place.
    ///
    /// Shared by store implementations so the write semantics
    /// (missing reserved defaults to 0) stay uniform.
    pub fn apply_to(&self, record: &mut StockRecord) {
        let available = record.number(&self.available_field).unwrap_or(0.0);
        let reserved = record.number(&self.reserved_field).unwrap_or(0.0);
        record.set_number(&self.available_field, available + self.available_by);
        record.set_number(&self.reserved_field, reserved + self.reserved_by);
    }
}

/// Core trait for stock store implementations.
///
/// The store offers no multi-record transaction; the only atomicity
/// primitive is the single-record conditional update. All
/// implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Fetches the records addressed by `keys`.
    ///
    /// Missing keys are skipped, batch-get style; the result may be
    /// shorter than the input.
    async fn get_by_keys(&self, keys: &[StoreKey]) -> Result<Vec<StockRecord>>;

    /// Applies `delta` to the record at `key` only if `guard` holds
    /// at write time.
    ///
    /// Returns the post-write record. Fails with
    /// [`StoreError::ConditionFailed`] when the record is missing or
    /// the guard predicate does not hold.
    async fn conditional_update(
        &self,
        key: &StoreKey,
        guard: &ReserveGuard,
        delta: &QuantityDelta,
    ) -> Result<StockRecord>;

    /// Applies `delta` to the record at `key` unconditionally.
    ///
    /// Used for compensating writes, which must not be blocked by
    /// the reservation predicate.
    async fn update(&self, key: &StoreKey, delta: &QuantityDelta) -> Result<StockRecord>;
}

/// Checks a guard against a record's current state.
pub(crate) fn guard_holds(guard: &ReserveGuard, record: &StockRecord) -> bool {
    record
        .number(&guard.available_field)
        .is_some_and(|available| available >= guard.min_available)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> StockRecord {
        StockRecord::new(value.as_object().unwrap().clone())
    }

    #[test]
    fn reserve_delta_moves_quantity_between_fields() {
        let mut rec = record(json!({"stock": 10, "reserved": 1}));
        QuantityDelta::reserve("stock", "reserved", 4.0).apply_to(&mut rec);
        assert_eq!(rec.number("stock"), Some(6.0));
        assert_eq!(rec.number("reserved"), Some(5.0));
    }

    #[test]
    fn missing_reserved_defaults_to_zero() {
        let mut rec = record(json!({"stock": 10}));
        QuantityDelta::reserve("stock", "reserved", 4.0).apply_to(&mut rec);
        assert_eq!(rec.number("reserved"), Some(4.0));
    }

    #[test]
    fn release_reverses_reserve() {
        let mut rec = record(json!({"stock": 10, "reserved": 0}));
        QuantityDelta::reserve("stock", "reserved", 4.0).apply_to(&mut rec);
        QuantityDelta::release("stock", "reserved", 4.0).apply_to(&mut rec);
        assert_eq!(rec.number("stock"), Some(10.0));
        assert_eq!(rec.number("reserved"), Some(0.0));
    }

    #[test]
    fn guard_requires_field_present_and_sufficient() {
        let guard = ReserveGuard::at_least("stock", 4.0);
        assert!(guard_holds(&guard, &record(json!({"stock": 10}))));
        assert!(guard_holds(&guard, &record(json!({"stock": 4}))));
        assert!(!guard_holds(&guard, &record(json!({"stock": 3}))));
        assert!(!guard_holds(&guard, &record(json!({"reserved": 10}))));
    }
}
