//! Per-item outcomes and the batch result report.

use common::ProductId;
use serde::{Deserialize, Serialize};

/// Failure reasons reported in per-item outcomes and short-circuit
/// batch results. These strings are part of the downstream contract.
pub mod reason {
    /// No stock record matched the requested identifier.
    pub const PRODUCT_NOT_FOUND: &str = "product_not_found_in_db";
    /// The requested quantity was missing, non-numeric, or not positive.
    pub const INVALID_QUANTITY: &str = "invalid_requested_quantity";
    /// The snapshot already showed less stock than requested.
    pub const INSUFFICIENT_STOCK: &str = "insufficient_stock";
    /// The store rejected the write: the record vanished or a
    /// concurrent reservation consumed the stock after the snapshot.
    pub const CONDITION_FAILED: &str = "conditional_check_failed_or_insufficient_stock";
    /// The envelope yielded no requested items.
    pub const NO_REQUESTED_ITEMS: &str = "No requested items found in input";
    /// The envelope yielded no stock records.
    pub const NO_DB_ITEMS: &str = "No DB items found in input (batchGetItem result missing)";
}

/// Terminal state of one requested item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// The conditional write applied; stock moved to reserved.
    Reserved,
    /// The item could not be reserved; see the outcome reason.
    Failed,
}

/// The result of attempting to reserve one requested item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationOutcome {
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    /// Quantity requested for this item.
    pub requested: f64,
    /// Available quantity read from the snapshot; `None` when no
    /// record was found for the item.
    #[serde(rename = "availableBefore")]
    pub available_before: Option<f64>,
    /// Available quantity returned by the store after a successful
    /// write.
    #[serde(rename = "availableAfter", skip_serializing_if = "Option::is_none")]
    pub available_after: Option<f64>,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ReservationOutcome {
    /// Outcome for a successfully reserved item.
    pub fn reserved(
        product_id: ProductId,
        requested: f64,
        available_before: f64,
        available_after: Option<f64>,
    ) -> Self {
        Self {
            product_id,
            requested,
            available_before: Some(available_before),
            available_after,
            status: ItemStatus::Reserved,
            reason: None,
        }
    }

    /// Outcome for an item that failed to reserve.
    pub fn failed(
        product_id: ProductId,
        requested: f64,
        available_before: Option<f64>,
        reason: &str,
    ) -> Self {
        Self {
            product_id,
            requested,
            available_before,
            available_after: None,
            status: ItemStatus::Failed,
            reason: Some(reason.to_string()),
        }
    }

    /// True when the item reached `Reserved`.
    pub fn is_reserved(&self) -> bool {
        self.status == ItemStatus::Reserved
    }
}

/// The full report for one batch invocation.
///
/// `reserved` is true only when every requested item reached
/// `Reserved`; a single failure flips the whole batch. The per-item
/// list is always included so the caller can see exactly which items
/// succeeded or failed and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub reserved: bool,
    pub products: Vec<ReservationOutcome>,
    /// Set only on short-circuit paths (nothing to reserve / no
    /// stock snapshot in the envelope).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BatchResult {
    /// Builds the batch verdict from per-item outcomes.
    pub fn from_outcomes(products: Vec<ReservationOutcome>) -> Self {
        let reserved = products.iter().all(ReservationOutcome::is_reserved);
        Self {
            reserved,
            products,
            reason: None,
        }
    }

    /// A failed result with no per-item outcomes, for envelopes that
    /// yield nothing to work on.
    pub fn empty(reason: &str) -> Self {
        Self {
            reserved: false,
            products: Vec::new(),
            reason: Some(reason.to_string()),
        }
    }
}
