//! Saga error types.

use stock_store::StoreError;
use thiserror::Error;

/// Errors that escape the reservation saga.
///
/// Domain-level failures (bad quantity, unknown product, lost
/// conditional write) never surface here; they are reported as
/// per-item outcomes in the batch result. Only infrastructure
/// failures propagate, so the invoking orchestrator can retry the
/// whole batch.
#[derive(Debug, Error)]
pub enum SagaError {
    /// Stock store error (throttling, permission, transport).
    #[error("stock store error: {0}")]
    Store(#[from] StoreError),

    /// Event publish error.
    #[error("event publish error: {0}")]
    Publish(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
