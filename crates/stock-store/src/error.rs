use thiserror::Error;

use crate::attr::AttrDecodeError;
use crate::key::StoreKey;

/// Errors that can occur when interacting with the stock store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The conditional-write predicate did not hold at write time:
    /// the record is missing or its available quantity dropped below
    /// the requested amount since the snapshot was read.
    #[error("conditional check failed for record [{0}]")]
    ConditionFailed(StoreKey),

    /// The record addressed by an unconditional update does not exist.
    #[error("record not found: [{0}]")]
    RecordNotFound(StoreKey),

    /// The store could not serve the request (throttling, permission,
    /// transient transport failure). Callers are expected to retry
    /// the whole invocation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A typed attribute value failed to decode.
    #[error("attribute decode error: {0}")]
    Decode(#[from] AttrDecodeError),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// True for errors that are per-record domain outcomes rather
    /// than infrastructure failures.
    pub fn is_condition_failure(&self) -> bool {
        matches!(self, StoreError::ConditionFailed(_))
    }
}

/// Result type for stock store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
