//! Store collaborator for the inventory reservation saga.
//!
//! The underlying store is a key-value service with per-record
//! conditional writes and no multi-item transaction. This crate
//! defines the interface the saga depends on:
//! - [`StockStore`] — batch get, conditional update, unconditional
//!   update (used for rollback)
//! - [`StoreKey`] — the full identifying key of one record
//! - [`StockRecord`] — a schema-flexible record
//! - typed attribute-value decoding for store-serialized records
//!
//! [`InMemoryStockStore`] provides the same semantics in memory for
//! tests and local runs, including the conditional-write predicate.

pub mod attr;
pub mod error;
pub mod key;
pub mod memory;
pub mod record;
pub mod store;

pub use attr::AttrDecodeError;
pub use error::{Result, StoreError};
pub use key::StoreKey;
pub use memory::InMemoryStockStore;
pub use record::StockRecord;
pub use store::{QuantityDelta, ReserveGuard, StockStore};
