//! Inventory reservation saga.
//!
//! Given a batch of requested item/quantity pairs and a snapshot of
//! current stock records, the saga decrements available quantity and
//! increments reserved quantity per record through conditional writes.
//! The store has no multi-item transaction, so all-or-nothing
//! semantics are approximated: if any item in the batch cannot be
//! reserved, every update already applied for the batch is reversed
//! best-effort.
//!
//! Flow per invocation:
//! 1. Normalize the input envelope into requests and stock records.
//! 2. Resolve the quantity attribute names from a sample record.
//! 3. Reserve items one at a time with conditional writes.
//! 4. On any per-item failure, roll back the applied updates.
//! 5. Report the per-item outcomes and overall batch verdict.

pub mod config;
pub mod coordinator;
pub mod envelope;
pub mod error;
pub mod fields;
pub mod handler;
pub mod outcome;
pub mod publisher;
pub mod telemetry;

pub use config::Config;
pub use coordinator::{AppliedUpdate, ReservationSaga};
pub use envelope::{ReservationRequest, extract_requested_items, extract_stock_records};
pub use error::SagaError;
pub use fields::QuantityFields;
pub use handler::ReservationHandler;
pub use outcome::{BatchResult, ItemStatus, ReservationOutcome, reason};
pub use publisher::{EventPublisher, InMemoryEventPublisher, PublishedEvent};
