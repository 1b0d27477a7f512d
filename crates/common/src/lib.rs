//! Shared types used across the inventory reservation crates.

pub mod types;

pub use types::ProductId;
