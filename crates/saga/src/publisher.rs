//! Event publisher trait and in-memory implementation.
//!
//! The saga's batch verdict is announced to other subsystems on an
//! event bus. The bus itself is an external collaborator; this module
//! defines the seam and an in-memory fake for tests.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SagaError;

/// One event captured by the in-memory publisher.
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub event_type: String,
    pub payload: Value,
}

/// Trait for publishing events downstream.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes one event to the configured bus.
    async fn publish(&self, event_type: &str, payload: Value) -> Result<(), SagaError>;
}

#[derive(Debug, Default)]
struct InMemoryPublisherState {
    events: Vec<PublishedEvent>,
    fail_on_publish: bool,
}

/// In-memory event publisher for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventPublisher {
    bus: String,
    state: Arc<RwLock<InMemoryPublisherState>>,
}

impl InMemoryEventPublisher {
    /// Creates a new in-memory publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a publisher bound to a named bus.
    pub fn for_bus(bus: impl Into<String>) -> Self {
        Self {
            bus: bus.into(),
            state: Arc::default(),
        }
    }

    /// The bus this publisher is bound to.
    pub fn bus(&self) -> &str {
        &self.bus
    }

    /// Configures the publisher to fail on publish calls.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().unwrap().fail_on_publish = fail;
    }

    /// Returns the number of events published.
    pub fn event_count(&self) -> usize {
        self.state.read().unwrap().events.len()
    }

    /// Returns a copy of all published events, in order.
    pub fn published(&self) -> Vec<PublishedEvent> {
        self.state.read().unwrap().events.clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, event_type: &str, payload: Value) -> Result<(), SagaError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_publish {
            return Err(SagaError::Publish("bus rejected the event".to_string()));
        }

        state.events.push(PublishedEvent {
            event_type: event_type.to_string(),
            payload,
        });
        Ok(())
    }
}
