//! Invocation entry point: envelope in, batch result out.

use chrono::Utc;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::config::Config;
use crate::coordinator::ReservationSaga;
use crate::envelope::{extract_requested_items, extract_stock_records};
use crate::error::Result;
use crate::outcome::BatchResult;
use crate::publisher::EventPublisher;
use stock_store::StockStore;

/// Event type announcing a batch verdict downstream.
pub const RESERVATION_EVENT_TYPE: &str = "PedidoReservado";

/// Ties the saga to its collaborators for one deployment: normalizes
/// the raw envelope, runs the batch, and announces the verdict on the
/// event bus.
///
/// Stateless across invocations; every call works only on the
/// envelope it is handed.
pub struct ReservationHandler<S, P> {
    saga: ReservationSaga<S>,
    publisher: P,
    config: Config,
}

impl<S, P> ReservationHandler<S, P>
where
    S: StockStore,
    P: EventPublisher,
{
    /// Creates a handler over a store and publisher.
    pub fn new(store: S, publisher: P, config: Config) -> Self {
        Self {
            saga: ReservationSaga::new(store),
            publisher,
            config,
        }
    }

    /// Processes one invocation envelope.
    ///
    /// Domain failures come back inside the [`BatchResult`]; only
    /// infrastructure errors surface as `Err`, leaving the retry to
    /// the invoking orchestrator. A publish failure after the saga
    /// completed is logged and swallowed — the verdict already
    /// stands and is returned to the orchestrator either way.
    #[tracing::instrument(skip_all)]
    pub async fn handle(&self, envelope: &Value) -> Result<BatchResult> {
        let requests = extract_requested_items(envelope);
        let records = extract_stock_records(envelope, &self.config.table_name);

        let result = self.saga.reserve_batch(&requests, records).await?;

        let status = if result.reserved { "RESERVED" } else { "FAILED" };
        let payload = json!({
            "batchId": Uuid::new_v4(),
            "status": status,
            "occurredAt": Utc::now(),
            "result": &result,
        });
        if let Err(error) = self
            .publisher
            .publish(RESERVATION_EVENT_TYPE, payload)
            .await
        {
            tracing::error!(%error, "failed to publish reservation verdict");
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::reason;
    use crate::publisher::InMemoryEventPublisher;
    use serde_json::json;
    use stock_store::{InMemoryStockStore, StockRecord};

    async fn seeded_store(records: &[Value]) -> InMemoryStockStore {
        let store = InMemoryStockStore::new();
        for value in records {
            store
                .insert(StockRecord::new(value.as_object().unwrap().clone()))
                .await;
        }
        store
    }

    fn handler(
        store: InMemoryStockStore,
        publisher: InMemoryEventPublisher,
    ) -> ReservationHandler<InMemoryStockStore, InMemoryEventPublisher> {
        ReservationHandler::new(store, publisher, Config::default())
    }

    #[tokio::test]
    async fn successful_batch_publishes_reserved() {
        let store = seeded_store(&[json!({"productId": "A", "stock": 10})]).await;
        let publisher = InMemoryEventPublisher::for_bus("default");
        let h = handler(store, publisher.clone());

        let envelope = json!({
            "detail": {"items": [{"productId": "A", "qty": 4}]},
            "Responses": {"DB Inventario": [{"productId": "A", "stock": 10}]}
        });
        let result = h.handle(&envelope).await.unwrap();

        assert!(result.reserved);
        let events = publisher.published();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, RESERVATION_EVENT_TYPE);
        assert_eq!(events[0].payload["status"], "RESERVED");
        assert_eq!(events[0].payload["result"]["reserved"], true);
    }

    #[tokio::test]
    async fn failed_batch_publishes_failed() {
        let store = seeded_store(&[json!({"productId": "A", "stock": 2})]).await;
        let publisher = InMemoryEventPublisher::new();
        let h = handler(store, publisher.clone());

        let envelope = json!({
            "detail": {"items": [{"productId": "A", "qty": 5}]},
            "Items": [{"productId": "A", "stock": 2}]
        });
        let result = h.handle(&envelope).await.unwrap();

        assert!(!result.reserved);
        assert_eq!(publisher.published()[0].payload["status"], "FAILED");
    }

    #[tokio::test]
    async fn empty_envelope_short_circuits_with_reason() {
        let store = seeded_store(&[]).await;
        let publisher = InMemoryEventPublisher::new();
        let h = handler(store, publisher);

        let result = h.handle(&json!({"detail": {}})).await.unwrap();
        assert!(!result.reserved);
        assert!(result.products.is_empty());
        assert_eq!(result.reason.as_deref(), Some(reason::NO_REQUESTED_ITEMS));
    }

    #[tokio::test]
    async fn publish_failure_does_not_change_the_result() {
        let store = seeded_store(&[json!({"productId": "A", "stock": 10})]).await;
        let publisher = InMemoryEventPublisher::new();
        publisher.set_fail_on_publish(true);
        let h = handler(store, publisher.clone());

        let envelope = json!({
            "items": [{"productId": "A", "qty": 4}],
            "Items": [{"productId": "A", "stock": 10}]
        });
        let result = h.handle(&envelope).await.unwrap();

        assert!(result.reserved);
        assert_eq!(publisher.event_count(), 0);
    }

    #[tokio::test]
    async fn store_outage_surfaces_as_error() {
        let store = seeded_store(&[json!({"productId": "A", "stock": 10})]).await;
        store.set_unavailable_after(0).await;
        let publisher = InMemoryEventPublisher::new();
        let h = handler(store, publisher.clone());

        let envelope = json!({
            "items": [{"productId": "A", "qty": 4}],
            "Items": [{"productId": "A", "stock": 10}]
        });
        let result = h.handle(&envelope).await;

        assert!(result.is_err());
        // Nothing is announced for an aborted invocation.
        assert_eq!(publisher.event_count(), 0);
    }
}
