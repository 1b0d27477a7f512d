use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    QuantityDelta, ReserveGuard, Result, StockRecord, StoreError, StoreKey,
    store::{StockStore, guard_holds},
};

#[derive(Debug, Default)]
struct InMemoryStoreState {
    records: HashMap<StoreKey, StockRecord>,
    conditional_updates: usize,
    unconditional_updates: usize,
    // Test switches.
    unavailable_after: Option<usize>,
    fail_on_update: bool,
}

/// In-memory stock store implementation for testing.
///
/// Provides the same interface and conditional-write semantics as the
/// external key-value store: the guard is evaluated against the
/// record's state at write time, under the write lock.
#[derive(Clone, Default)]
pub struct InMemoryStockStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

impl InMemoryStockStore {
    /// Creates a new empty in-memory stock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, keyed by its identifying fields.
    pub async fn insert(&self, record: StockRecord) {
        let key = StoreKey::from_record(&record);
        self.state.write().await.records.insert(key, record);
    }

    /// Returns the current record at `key`, if any.
    pub async fn get(&self, key: &StoreKey) -> Option<StockRecord> {
        self.state.read().await.records.get(key).cloned()
    }

    /// Returns the number of stored records.
    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }

    /// Returns the number of conditional updates attempted so far,
    /// successful or not.
    pub async fn conditional_update_count(&self) -> usize {
        self.state.read().await.conditional_updates
    }

    /// Returns the number of unconditional updates applied.
    pub async fn update_count(&self) -> usize {
        self.state.read().await.unconditional_updates
    }

    /// Configures the store to answer `Unavailable` on every
    /// conditional update after the first `n` attempts.
    pub async fn set_unavailable_after(&self, n: usize) {
        self.state.write().await.unavailable_after = Some(n);
    }

    /// Configures unconditional updates to fail with `Unavailable`.
    pub async fn set_fail_on_update(&self, fail: bool) {
        self.state.write().await.fail_on_update = fail;
    }
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    async fn get_by_keys(&self, keys: &[StoreKey]) -> Result<Vec<StockRecord>> {
        let state = self.state.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| state.records.get(key).cloned())
            .collect())
    }

    async fn conditional_update(
        &self,
        key: &StoreKey,
        guard: &ReserveGuard,
        delta: &QuantityDelta,
    ) -> Result<StockRecord> {
        let mut state = self.state.write().await;

        if let Some(after) = state.unavailable_after
            && state.conditional_updates >= after
        {
            return Err(StoreError::Unavailable(
                "simulated throttling".to_string(),
            ));
        }
        state.conditional_updates += 1;

        let record = state
            .records
            .get_mut(key)
            .ok_or_else(|| StoreError::ConditionFailed(key.clone()))?;

        if !guard_holds(guard, record) {
            return Err(StoreError::ConditionFailed(key.clone()));
        }

        delta.apply_to(record);
        Ok(record.clone())
    }

    async fn update(&self, key: &StoreKey, delta: &QuantityDelta) -> Result<StockRecord> {
        let mut state = self.state.write().await;

        if state.fail_on_update {
            return Err(StoreError::Unavailable(
                "simulated update failure".to_string(),
            ));
        }
        state.unconditional_updates += 1;

        let record = state
            .records
            .get_mut(key)
            .ok_or_else(|| StoreError::RecordNotFound(key.clone()))?;

        delta.apply_to(record);
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> StockRecord {
        StockRecord::new(value.as_object().unwrap().clone())
    }

    async fn store_with_record(value: serde_json::Value) -> (InMemoryStockStore, StoreKey) {
        let store = InMemoryStockStore::new();
        let rec = record(value);
        let key = StoreKey::from_record(&rec);
        store.insert(rec).await;
        (store, key)
    }

    #[tokio::test]
    async fn get_by_keys_skips_missing() {
        let (store, key) = store_with_record(json!({"productId": "A", "stock": 10})).await;

        let mut missing = StoreKey::new();
        missing.insert("productId", "B");

        let records = store.get_by_keys(&[key, missing]).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].number("stock"), Some(10.0));
    }

    #[tokio::test]
    async fn conditional_update_applies_when_guard_holds() {
        let (store, key) = store_with_record(json!({"productId": "A", "stock": 10})).await;

        let updated = store
            .conditional_update(
                &key,
                &ReserveGuard::at_least("stock", 4.0),
                &QuantityDelta::reserve("stock", "reserved", 4.0),
            )
            .await
            .unwrap();

        assert_eq!(updated.number("stock"), Some(6.0));
        assert_eq!(updated.number("reserved"), Some(4.0));
        assert_eq!(store.conditional_update_count().await, 1);
    }

    #[tokio::test]
    async fn conditional_update_rejects_insufficient_stock() {
        let (store, key) = store_with_record(json!({"productId": "A", "stock": 3})).await;

        let result = store
            .conditional_update(
                &key,
                &ReserveGuard::at_least("stock", 4.0),
                &QuantityDelta::reserve("stock", "reserved", 4.0),
            )
            .await;

        assert!(matches!(result, Err(StoreError::ConditionFailed(_))));
        // Rejected writes leave the record untouched.
        let rec = store.get(&key).await.unwrap();
        assert_eq!(rec.number("stock"), Some(3.0));
        assert!(!rec.contains("reserved"));
    }

    #[tokio::test]
    async fn conditional_update_rejects_missing_record() {
        let store = InMemoryStockStore::new();
        let mut key = StoreKey::new();
        key.insert("productId", "ghost");

        let result = store
            .conditional_update(
                &key,
                &ReserveGuard::at_least("stock", 1.0),
                &QuantityDelta::reserve("stock", "reserved", 1.0),
            )
            .await;

        assert!(matches!(result, Err(StoreError::ConditionFailed(_))));
    }

    #[tokio::test]
    async fn unconditional_update_ignores_guard_semantics() {
        let (store, key) = store_with_record(
            json!({"productId": "A", "stock": 6, "reserved": 4}),
        )
        .await;

        let updated = store
            .update(&key, &QuantityDelta::release("stock", "reserved", 4.0))
            .await
            .unwrap();

        assert_eq!(updated.number("stock"), Some(10.0));
        assert_eq!(updated.number("reserved"), Some(0.0));
        assert_eq!(store.update_count().await, 1);
    }

    #[tokio::test]
    async fn unconditional_update_requires_record() {
        let store = InMemoryStockStore::new();
        let mut key = StoreKey::new();
        key.insert("productId", "ghost");

        let result = store
            .update(&key, &QuantityDelta::release("stock", "reserved", 1.0))
            .await;

        assert!(matches!(result, Err(StoreError::RecordNotFound(_))));
    }

    #[tokio::test]
    async fn unavailable_after_limits_conditional_updates() {
        let (store, key) = store_with_record(json!({"productId": "A", "stock": 10})).await;
        store.set_unavailable_after(1).await;

        let guard = ReserveGuard::at_least("stock", 1.0);
        let delta = QuantityDelta::reserve("stock", "reserved", 1.0);

        store.conditional_update(&key, &guard, &delta).await.unwrap();
        let second = store.conditional_update(&key, &guard, &delta).await;
        assert!(matches!(second, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn fail_on_update_simulates_rollback_failure() {
        let (store, key) = store_with_record(json!({"productId": "A", "stock": 10})).await;
        store.set_fail_on_update(true).await;

        let result = store
            .update(&key, &QuantityDelta::release("stock", "reserved", 1.0))
            .await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn partitioned_records_keyed_independently() {
        let store = InMemoryStockStore::new();
        store
            .insert(record(json!({"productId": "A", "branchId": "n", "stock": 5})))
            .await;
        store
            .insert(record(json!({"productId": "A", "branchId": "s", "stock": 7})))
            .await;

        assert_eq!(store.record_count().await, 2);
    }
}
