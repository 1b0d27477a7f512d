//! Reservation executor and compensator.

use std::collections::HashMap;
use std::time::Instant;

use common::ProductId;
use stock_store::{QuantityDelta, ReserveGuard, StockRecord, StockStore, StoreKey};
use uuid::Uuid;

use crate::envelope::ReservationRequest;
use crate::error::Result;
use crate::fields::QuantityFields;
use crate::outcome::{BatchResult, ReservationOutcome, reason};

/// Bookkeeping for one committed reservation write.
///
/// Created only after the store accepted the conditional update;
/// consumed by the compensator when the batch fails, then discarded.
#[derive(Debug, Clone)]
pub struct AppliedUpdate {
    pub key: StoreKey,
    pub product_id: ProductId,
    pub qty: f64,
    pub fields: QuantityFields,
}

/// Drives one reservation batch against the stock store.
///
/// Items are processed strictly one at a time; that trades throughput
/// for deterministic rollback order and simple applied-update
/// bookkeeping. Cross-record atomicity is approximated, not
/// guaranteed: a failure after partial success triggers best-effort
/// compensation, and a crash in between leaves the store inconsistent.
pub struct ReservationSaga<S> {
    store: S,
    field_mapping: Option<QuantityFields>,
}

impl<S: StockStore> ReservationSaga<S> {
    /// Creates a saga that infers quantity field names from the
    /// first record of each batch.
    pub fn new(store: S) -> Self {
        Self {
            store,
            field_mapping: None,
        }
    }

    /// Creates a saga with an explicit field mapping, skipping
    /// per-batch inference.
    pub fn with_field_mapping(store: S, fields: QuantityFields) -> Self {
        Self {
            store,
            field_mapping: Some(fields),
        }
    }

    /// Executes one batch: reserve every requested item, or report
    /// why not.
    ///
    /// Domain failures become per-item outcomes and, when any item
    /// failed after others committed, the committed updates are
    /// rolled back. Infrastructure errors from the store propagate
    /// immediately and skip compensation; the orchestrator owns the
    /// retry of the whole invocation.
    #[tracing::instrument(skip_all, fields(batch_id = %Uuid::new_v4(), items = requests.len()))]
    pub async fn reserve_batch(
        &self,
        requests: &[ReservationRequest],
        records: Vec<StockRecord>,
    ) -> Result<BatchResult> {
        metrics::counter!("reservation_batches_total").increment(1);
        let batch_start = Instant::now();

        if requests.is_empty() {
            tracing::warn!("no requested items resolved from input");
            return Ok(BatchResult::empty(reason::NO_REQUESTED_ITEMS));
        }
        if records.is_empty() {
            tracing::warn!("no stock records resolved from input");
            return Ok(BatchResult::empty(reason::NO_DB_ITEMS));
        }

        let fields = self
            .field_mapping
            .clone()
            .unwrap_or_else(|| QuantityFields::infer(&records[0]));

        let mut by_id: HashMap<ProductId, StockRecord> = HashMap::with_capacity(records.len());
        for record in records {
            if let Some(id) = record.identifier() {
                by_id.insert(id, record);
            }
        }

        let mut outcomes = Vec::with_capacity(requests.len());
        let mut applied: Vec<AppliedUpdate> = Vec::new();

        for request in requests {
            match self
                .reserve_item(request, &by_id, &fields, &mut applied)
                .await
            {
                Ok(outcome) => outcomes.push(outcome),
                Err(error) => {
                    // Transient store failure: abort the rest of the
                    // batch and leave committed items committed.
                    metrics::counter!("reservation_batches_aborted").increment(1);
                    tracing::error!(
                        product_id = %request.product_id,
                        %error,
                        "store error during reservation, aborting batch"
                    );
                    return Err(error);
                }
            }
        }

        let any_failed = outcomes.iter().any(|o| !o.is_reserved());
        if any_failed && !applied.is_empty() {
            self.compensate(&applied).await;
        }

        let result = BatchResult::from_outcomes(outcomes);
        metrics::histogram!("reservation_batch_duration_seconds")
            .record(batch_start.elapsed().as_secs_f64());
        if result.reserved {
            metrics::counter!("reservation_batches_completed").increment(1);
            tracing::info!(items = result.products.len(), "batch reserved");
        } else {
            metrics::counter!("reservation_batches_failed").increment(1);
            tracing::warn!(items = result.products.len(), "batch failed, not reserved");
        }
        Ok(result)
    }

    /// Attempts one item. Returns a per-item outcome for domain
    /// failures; only infrastructure errors come back as `Err`.
    async fn reserve_item(
        &self,
        request: &ReservationRequest,
        by_id: &HashMap<ProductId, StockRecord>,
        fields: &QuantityFields,
        applied: &mut Vec<AppliedUpdate>,
    ) -> Result<ReservationOutcome> {
        let product_id = request.product_id.clone();
        let qty = request.qty;

        let Some(record) = by_id.get(&product_id) else {
            return Ok(ReservationOutcome::failed(
                product_id,
                qty,
                None,
                reason::PRODUCT_NOT_FOUND,
            ));
        };

        let available_before = snapshot_available(record, fields);

        if !qty.is_finite() || qty <= 0.0 {
            return Ok(ReservationOutcome::failed(
                product_id,
                qty,
                Some(available_before),
                reason::INVALID_QUANTITY,
            ));
        }

        if available_before < qty {
            // The snapshot already rules it out; skip the write.
            return Ok(ReservationOutcome::failed(
                product_id,
                qty,
                Some(available_before),
                reason::INSUFFICIENT_STOCK,
            ));
        }

        let key = StoreKey::from_record(record);
        let guard = ReserveGuard::at_least(&fields.available, qty);
        let delta = QuantityDelta::reserve(&fields.available, &fields.reserved, qty);

        match self.store.conditional_update(&key, &guard, &delta).await {
            Ok(updated) => {
                applied.push(AppliedUpdate {
                    key,
                    product_id: product_id.clone(),
                    qty,
                    fields: fields.clone(),
                });
                Ok(ReservationOutcome::reserved(
                    product_id,
                    qty,
                    available_before,
                    updated.number(&fields.available),
                ))
            }
            Err(error) if error.is_condition_failure() => {
                // The snapshot said yes but the store said no: the
                // record vanished or a concurrent batch took the
                // stock between read and write.
                tracing::warn!(product_id = %product_id, "conditional write rejected");
                Ok(ReservationOutcome::failed(
                    product_id,
                    qty,
                    Some(available_before),
                    reason::CONDITION_FAILED,
                ))
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Reverses every committed update of a failed batch, best-effort.
    ///
    /// Each reversal is attempted independently; one failure does not
    /// block the rest and never escalates. The batch result already
    /// reports `reserved: false` regardless of how compensation went.
    #[tracing::instrument(skip_all, fields(updates = applied.len()))]
    async fn compensate(&self, applied: &[AppliedUpdate]) {
        metrics::counter!("reservation_compensations_total").increment(1);

        for update in applied {
            let delta = QuantityDelta::release(
                &update.fields.available,
                &update.fields.reserved,
                update.qty,
            );
            match self.store.update(&update.key, &delta).await {
                Ok(_) => {
                    tracing::info!(product_id = %update.product_id, qty = update.qty, "rolled back reservation");
                }
                Err(error) => {
                    metrics::counter!("reservation_compensation_failures").increment(1);
                    tracing::error!(
                        product_id = %update.product_id,
                        %error,
                        "rollback failed, stock left inconsistent"
                    );
                }
            }
        }
    }
}

/// Reads the snapshot's available quantity, tolerating records whose
/// schema disagrees with the batch-wide mapping; absent values count
/// as 0 so the item fails as insufficient instead of erroring.
fn snapshot_available(record: &StockRecord, fields: &QuantityFields) -> f64 {
    record
        .number(&fields.available)
        .or_else(|| record.number("quantityAvailable"))
        .or_else(|| record.number("stock"))
        .unwrap_or(0.0)
}
