//! Input envelope normalization.
//!
//! The saga is invoked with whatever state the upstream workflow step
//! passes along, so the envelope shape is not fixed. Requested items
//! and the stock snapshot are each searched across an explicit,
//! ordered list of known shapes; the first non-empty match wins and
//! unknown shapes resolve to empty (the saga short-circuits on empty,
//! it never errors here).

use common::ProductId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stock_store::{StockRecord, attr};
use tracing::warn;

/// One normalized item request: reserve `qty` units of `product_id`.
///
/// `qty` is carried as parsed, including non-finite values from
/// malformed input; validation happens in the executor so a bad
/// quantity becomes a per-item outcome instead of a dropped request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationRequest {
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    pub qty: f64,
}

/// Envelope locations that may hold the requested-items list, tried
/// in order.
const REQUEST_PATHS: [&[&str]; 6] = [
    &["detail", "items"],
    &["detail", "products"],
    &["detail", "requestedItems"],
    &["items"],
    &["products"],
    &["requestedItems"],
];

/// Aliases for the item identifier on a request element.
const REQUEST_ID_FIELDS: [&str; 4] = ["productId", "itemId", "id", "product_id"];

/// Aliases for the quantity on a request element.
const REQUEST_QTY_FIELDS: [&str; 4] = ["qty", "quantity", "requested", "q"];

/// Extracts the requested item list from the envelope.
///
/// Elements without a resolvable identifier are dropped silently. A
/// secondary fallback pairs `detail.productIds` positionally with
/// `detail.quantities` of equal length; as a last resort the envelope
/// itself may already be the item list.
pub fn extract_requested_items(input: &Value) -> Vec<ReservationRequest> {
    for segments in REQUEST_PATHS {
        if let Some(items) = value_at(input, segments).and_then(Value::as_array) {
            let normalized = normalize_request_items(items);
            if !normalized.is_empty() {
                return normalized;
            }
        }
    }

    // Parallel-array shape: identifiers with positionally matched quantities.
    if let Some(ids) = value_at(input, &["detail", "productIds"]).and_then(Value::as_array) {
        let quantities = value_at(input, &["detail", "quantities"])
            .or_else(|| value_at(input, &["detail", "quantitiesMap"]))
            .and_then(Value::as_array);
        if let Some(quantities) = quantities
            && quantities.len() == ids.len()
        {
            return ids
                .iter()
                .zip(quantities)
                .filter_map(|(id, qty)| {
                    Some(ReservationRequest {
                        product_id: scalar_id(id)?,
                        qty: scalar_qty(Some(qty)),
                    })
                })
                .collect();
        }
    }

    if let Some(items) = input.as_array() {
        return normalize_request_items(items);
    }

    Vec::new()
}

/// Extracts the stock snapshot from the envelope.
///
/// Recognized shapes, in order: the named sub-collection under
/// `Responses` for this table, `Responses` as a plain list,
/// the first list-valued key under `Responses`, and the generic
/// `Items` / `responses` / `Products` lists; finally the envelope
/// itself when it is already a list.
///
/// Store-serialized records (typed attribute wrappers) are decoded;
/// a record that fails to decode is kept in its wrapped form rather
/// than failing the batch.
pub fn extract_stock_records(input: &Value, table_name: &str) -> Vec<StockRecord> {
    let raw = raw_record_list(input, table_name);

    let mut records = Vec::with_capacity(raw.map_or(0, Vec::len));
    for item in raw.into_iter().flatten() {
        let Some(map) = item.as_object() else {
            continue;
        };
        let attributes = if attr::looks_like_typed_record(map) {
            match attr::decode_record(map) {
                Ok(plain) => plain,
                Err(error) => {
                    warn!(%error, "stock record failed typed-value decoding, using raw form");
                    map.clone()
                }
            }
        } else {
            map.clone()
        };
        records.push(StockRecord::new(attributes));
    }
    records
}

fn raw_record_list<'a>(input: &'a Value, table_name: &str) -> Option<&'a Vec<Value>> {
    let responses = input.get("Responses");

    if let Some(list) = responses
        .and_then(|r| r.get(table_name))
        .and_then(Value::as_array)
    {
        return Some(list);
    }
    if let Some(list) = responses.and_then(Value::as_array) {
        return Some(list);
    }
    // A caller may have flattened the batch-get result under some
    // other single key; take the first list-valued entry.
    if let Some(list) = responses
        .and_then(Value::as_object)
        .and_then(|map| map.values().next())
        .and_then(Value::as_array)
    {
        return Some(list);
    }
    if let Some(list) = input.get("Items").and_then(Value::as_array) {
        return Some(list);
    }
    if let Some(list) = input.get("responses").and_then(Value::as_array) {
        return Some(list);
    }
    if let Some(list) = input.get("Products").and_then(Value::as_array) {
        return Some(list);
    }
    input.as_array()
}

fn normalize_request_items(items: &[Value]) -> Vec<ReservationRequest> {
    items
        .iter()
        .filter_map(|item| {
            let map = item.as_object()?;
            let product_id = REQUEST_ID_FIELDS
                .iter()
                .find_map(|field| map.get(*field).and_then(scalar_id))?;
            let qty = scalar_qty(
                REQUEST_QTY_FIELDS
                    .iter()
                    .find_map(|field| map.get(*field)),
            );
            Some(ReservationRequest { product_id, qty })
        })
        .collect()
}

fn value_at<'a>(input: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(input, |current, segment| current.get(segment))
}

fn scalar_id(value: &Value) -> Option<ProductId> {
    match value {
        Value::String(s) if !s.is_empty() => Some(ProductId::new(s.clone())),
        Value::Number(n) => Some(ProductId::new(n.to_string())),
        _ => None,
    }
}

/// Coerces a quantity value the way loosely typed input arrives:
/// numbers pass through, numeric strings parse, a missing value is 0
/// and anything else is NaN. Validation rejects 0 and NaN later.
fn scalar_qty(value: Option<&Value>) -> f64 {
    match value {
        None => 0.0,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(f64::NAN),
        Some(_) => f64::NAN,
    }
}
