//! Typed attribute-value decoding.
//!
//! Records fetched straight from the store arrive with every
//! attribute wrapped in a type tag (`{"S": "A"}`, `{"N": "10"}`).
//! Records that already passed through a document layer arrive plain.
//! The normalizer detects the wrapped form and decodes it here;
//! decoding is best-effort at the record level, so a failure falls
//! back to the wrapped form rather than failing the batch.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Errors raised while unwrapping typed attribute values.
#[derive(Debug, Error)]
pub enum AttrDecodeError {
    /// The attribute was not a single-tag wrapper object.
    #[error("attribute '{0}' is not a typed value wrapper")]
    NotWrapped(String),

    /// The type tag is not one this decoder understands.
    #[error("attribute '{attribute}' has unsupported type tag '{tag}'")]
    UnsupportedTag { attribute: String, tag: String },

    /// A number attribute did not parse.
    #[error("attribute '{attribute}' holds unparseable number '{raw}'")]
    BadNumber { attribute: String, raw: String },
}

/// Returns true when the attribute map looks store-serialized: at
/// least one value is an object keyed by a known type tag.
pub fn looks_like_typed_record(attributes: &Map<String, Value>) -> bool {
    attributes.values().any(|v| {
        v.as_object().is_some_and(|wrapper| {
            ["S", "N", "M", "L", "BOOL", "NULL", "SS", "NS"]
                .iter()
                .any(|tag| wrapper.contains_key(*tag))
        })
    })
}

/// Decodes a store-serialized record into a plain attribute map.
pub fn decode_record(attributes: &Map<String, Value>) -> Result<Map<String, Value>, AttrDecodeError> {
    let mut plain = Map::with_capacity(attributes.len());
    for (name, value) in attributes {
        plain.insert(name.clone(), decode_attr(name, value)?);
    }
    Ok(plain)
}

fn decode_attr(name: &str, value: &Value) -> Result<Value, AttrDecodeError> {
    let wrapper = value
        .as_object()
        .filter(|w| w.len() == 1)
        .ok_or_else(|| AttrDecodeError::NotWrapped(name.to_string()))?;
    let (tag, inner) = wrapper
        .iter()
        .next()
        .ok_or_else(|| AttrDecodeError::NotWrapped(name.to_string()))?;

    match (tag.as_str(), inner) {
        ("S", Value::String(s)) => Ok(Value::String(s.clone())),
        ("N", Value::String(raw)) => parse_number(name, raw),
        // Some producers leave N values as bare numbers.
        ("N", Value::Number(n)) => Ok(Value::Number(n.clone())),
        ("BOOL", Value::Bool(b)) => Ok(Value::Bool(*b)),
        ("NULL", _) => Ok(Value::Null),
        ("M", Value::Object(nested)) => Ok(Value::Object(decode_record(nested)?)),
        ("L", Value::Array(items)) => {
            let mut decoded = Vec::with_capacity(items.len());
            for item in items {
                decoded.push(decode_attr(name, item)?);
            }
            Ok(Value::Array(decoded))
        }
        ("SS", Value::Array(items)) => Ok(Value::Array(items.clone())),
        ("NS", Value::Array(items)) => {
            let mut decoded = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(raw) => decoded.push(parse_number(name, raw)?),
                    Value::Number(n) => decoded.push(Value::Number(n.clone())),
                    _ => {
                        return Err(AttrDecodeError::BadNumber {
                            attribute: name.to_string(),
                            raw: item.to_string(),
                        });
                    }
                }
            }
            Ok(Value::Array(decoded))
        }
        _ => Err(AttrDecodeError::UnsupportedTag {
            attribute: name.to_string(),
            tag: tag.clone(),
        }),
    }
}

fn parse_number(name: &str, raw: &str) -> Result<Value, AttrDecodeError> {
    if let Ok(i) = raw.parse::<i64>() {
        return Ok(Value::Number(Number::from(i)));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| AttrDecodeError::BadNumber {
            attribute: name.to_string(),
            raw: raw.to_string(),
        })
}
