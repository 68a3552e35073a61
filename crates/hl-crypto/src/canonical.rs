//! Deterministic JSON encoding for hashing.
//!
//! Values are lowered to a [`serde_json::Value`] tree, every object has its
//! keys re-inserted in sorted order, and the tree is written compactly. Two
//! logically identical values therefore encode to identical bytes no matter
//! which order their fields or map entries were produced in.
//!
//! JSON has no representation for NaN or the infinities, and `serde_json`
//! would quietly write them as `null`. Encoding fails on them instead, so two
//! different payloads can never share an encoding.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::finite::ensure_finite;
use crate::hasher::HasherError;

/// Encode `value` as key-sorted compact JSON bytes.
pub fn to_canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HasherError> {
    let tree = canonical_value(value)?;
    serde_json::to_vec(&tree).map_err(|e| HasherError::Serialization(e.to_string()))
}

/// Lower `value` to a JSON tree with sorted object keys at every level.
pub fn canonical_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, HasherError> {
    ensure_finite(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
    let tree = serde_json::to_value(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
    Ok(sort_keys(tree))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(key, inner)| (key, sort_keys(inner)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
