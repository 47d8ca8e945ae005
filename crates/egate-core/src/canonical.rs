//! # Canonical Serialization
//!
//! [`CanonicalBytes`] is the single path for producing bytes that are compared
//! for equality across processes: the condition set pinned at encryption time
//! against the one rebuilt at decryption time.
//!
//! ## Rules
//!
//! 1. Reject floats. Comparator values and amounts are strings.
//! 2. Sort object keys lexicographically.
//! 3. Use compact separators (no whitespace).
//!
//! Array order is significant and preserved: condition sets are ordered.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by canonical JSON serialization.
///
/// The inner `Vec<u8>` is private; the only constructor is
/// [`CanonicalBytes::new()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let sorted = sort_value(value)?;
        Ok(Self(serde_json::to_vec(&sorted)?))
    }

    /// Borrow the bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the inner byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Rebuild objects through a `BTreeMap` so keys serialize sorted regardless
/// of `serde_json` map features enabled elsewhere in the dependency graph.
fn sort_value(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Number(n) => {
            if n.is_f64() {
                return Err(CanonicalizationError::FloatRejected(
                    n.as_f64().unwrap_or(f64::NAN),
                ));
            }
            Ok(Value::Number(n))
        }
        Value::Object(map) => {
            let mut sorted = std::collections::BTreeMap::new();
            for (k, v) in map {
                sorted.insert(k, sort_value(v)?);
            }
            Ok(Value::Object(sorted.into_iter().collect()))
        }
        Value::Array(arr) => {
            let items: Result<Vec<_>, _> = arr.into_iter().map(sort_value).collect();
            Ok(Value::Array(items?))
        }
        other => Ok(other),
    }
}
