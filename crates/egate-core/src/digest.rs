//! # Digests and Hex
//!
//! Keccak-256 (the EVM's hash: selectors, addresses, transaction hashes) and
//! SHA-256 (plaintext fingerprint stored next to every ciphertext), plus the
//! `0x`-prefixed hex convention used on the JSON-RPC wire.

use sha2::{Digest, Sha256};

use crate::error::ValidationError;

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    alloy::primitives::keccak256(data).0
}

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Lowercase hex with a `0x` prefix.
pub fn to_hex_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode hex with or without a `0x` prefix. `field` names the input in errors.
pub fn decode_hex_prefixed(s: &str, field: &str) -> Result<Vec<u8>, ValidationError> {
    let trimmed = s.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(body).map_err(|e| ValidationError::InvalidHex {
        field: field.to_string(),
        reason: e.to_string(),
    })
}
