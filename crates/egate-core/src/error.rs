//! # Error Hierarchy
//!
//! Validation and canonicalization errors for the foundational types, built
//! with `thiserror`. Each variant carries the offending input so an operator
//! can see what was wrong in a local file or environment variable without
//! re-running anything.

use thiserror::Error;

/// Validation errors for domain newtypes and documents.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Address is not `0x` followed by 40 hex characters.
    #[error("invalid Ethereum address: \"{0}\" (expected 0x followed by 40 hex characters)")]
    InvalidAddress(String),

    /// Mixed-case address whose letter casing fails the EIP-55 checksum.
    #[error("Ethereum address \"{0}\" fails its EIP-55 checksum")]
    AddressChecksum(String),

    /// Ether amount could not be parsed or exceeds 18 decimals.
    #[error("invalid ether amount: \"{value}\" ({reason})")]
    InvalidAmount {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Content identifier is empty or contains non-alphanumeric characters.
    #[error("invalid content identifier: \"{0}\"")]
    InvalidCid(String),

    /// Hex field failed to decode.
    #[error("invalid hex in {field}: {reason}")]
    InvalidHex {
        /// Which field was being decoded.
        field: String,
        /// Decoder message.
        reason: String,
    },

    /// A condition set must hold at least one condition.
    #[error("access-control condition set is empty")]
    EmptyConditionSet,

    /// A single condition is malformed.
    #[error("invalid access-control condition #{index}: {reason}")]
    InvalidCondition {
        /// Position in the set.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Encrypted bundle is missing a field or a field is not decodable.
    #[error("invalid encrypted asset bundle: {0}")]
    InvalidBundle(String),
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Floats have no single canonical spelling; amounts are strings.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_address_display_includes_input() {
        let err = ValidationError::InvalidAddress("0x12".into());
        assert!(err.to_string().contains("\"0x12\""));
    }

    #[test]
    fn invalid_condition_display_includes_index() {
        let err = ValidationError::InvalidCondition {
            index: 2,
            reason: "chain is empty".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("#2"));
        assert!(msg.contains("chain is empty"));
    }

    #[test]
    fn canonicalization_error_wraps_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = CanonicalizationError::from(serde_err);
        assert!(err.to_string().starts_with("serialization failed"));
    }
}
