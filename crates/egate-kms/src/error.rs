//! Key-management client error types.

use egate_core::{CanonicalizationError, ValidationError};
use egate_crypto::CryptoError;

/// Errors from the key-management node and the asset workflows built on it.
#[derive(Debug, thiserror::Error)]
pub enum KmsError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        /// Endpoint being called.
        endpoint: String,
        /// Underlying transport error.
        source: reqwest::Error,
    },

    /// Node returned a non-success status.
    #[error("key-management node returned {status} for {endpoint}: {body}")]
    ApiError {
        /// Endpoint being called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// Node refused: the access-control condition does not hold for the signer.
    #[error("access denied by {endpoint} ({status}): {body}")]
    AccessDenied {
        /// Endpoint being called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// Response body did not deserialize.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        /// Endpoint being called.
        endpoint: String,
        /// Underlying decode error.
        source: reqwest::Error,
    },

    /// Response deserialized but a field is unusable.
    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponse {
        /// Endpoint being called.
        endpoint: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Session signature does not verify against its own session key.
    #[error("invalid session signature: {0}")]
    InvalidSessionSig(String),

    /// Decrypted plaintext does not hash to `dataToEncryptHash`.
    #[error("decrypted asset hash {actual} does not match recorded {expected}")]
    HashMismatch {
        /// Recorded `dataToEncryptHash`.
        expected: String,
        /// Hash of the decrypted plaintext.
        actual: String,
    },

    /// Local key or sealing failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Malformed condition set or bundle.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Condition set could not be canonicalized.
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl KmsError {
    /// True when the node rejected the request on access-control grounds.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_display_carries_every_field() {
        let err = KmsError::AccessDenied {
            endpoint: "encryption/retrieve".into(),
            status: 403,
            body: "condition not met".into(),
        };
        assert!(err.is_access_denied());
        let msg = err.to_string();
        assert!(msg.contains("encryption/retrieve"));
        assert!(msg.contains("403"));
        assert!(msg.contains("condition not met"));
    }

    #[test]
    fn hash_mismatch_names_both_hashes() {
        let err = KmsError::HashMismatch {
            expected: "aa".into(),
            actual: "bb".into(),
        };
        assert_eq!(err.to_string(), "decrypted asset hash bb does not match recorded aa");
    }
}
