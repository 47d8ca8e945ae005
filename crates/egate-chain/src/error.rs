//! Chain client error types.

use egate_core::EthAddress;

/// Errors from JSON-RPC calls, transaction handling, and escrow guards.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// HTTP transport error.
    #[error("HTTP error calling {method}: {source}")]
    Http {
        /// JSON-RPC method being called.
        method: String,
        /// Underlying transport error.
        source: reqwest::Error,
    },

    /// Endpoint returned a non-2xx status.
    #[error("RPC endpoint returned {status} for {method}: {body}")]
    Status {
        /// JSON-RPC method being called.
        method: String,
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// JSON-RPC error object in the response.
    #[error("{method} failed with RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC method being called.
        method: String,
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },

    /// Response did not have the expected shape.
    #[error("unexpected response from {method}: {reason}")]
    Decode {
        /// Method whose result failed to decode.
        method: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Transaction was mined with status 0.
    #[error("transaction {tx_hash} reverted")]
    Reverted {
        /// Hash of the reverted transaction.
        tx_hash: String,
    },

    /// No receipt within the configured window.
    #[error("transaction {tx_hash} not confirmed after {waited_secs}s")]
    ConfirmationTimeout {
        /// Hash of the pending transaction.
        tx_hash: String,
        /// Configured confirmation ceiling.
        waited_secs: u64,
    },

    /// Deployment receipt lacks `contractAddress`.
    #[error("deployment receipt for {tx_hash} has no contract address")]
    MissingContractAddress {
        /// Hash of the deployment transaction.
        tx_hash: String,
    },

    /// Compiled artifact is missing, malformed, or lacks a function.
    #[error("contract artifact error: {0}")]
    Artifact(String),

    /// Deposit requested but the contract already holds funds.
    #[error("funds already deposited in escrow {contract}")]
    AlreadyDeposited {
        /// Escrow contract address.
        contract: EthAddress,
    },

    /// Release requested but the flag is already set.
    #[error("funds already released from escrow {contract}")]
    AlreadyReleased {
        /// Escrow contract address.
        contract: EthAddress,
    },

    /// Release requested before any deposit.
    #[error("no funds deposited in escrow {contract}; nothing to release")]
    NotDeposited {
        /// Escrow contract address.
        contract: EthAddress,
    },

    /// Transaction signing failed.
    #[error("signing failed: {0}")]
    Signing(#[from] egate_crypto::CryptoError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl ChainError {
    /// True for errors raised by an advisory guard before any transaction.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::AlreadyDeposited { .. } | Self::AlreadyReleased { .. } | Self::NotDeposited { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_classification() {
        let contract = EthAddress::ZERO;
        assert!(ChainError::AlreadyDeposited { contract }.is_precondition());
        assert!(ChainError::NotDeposited { contract }.is_precondition());
        assert!(!ChainError::Reverted { tx_hash: "0x1".into() }.is_precondition());
    }

    #[test]
    fn rpc_error_display_names_method() {
        let err = ChainError::Rpc {
            method: "eth_sendRawTransaction".into(),
            code: -32000,
            message: "nonce too low".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("eth_sendRawTransaction"));
        assert!(msg.contains("nonce too low"));
    }

    #[test]
    fn confirmation_timeout_display_carries_hash_and_ceiling() {
        let err = ChainError::ConfirmationTimeout {
            tx_hash: "0xabc".into(),
            waited_secs: 300,
        };
        assert_eq!(err.to_string(), "transaction 0xabc not confirmed after 300s");
    }
}
