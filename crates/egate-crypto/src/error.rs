//! Crypto error types.

/// Errors from key handling, signing, and sealing.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Private key is not 32 bytes of hex or is outside the curve order.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// The signer rejected the payload.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Signature bytes cannot be parsed or do not recover a key.
    #[error("signature recovery failed: {0}")]
    Recovery(String),

    /// Symmetric key has the wrong length.
    #[error("invalid symmetric key: expected 32 bytes, got {0}")]
    InvalidSymmetricKey(usize),

    /// AES-GCM encryption failed.
    #[error("encryption failed")]
    Seal,

    /// Ciphertext is truncated or fails authentication.
    #[error("decryption failed: {0}")]
    Open(String),
}
