//! # secp256k1 Wallet
//!
//! A [`Wallet`] holds one private key and the Ethereum address derived from
//! it. It signs two kinds of payload:
//!
//! - a 32-byte transaction signing hash, yielding a [`Signature`] whose
//!   parity the transaction encoder folds into `v`;
//! - an arbitrary message under EIP-191 (`"\x19Ethereum Signed Message:\n" ||
//!   len || msg`), yielding the 65-byte `r || s || v` hex string that
//!   sign-in verifiers expect.
//!
//! ## Security Invariant
//!
//! The secret key never leaves this type. `Debug` prints only the address.

use std::fmt;

use alloy::primitives::{eip191_hash_message, Signature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use egate_core::{decode_hex_prefixed, EthAddress};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// A secp256k1 signing key and its address.
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Load from hex (with or without `0x`), as found in `BUYER_PRIVATE_KEY`.
    pub fn from_hex(private_key: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(
            decode_hex_prefixed(private_key, "private key")
                .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Load from 32 raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidPrivateKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let signer = PrivateKeySigner::from_slice(bytes)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self { signer })
    }

    /// Fresh random key from the OS RNG.
    pub fn random() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }

    /// The wallet's address.
    pub fn address(&self) -> EthAddress {
        self.signer.address().into()
    }

    /// Sign a 32-byte hash.
    pub fn sign_hash(&self, hash: &[u8; 32]) -> Result<Signature, CryptoError> {
        self.signer
            .sign_hash_sync(&B256::from(*hash))
            .map_err(|e| CryptoError::Signing(e.to_string()))
    }

    /// EIP-191 `personal_sign`, returned as `0x`-prefixed 65-byte hex.
    pub fn personal_sign(&self, message: &[u8]) -> Result<String, CryptoError> {
        let sig = self
            .signer
            .sign_message_sync(message)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        Ok(format!("0x{}", hex::encode(sig.as_bytes())))
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// EIP-191 version `0x45` hash of `message`.
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    eip191_hash_message(message).0
}

/// Recover the address that produced a `personal_sign` hex signature.
///
/// `v` may be `0`/`1` or `27`/`28`.
pub fn recover_personal(message: &[u8], signature_hex: &str) -> Result<EthAddress, CryptoError> {
    let bytes = decode_hex_prefixed(signature_hex, "signature")
        .map_err(|e| CryptoError::Recovery(e.to_string()))?;
    if bytes.len() != 65 {
        return Err(CryptoError::Recovery(format!(
            "expected 65 signature bytes, got {}",
            bytes.len()
        )));
    }
    let sig = Signature::from_raw(&bytes).map_err(|e| CryptoError::Recovery(e.to_string()))?;
    sig.recover_address_from_msg(message)
        .map(EthAddress::from)
        .map_err(|e| CryptoError::Recovery(e.to_string()))
}
