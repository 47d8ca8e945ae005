//! # egate-crypto: Cryptographic Primitives for Escrow Gate
//!
//! - **Wallet**: a secp256k1 signing key with its Ethereum address, EIP-191
//!   `personal_sign` for sign-in messages, and signatures over transaction
//!   hashes. Built on the `alloy` local signer.
//! - **Sealing**: AES-256-GCM under a fresh random key per asset. The key is
//!   what the key-management network guards; the ciphertext is public.
//!
//! Digests (Keccak-256, SHA-256) live in `egate-core` so that address
//! checksumming does not need this crate.

pub mod error;
pub mod seal;
pub mod wallet;

pub use error::CryptoError;
pub use seal::{open, seal, SymmetricKey, NONCE_LEN};
pub use alloy::primitives::Signature;
pub use wallet::{personal_message_hash, recover_personal, Wallet};
