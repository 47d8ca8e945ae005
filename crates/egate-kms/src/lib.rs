//! # egate-kms: Key-Management Network Client
//!
//! The network holds no ciphertext. It wraps a caller's symmetric key under
//! an access-control condition set and later unwraps it only for a signer
//! for whom the conditions evaluate true on-chain.
//!
//! ## Flow
//!
//! 1. [`KmsClient::connect`]: handshake with a random challenge; the reply's
//!    `latestBlockhash` becomes the sign-in nonce.
//! 2. [`encrypt_asset`]: seal locally, store the key, return an
//!    [`EncryptedAssetBundle`](egate_core::EncryptedAssetBundle).
//! 3. [`authorize`]: an EIP-4361 [`AuthSig`] delegates to an ephemeral
//!    ed25519 [`SessionKey`], which signs a node-bound [`SessionSig`].
//! 4. [`decrypt_asset`]: retrieve the key with the session signatures, open,
//!    and verify the plaintext hash.
//!
//! The node's threshold cryptography is out of scope; this crate speaks its
//! HTTP surface only.

pub mod asset;
pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod siwe;
pub mod types;

pub use asset::{authorize, decrypt_asset, encrypt_asset};
pub use client::KmsClient;
pub use config::{ConfigError, KmsConfig};
pub use error::KmsError;
pub use session::{SessionKey, SessionSig, SessionSigs};
pub use siwe::{AuthSig, SiweMessage};
