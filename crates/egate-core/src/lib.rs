#![deny(missing_docs)]

//! # egate-core: Foundational Types for Escrow Gate
//!
//! Every other crate in the workspace depends on this one. It has no
//! internal crate dependencies beyond `serde`, `serde_json`, `thiserror`,
//! `sha2`, `hex`, and the `alloy` primitives from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtypes validate at construction.** An [`EthAddress`] is always 20
//!    bytes, a [`Cid`] is never empty, a [`Wei`] amount never carries more
//!    precision than the chain does.
//!
//! 2. **[`CanonicalBytes`] is the comparison path for condition sets.** The
//!    key-management network refuses a decryption request whose condition set
//!    differs from the one the key was stored under, so the workflow compares
//!    canonical bytes before it ever asks.
//!
//! 3. **One manifest type, two shapes.** [`CidManifest`] reads both the
//!    bundled and the split upload layouts.

pub mod amount;
pub mod bundle;
pub mod canonical;
pub mod condition;
pub mod digest;
pub mod error;
pub mod manifest;
pub mod address;

pub use address::EthAddress;
pub use amount::Wei;
pub use bundle::EncryptedAssetBundle;
pub use canonical::CanonicalBytes;
pub use condition::{AccessControlCondition, Comparator, ConditionSet, ReturnValueTest};
pub use digest::{keccak256, sha256, to_hex_prefixed, decode_hex_prefixed};
pub use error::{CanonicalizationError, ValidationError};
pub use manifest::{BundleManifest, Cid, CidManifest, SplitManifest};

/// Chain name used when none is configured.
pub const DEFAULT_CHAIN: &str = "ethereum";
