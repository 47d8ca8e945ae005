//! # egate-pin: Pinning Service Client
//!
//! Uploads encrypted artifacts and condition sets to Pinata and reads them
//! back through an IPFS gateway. Content is addressed by the CID the
//! service returns; nothing else about the storage engine is assumed.

pub mod client;
pub mod config;
pub mod error;

pub use client::{PinClient, PinResponse};
pub use config::{ConfigError, PinConfig, PinCredentials};
pub use error::PinError;
