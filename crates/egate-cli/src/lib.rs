//! # egate-cli: Escrow-Gated Asset Release
//!
//! Drives one escrow from deployment to the buyer reading the asset:
//!
//! - `deploy`: publish the escrow for a seller, write `contractAddress.txt`
//! - `deposit`: buyer pays in (refused if already deposited)
//! - `encrypt`: seal the asset under `isFundsReleased() == true`, pin it
//! - `release`: buyer releases funds (refused if released or not deposited)
//! - `decrypt`: recover the asset once the condition holds
//! - `status`: print the escrow flags and recorded CIDs
//!
//! ## Crate Policy
//!
//! - Each stage is a `run_*` handler that reads its environment and a
//!   same-named function taking explicit configuration, so tests can point
//!   stages at mock services.
//! - Local files are read and validated before any network request.
//! - Protocol logic lives in the library crates; handlers only sequence it.

pub mod decrypt;
pub mod deploy;
pub mod deposit;
pub mod encrypt;
pub mod release;
pub mod settings;
pub mod status;
pub mod workspace;

pub use encrypt::DEFAULT_ASSET;
pub use workspace::Workspace;
