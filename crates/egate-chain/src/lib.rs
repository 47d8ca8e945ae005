//! # egate-chain: EVM Access for Escrow Gate
//!
//! Everything the workflow needs from the chain, over plain JSON-RPC:
//!
//! - [`RpcClient`]: typed wrappers over the `eth_*` methods the escrow
//!   stages call.
//! - [`LegacyTransaction`]: EIP-155 signing with a local [`Wallet`](egate_crypto::Wallet).
//! - [`TransactionSender`]: nonce, gas, sign, broadcast, await receipt.
//! - [`ContractArtifact`]: compiled contract JSON (Foundry or Hardhat layout).
//! - [`EscrowContract`]: deploy, deposit, release, and the two flag getters.
//!
//! ## Failure Policy
//!
//! No retries. A transport failure, non-2xx status, JSON-RPC error object,
//! reverted receipt, or unmet precondition is returned to the caller as a
//! [`ChainError`] carrying the method name.

pub mod artifact;
pub mod config;
pub mod error;
pub mod escrow;
pub mod rpc;
pub mod sender;
pub mod tx;

pub use artifact::ContractArtifact;
pub use config::{ChainConfig, ConfigError};
pub use error::ChainError;
pub use escrow::{read_status, EscrowContract, EscrowStatus, Flag, Preflight};
pub use rpc::{RpcClient, TxReceipt};
pub use sender::TransactionSender;
pub use tx::{LegacyTransaction, SignedTransaction};
