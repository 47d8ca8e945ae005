//! # Escrow Contract Binding
//!
//! The contract exposes `constructor(address seller)`, payable `deposit()`,
//! `releaseFunds()`, and the view flags `isFundsDeposited()` /
//! `isFundsReleased()`.
//!
//! ## Advisory Guards
//!
//! [`EscrowContract::deposit`] and [`EscrowContract::release_funds`] read the
//! relevant flag with `eth_call` first and refuse before broadcasting when the
//! transition has already happened (or, for release, when nothing was
//! deposited). The read and the write are not atomic; the contract itself is
//! the final authority.

use alloy::primitives::Address;
use alloy::sol;
use alloy::sol_types::{SolCall, SolValue};
use egate_core::{EthAddress, Wei};

use crate::artifact::ContractArtifact;
use crate::error::ChainError;
use crate::rpc::{RpcClient, TxReceipt};
use crate::sender::TransactionSender;

/// Functions every stage that touches a deployed escrow relies on.
pub const ESCROW_FUNCTIONS: [&str; 4] =
    ["deposit", "releaseFunds", "isFundsDeposited", "isFundsReleased"];

sol! {
    interface IEscrow {
        function deposit() external payable;
        function releaseFunds() external;
        function isFundsDeposited() external view returns (bool);
        function isFundsReleased() external view returns (bool);
    }
}

/// One of the escrow's two boolean getters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// `isFundsDeposited()`
    Deposited,
    /// `isFundsReleased()`
    Released,
}

impl Flag {
    /// Four-byte function selector.
    pub fn selector(self) -> [u8; 4] {
        match self {
            Self::Deposited => IEscrow::isFundsDepositedCall::SELECTOR,
            Self::Released => IEscrow::isFundsReleasedCall::SELECTOR,
        }
    }

    /// Solidity signature, e.g. `isFundsDeposited()`.
    pub fn signature(self) -> &'static str {
        match self {
            Self::Deposited => IEscrow::isFundsDepositedCall::SIGNATURE,
            Self::Released => IEscrow::isFundsReleasedCall::SIGNATURE,
        }
    }

    fn calldata(self) -> Vec<u8> {
        match self {
            Self::Deposited => IEscrow::isFundsDepositedCall {}.abi_encode(),
            Self::Released => IEscrow::isFundsReleasedCall {}.abi_encode(),
        }
    }
}

/// Whether to run the advisory flag check before a state-changing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preflight {
    /// Read the flag and refuse if the transition is not allowed.
    Check,
    /// Broadcast without reading the flag.
    Skip,
}

/// Snapshot of both contract flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscrowStatus {
    pub deposited: bool,
    pub released: bool,
}

/// A deployed escrow contract reached through a [`TransactionSender`].
#[derive(Debug)]
pub struct EscrowContract<'a> {
    sender: &'a TransactionSender,
    address: EthAddress,
}

impl<'a> EscrowContract<'a> {
    /// Bind to an existing deployment.
    pub fn at(sender: &'a TransactionSender, address: EthAddress) -> Self {
        Self { sender, address }
    }

    /// Deploy a new instance and bind to it.
    pub async fn deploy(
        sender: &'a TransactionSender,
        artifact: &ContractArtifact,
        seller: EthAddress,
    ) -> Result<(Self, TxReceipt), ChainError> {
        artifact.require_deployable()?;
        let mut init_code = artifact.bytecode.clone();
        init_code.extend(Address::from(seller).abi_encode());

        tracing::info!(%seller, deployer = %sender.address(), "deploying escrow contract");
        let receipt = sender.send(None, Wei::ZERO, init_code).await?;

        let raw = receipt
            .contract_address
            .as_deref()
            .ok_or_else(|| ChainError::MissingContractAddress {
                tx_hash: receipt.transaction_hash.clone(),
            })?;
        let address: EthAddress = raw.parse().map_err(|e| ChainError::Decode {
            method: "eth_getTransactionReceipt".into(),
            reason: format!("contractAddress: {e}"),
        })?;
        Ok((Self::at(sender, address), receipt))
    }

    /// Contract address.
    pub fn address(&self) -> EthAddress {
        self.address
    }

    /// `isFundsDeposited()`
    pub async fn is_funds_deposited(&self) -> Result<bool, ChainError> {
        read_flag(self.sender.rpc(), &self.address, Flag::Deposited).await
    }

    /// `isFundsReleased()`
    pub async fn is_funds_released(&self) -> Result<bool, ChainError> {
        read_flag(self.sender.rpc(), &self.address, Flag::Released).await
    }

    /// Both flags.
    pub async fn status(&self) -> Result<EscrowStatus, ChainError> {
        read_status(self.sender.rpc(), &self.address).await
    }

    /// Send `amount` to `deposit()`.
    pub async fn deposit(&self, amount: Wei, preflight: Preflight) -> Result<TxReceipt, ChainError> {
        if preflight == Preflight::Check && self.is_funds_deposited().await? {
            return Err(ChainError::AlreadyDeposited {
                contract: self.address,
            });
        }
        tracing::info!(contract = %self.address, %amount, "depositing");
        self.sender
            .send(Some(self.address), amount, IEscrow::depositCall {}.abi_encode())
            .await
    }

    /// Call `releaseFunds()`.
    pub async fn release_funds(&self, preflight: Preflight) -> Result<TxReceipt, ChainError> {
        if preflight == Preflight::Check {
            let status = self.status().await?;
            if status.released {
                return Err(ChainError::AlreadyReleased {
                    contract: self.address,
                });
            }
            if !status.deposited {
                return Err(ChainError::NotDeposited {
                    contract: self.address,
                });
            }
        }
        tracing::info!(contract = %self.address, "releasing funds");
        self.sender
            .send(
                Some(self.address),
                Wei::ZERO,
                IEscrow::releaseFundsCall {}.abi_encode(),
            )
            .await
    }
}

/// Read both flags without a signing wallet.
pub async fn read_status(rpc: &RpcClient, contract: &EthAddress) -> Result<EscrowStatus, ChainError> {
    Ok(EscrowStatus {
        deposited: read_flag(rpc, contract, Flag::Deposited).await?,
        released: read_flag(rpc, contract, Flag::Released).await?,
    })
}

async fn read_flag(rpc: &RpcClient, contract: &EthAddress, flag: Flag) -> Result<bool, ChainError> {
    let data = rpc.call(contract, &flag.calldata()).await?;
    <bool as SolValue>::abi_decode(&data).map_err(|e| ChainError::Decode {
        method: format!("eth_call {}", flag.signature()),
        reason: e.to_string(),
    })
}
