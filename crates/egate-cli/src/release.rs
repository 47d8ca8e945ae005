//! # Release Subcommand
//!
//! The buyer calls `releaseFunds()`, which flips the flag the encrypted
//! asset's condition set watches.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use egate_chain::artifact::DEFAULT_ARTIFACT_PATH;
use egate_chain::escrow::ESCROW_FUNCTIONS;
use egate_chain::{
    ChainConfig, ContractArtifact, EscrowContract, Preflight, RpcClient, TransactionSender,
};
use egate_crypto::Wallet;

use crate::settings;
use crate::workspace::Workspace;

/// Arguments for `egate release`.
#[derive(Args, Debug)]
pub struct ReleaseArgs {
    /// Compiled contract JSON; its ABI must declare the escrow functions.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_ARTIFACT_PATH)]
    pub artifact: PathBuf,

    /// Skip the already-released and not-deposited checks.
    #[arg(long)]
    pub force: bool,
}

/// Execute the release subcommand.
pub async fn run_release(args: &ReleaseArgs, ws: &Workspace) -> Result<u8> {
    let chain = ChainConfig::from_env().context("RPC configuration")?;
    let buyer = settings::buyer_wallet()?;
    release(args, ws, chain, buyer).await
}

/// Release with explicit configuration.
pub async fn release(
    args: &ReleaseArgs,
    ws: &Workspace,
    chain: ChainConfig,
    buyer: Wallet,
) -> Result<u8> {
    let contract = ws.read_contract_address()?;
    let artifact = ContractArtifact::load(&ws.resolve(&args.artifact))?;
    artifact.require_functions(&ESCROW_FUNCTIONS)?;

    let sender = TransactionSender::new(RpcClient::new(chain)?, buyer);
    let escrow = EscrowContract::at(&sender, contract);
    let preflight = if args.force {
        Preflight::Skip
    } else {
        Preflight::Check
    };

    let receipt = escrow.release_funds(preflight).await?;

    println!("Funds released from escrow {contract}");
    println!("Transaction: {}", receipt.transaction_hash);
    Ok(0)
}
