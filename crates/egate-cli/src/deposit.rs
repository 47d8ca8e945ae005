//! # Deposit Subcommand
//!
//! The buyer pays into the escrow. Refuses before broadcasting when the
//! contract already reports a deposit, unless `--force` is given.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use egate_chain::artifact::DEFAULT_ARTIFACT_PATH;
use egate_chain::escrow::ESCROW_FUNCTIONS;
use egate_chain::{
    ChainConfig, ContractArtifact, EscrowContract, Preflight, RpcClient, TransactionSender,
};
use egate_core::Wei;
use egate_crypto::Wallet;

use crate::settings;
use crate::workspace::Workspace;

/// Arguments for `egate deposit`.
#[derive(Args, Debug)]
pub struct DepositArgs {
    /// Compiled contract JSON; its ABI must declare the escrow functions.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_ARTIFACT_PATH)]
    pub artifact: PathBuf,

    /// Amount in ether. Overrides ESCROW_DEPOSIT_ETHER.
    #[arg(long, value_name = "ETHER")]
    pub amount: Option<String>,

    /// Skip the already-deposited check.
    #[arg(long)]
    pub force: bool,
}

/// Execute the deposit subcommand.
pub async fn run_deposit(args: &DepositArgs, ws: &Workspace) -> Result<u8> {
    let chain = ChainConfig::from_env().context("RPC configuration")?;
    let buyer = settings::buyer_wallet()?;
    let amount = settings::deposit_amount(args.amount.as_deref())?;
    deposit(args, ws, chain, buyer, amount).await
}

/// Deposit with explicit configuration.
pub async fn deposit(
    args: &DepositArgs,
    ws: &Workspace,
    chain: ChainConfig,
    buyer: Wallet,
    amount: Wei,
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

    let receipt = escrow.deposit(amount, preflight).await?;

    println!("Deposited {amount} into escrow {contract}");
    println!("Transaction: {}", receipt.transaction_hash);
    Ok(0)
}
