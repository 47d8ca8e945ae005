//! # Deploy Subcommand
//!
//! Publishes an escrow contract for a seller and records its address in
//! `contractAddress.txt`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use egate_chain::artifact::DEFAULT_ARTIFACT_PATH;
use egate_chain::{ChainConfig, ContractArtifact, EscrowContract, RpcClient, TransactionSender};
use egate_core::EthAddress;
use egate_crypto::Wallet;

use crate::settings;
use crate::workspace::{Workspace, CONTRACT_ADDRESS_FILE};

/// Arguments for `egate deploy`.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Compiled contract JSON (Foundry or Hardhat layout).
    #[arg(long, value_name = "FILE", default_value = DEFAULT_ARTIFACT_PATH)]
    pub artifact: PathBuf,

    /// Seller address. Overrides SELLER_ADDRESS / SELLER_PRIVATE_KEY.
    #[arg(long, value_name = "ADDRESS")]
    pub seller: Option<EthAddress>,
}

/// Execute the deploy subcommand.
pub async fn run_deploy(args: &DeployArgs, ws: &Workspace) -> Result<u8> {
    let chain = ChainConfig::from_env().context("RPC configuration")?;
    let buyer = settings::buyer_wallet()?;
    let seller = match args.seller {
        Some(addr) => addr,
        None => settings::seller_address()?,
    };
    deploy(args, ws, chain, buyer, seller).await
}

/// Deploy with explicit configuration.
pub async fn deploy(
    args: &DeployArgs,
    ws: &Workspace,
    chain: ChainConfig,
    buyer: Wallet,
    seller: EthAddress,
) -> Result<u8> {
    let artifact_path = ws.resolve(&args.artifact);
    let artifact = ContractArtifact::load(&artifact_path)?;
    artifact.require_deployable()?;

    let sender = TransactionSender::new(RpcClient::new(chain)?, buyer);
    let (escrow, receipt) = EscrowContract::deploy(&sender, &artifact, seller)
        .await
        .context("contract deployment failed")?;

    ws.write_contract_address(&escrow.address())?;

    println!("Contract deployed at: {}", escrow.address());
    println!("Seller: {seller}");
    println!("Transaction: {}", receipt.transaction_hash);
    println!(
        "Address written to {}",
        ws.root().join(CONTRACT_ADDRESS_FILE).display()
    );
    Ok(0)
}
