//! # Status Subcommand
//!
//! Read-only view of the workspace: the escrow's two flags from the chain,
//! plus whatever the encrypt stage recorded.

use anyhow::{Context, Result};
use clap::Args;

use egate_chain::{read_status, ChainConfig, RpcClient};

use crate::workspace::Workspace;

/// Arguments for `egate status`.
#[derive(Args, Debug)]
pub struct StatusArgs {}

/// Execute the status subcommand.
pub async fn run_status(args: &StatusArgs, ws: &Workspace) -> Result<u8> {
    let chain = ChainConfig::from_env().context("RPC configuration")?;
    status(args, ws, chain).await
}

/// Status with explicit configuration.
pub async fn status(_args: &StatusArgs, ws: &Workspace, chain: ChainConfig) -> Result<u8> {
    let contract = ws.read_contract_address()?;
    let manifest = if ws.has_manifest() {
        Some(ws.read_manifest()?)
    } else {
        None
    };

    let rpc = RpcClient::new(chain)?;
    let flags = read_status(&rpc, &contract).await?;

    println!("Escrow: {contract}");
    println!("  Funds deposited: {}", flags.deposited);
    println!("  Funds released:  {}", flags.released);
    match manifest {
        Some(manifest) => {
            for (label, cid) in manifest.entries() {
                println!("  {label} CID: {cid}");
            }
        }
        None => println!("  No pinned asset recorded"),
    }
    Ok(0)
}
