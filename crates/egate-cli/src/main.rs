//! # egate CLI entry point
//!
//! Parses arguments, installs the tracing subscriber, and runs one stage on
//! a tokio runtime.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use egate_cli::decrypt::{run_decrypt, DecryptArgs};
use egate_cli::deploy::{run_deploy, DeployArgs};
use egate_cli::deposit::{run_deposit, DepositArgs};
use egate_cli::encrypt::{run_encrypt, EncryptArgs};
use egate_cli::release::{run_release, ReleaseArgs};
use egate_cli::settings::load_dotenv;
use egate_cli::status::{run_status, StatusArgs};
use egate_cli::Workspace;

/// Escrow-gated asset release.
///
/// Deploys an escrow contract, deposits into it, encrypts an asset so that
/// only the buyer can read it once funds are released, and releases funds.
#[derive(Parser, Debug)]
#[command(name = "egate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Directory holding contractAddress.txt, cids.json, and the local cache.
    #[arg(long, global = true, default_value = ".")]
    workdir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deploy an escrow contract for the seller.
    Deploy(DeployArgs),

    /// Deposit funds into the escrow as the buyer.
    Deposit(DepositArgs),

    /// Encrypt the asset under the release condition and pin it.
    Encrypt(EncryptArgs),

    /// Release escrowed funds to the seller.
    Release(ReleaseArgs),

    /// Decrypt the asset once funds are released.
    Decrypt(DecryptArgs),

    /// Show escrow flags and recorded CIDs.
    Status(StatusArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let ws = Workspace::new(cli.workdir.clone());
    // Before tracing, so RUST_LOG may come from the file.
    let dotenv = load_dotenv(&ws);
    init_tracing(cli.verbose, cli.log_json);

    match dotenv {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "loaded environment file"),
        Ok(None) => {}
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    }
    tracing::debug!(workdir = %ws.root().display(), "egate starting");

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to start async runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let result = runtime.block_on(async {
        match &cli.command {
            Commands::Deploy(args) => run_deploy(args, &ws).await,
            Commands::Deposit(args) => run_deposit(args, &ws).await,
            Commands::Encrypt(args) => run_encrypt(args, &ws).await,
            Commands::Release(args) => run_release(args, &ws).await,
            Commands::Decrypt(args) => run_decrypt(args, &ws).await,
            Commands::Status(args) => run_status(args, &ws).await,
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// `RUST_LOG` wins; otherwise the `-v` count picks the level.
fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egate_cli::decrypt::Source;
    use egate_cli::encrypt::Layout;

    #[test]
    fn parse_deploy_with_seller() {
        let cli = Cli::try_parse_from([
            "egate",
            "deploy",
            "--seller",
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
        ])
        .unwrap();
        let Commands::Deploy(args) = cli.command else {
            panic!("expected deploy");
        };
        assert!(args.seller.is_some());
        assert!(args.artifact.ends_with("Escrow.json"));
    }

    #[test]
    fn parse_rejects_bad_seller() {
        assert!(Cli::try_parse_from(["egate", "deploy", "--seller", "0x12"]).is_err());
    }

    #[test]
    fn parse_deposit_amount_and_force() {
        let cli = Cli::try_parse_from(["egate", "deposit", "--amount", "0.5", "--force"]).unwrap();
        let Commands::Deposit(args) = cli.command else {
            panic!("expected deposit");
        };
        assert_eq!(args.amount.as_deref(), Some("0.5"));
        assert!(args.force);
    }

    #[test]
    fn encrypt_defaults_to_bundle_layout() {
        let cli = Cli::try_parse_from(["egate", "encrypt"]).unwrap();
        let Commands::Encrypt(args) = cli.command else {
            panic!("expected encrypt");
        };
        assert_eq!(args.layout, Layout::Bundle);
        assert!(args.asset.is_none());
    }

    #[test]
    fn encrypt_asset_flags_conflict() {
        assert!(Cli::try_parse_from([
            "egate",
            "encrypt",
            "--asset",
            "x",
            "--asset-file",
            "y"
        ])
        .is_err());
    }

    #[test]
    fn decrypt_source_and_global_flags() {
        let cli = Cli::try_parse_from([
            "egate", "decrypt", "--source", "local", "-vv", "--workdir", "/tmp/w", "--log-json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_json);
        assert_eq!(cli.workdir, PathBuf::from("/tmp/w"));
        let Commands::Decrypt(args) = cli.command else {
            panic!("expected decrypt");
        };
        assert_eq!(args.source, Source::Local);
        assert!(args.output.is_none());
    }

    #[test]
    fn split_layout_parses() {
        let cli = Cli::try_parse_from(["egate", "encrypt", "--layout", "split"]).unwrap();
        let Commands::Encrypt(args) = cli.command else {
            panic!("expected encrypt");
        };
        assert_eq!(args.layout, Layout::Split);
    }

    #[test]
    fn status_takes_no_arguments() {
        let cli = Cli::try_parse_from(["egate", "status"]).unwrap();
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["egate", "withdraw"]).is_err());
    }
}
