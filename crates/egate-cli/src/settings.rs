//! Environment-derived settings shared by several stages.

use std::path::PathBuf;

use anyhow::{Context, Result};

use egate_core::{EthAddress, Wei, DEFAULT_CHAIN};
use egate_crypto::Wallet;

use crate::workspace::Workspace;

/// Name of the optional environment file in the working directory.
pub const DOTENV_FILE: &str = ".env";

/// Load `<workdir>/.env` into the process environment.
///
/// Variables already set in the process win. Returns the path when a file
/// was loaded, `None` when there is none.
pub fn load_dotenv(ws: &Workspace) -> Result<Option<PathBuf>> {
    let path = ws.root().join(DOTENV_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    dotenvy::from_path(&path).with_context(|| format!("cannot load {}", path.display()))?;
    Ok(Some(path))
}

/// Deposit used when neither `--amount` nor `ESCROW_DEPOSIT_ETHER` is set.
pub const DEFAULT_DEPOSIT_ETHER: &str = "0.001";

/// Escrow parameters not tied to any one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowSettings {
    /// Chain name written into condition sets.
    pub chain: String,
    /// Amount sent by `deposit`.
    pub deposit: Wei,
}

impl EscrowSettings {
    /// Load from environment variables.
    ///
    /// Variables:
    /// - `ESCROW_CHAIN` (default: `ethereum`)
    /// - `ESCROW_DEPOSIT_ETHER` (default: `0.001`)
    pub fn from_env() -> Result<Self> {
        let chain = non_empty_var("ESCROW_CHAIN").unwrap_or_else(|| DEFAULT_CHAIN.to_string());
        let raw = non_empty_var("ESCROW_DEPOSIT_ETHER")
            .unwrap_or_else(|| DEFAULT_DEPOSIT_ETHER.to_string());
        let deposit = Wei::parse_ether(&raw)
            .with_context(|| format!("invalid ESCROW_DEPOSIT_ETHER {raw:?}"))?;
        Ok(Self { chain, deposit })
    }
}

impl Default for EscrowSettings {
    fn default() -> Self {
        Self {
            chain: DEFAULT_CHAIN.to_string(),
            deposit: Wei(1_000_000_000_000_000),
        }
    }
}

/// Deposit amount: `--amount` when given, else `ESCROW_DEPOSIT_ETHER`.
///
/// The variable is not read when the flag is present.
pub fn deposit_amount(flag: Option<&str>) -> Result<Wei> {
    match flag {
        Some(raw) => Wei::parse_ether(raw).with_context(|| format!("invalid --amount {raw:?}")),
        None => Ok(EscrowSettings::from_env()?.deposit),
    }
}

/// The buyer's signing key from `BUYER_PRIVATE_KEY`.
pub fn buyer_wallet() -> Result<Wallet> {
    let key = non_empty_var("BUYER_PRIVATE_KEY")
        .context("BUYER_PRIVATE_KEY environment variable is required")?;
    Wallet::from_hex(&key).context("BUYER_PRIVATE_KEY is not a valid secp256k1 private key")
}

/// The seller: `SELLER_ADDRESS`, else the address of `SELLER_PRIVATE_KEY`.
pub fn seller_address() -> Result<EthAddress> {
    if let Some(addr) = non_empty_var("SELLER_ADDRESS") {
        return addr
            .parse()
            .with_context(|| format!("SELLER_ADDRESS {addr:?} is not an address"));
    }
    let key = non_empty_var("SELLER_PRIVATE_KEY")
        .context("SELLER_ADDRESS or SELLER_PRIVATE_KEY environment variable is required")?;
    let wallet = Wallet::from_hex(&key)
        .context("SELLER_PRIVATE_KEY is not a valid secp256k1 private key")?;
    Ok(wallet.address())
}

fn non_empty_var(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_documented_defaults() {
        let settings = EscrowSettings::default();
        assert_eq!(settings.chain, "ethereum");
        assert_eq!(settings.deposit, Wei::parse_ether(DEFAULT_DEPOSIT_ETHER).unwrap());
    }

    #[test]
    fn amount_flag_bypasses_deposit_variable() {
        std::env::set_var("ESCROW_DEPOSIT_ETHER", "not-a-number");
        let flagged = deposit_amount(Some("0.5"));
        let unflagged = deposit_amount(None);
        std::env::remove_var("ESCROW_DEPOSIT_ETHER");

        assert_eq!(flagged.unwrap(), Wei::parse_ether("0.5").unwrap());
        let err = unflagged.unwrap_err();
        assert!(format!("{err:#}").contains("ESCROW_DEPOSIT_ETHER"), "got {err:#}");
    }

    #[test]
    fn bad_amount_flag_names_the_flag() {
        let err = deposit_amount(Some("1.2.3")).unwrap_err();
        assert!(err.to_string().contains("--amount"));
    }

    #[test]
    fn dotenv_fills_unset_variables_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DOTENV_FILE),
            "EGATE_DOTENV_FILL=from-file\nEGATE_DOTENV_KEEP=from-file\n",
        )
        .unwrap();
        std::env::remove_var("EGATE_DOTENV_FILL");
        std::env::set_var("EGATE_DOTENV_KEEP", "from-process");

        let ws = Workspace::new(dir.path().to_path_buf());
        let loaded = load_dotenv(&ws).unwrap();
        assert_eq!(loaded, Some(dir.path().join(DOTENV_FILE)));
        assert_eq!(std::env::var("EGATE_DOTENV_FILL").unwrap(), "from-file");
        assert_eq!(std::env::var("EGATE_DOTENV_KEEP").unwrap(), "from-process");

        std::env::remove_var("EGATE_DOTENV_FILL");
        std::env::remove_var("EGATE_DOTENV_KEEP");
    }

    #[test]
    fn missing_dotenv_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path().to_path_buf());
        assert_eq!(load_dotenv(&ws).unwrap(), None);
    }

    #[test]
    fn blank_variables_count_as_unset() {
        std::env::set_var("EGATE_TEST_BLANK_VAR", "   ");
        assert_eq!(non_empty_var("EGATE_TEST_BLANK_VAR"), None);
        std::env::remove_var("EGATE_TEST_BLANK_VAR");
    }
}
