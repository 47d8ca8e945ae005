//! # Decrypt Subcommand
//!
//! The buyer recovers the asset once `isFundsReleased()` holds. Inputs come
//! either from the pinned CIDs in `cids.json` or from the local cache the
//! encrypt stage wrote.
//!
//! Whatever the source, the condition set must equal the one rebuilt from
//! `contractAddress.txt`. A pinned or cached set that names another contract
//! is refused before the key-management network is contacted.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};

use egate_core::{CidManifest, ConditionSet, EncryptedAssetBundle, EthAddress};
use egate_crypto::Wallet;
use egate_kms::{decrypt_asset, KmsClient, KmsConfig};
use egate_pin::{PinClient, PinConfig};

use crate::settings::{self, EscrowSettings};
use crate::workspace::{Workspace, CONDITIONS_FILE, ENCRYPTED_KEY_FILE, MANIFEST_FILE};

/// Where the encrypted artifacts are read from.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Source {
    /// Fetch the CIDs in `cids.json` from the gateway.
    #[default]
    Pinned,
    /// Read the files the encrypt stage cached locally.
    Local,
}

/// Arguments for `egate decrypt`.
#[derive(Args, Debug)]
pub struct DecryptArgs {
    /// Artifact source.
    #[arg(long, value_enum, default_value_t = Source::Pinned)]
    pub source: Source,

    /// Write the plaintext here instead of printing it.
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute the decrypt subcommand.
pub async fn run_decrypt(args: &DecryptArgs, ws: &Workspace) -> Result<u8> {
    let kms = KmsConfig::from_env().context("key-management configuration")?;
    let pin = PinConfig::from_env().context("pinning configuration")?;
    let settings = EscrowSettings::from_env()?;
    let buyer = settings::buyer_wallet()?;
    decrypt(args, ws, kms, pin, &settings.chain, buyer).await
}

/// Decrypt with explicit configuration.
pub async fn decrypt(
    args: &DecryptArgs,
    ws: &Workspace,
    kms: KmsConfig,
    pin: PinConfig,
    chain: &str,
    buyer: Wallet,
) -> Result<u8> {
    let contract = ws.read_contract_address()?;
    let expected = ConditionSet::escrow_release(&contract, chain);

    let (bundle, conditions) = match args.source {
        Source::Local => {
            let (bundle, cached) = ws.read_cache()?;
            ensure_same_conditions(&cached, &expected, &contract, CONDITIONS_FILE)?;
            (bundle, cached)
        }
        Source::Pinned => {
            let manifest = ws.read_manifest()?;
            let local_key = match &manifest {
                CidManifest::Split(m) if m.encrypted_symmetric_key_cid.is_none() => {
                    tracing::info!(
                        "{MANIFEST_FILE} has no key CID; using local {ENCRYPTED_KEY_FILE}"
                    );
                    Some(ws.read_encrypted_key()?)
                }
                _ => None,
            };
            let pinning = PinClient::new(pin)?;
            fetch_pinned(&pinning, &manifest, local_key, &expected, &contract).await?
        }
    };

    let kms = KmsClient::connect(kms).await?;
    let plaintext = decrypt_asset(&kms, &buyer, &conditions, &bundle, chain)
        .await
        .context("decryption refused or failed")?;

    match &args.output {
        Some(path) => {
            let path = ws.resolve(path);
            std::fs::write(&path, &plaintext)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Decrypted asset written to {}", path.display());
        }
        None => println!("Decrypted Asset: {}", String::from_utf8_lossy(&plaintext)),
    }
    Ok(0)
}

async fn fetch_pinned(
    pinning: &PinClient,
    manifest: &CidManifest,
    local_key: Option<String>,
    expected: &ConditionSet,
    contract: &EthAddress,
) -> Result<(EncryptedAssetBundle, ConditionSet)> {
    let conditions_cid = manifest.conditions_cid();
    let text = pinning.fetch_text(conditions_cid).await?;
    let pinned = ConditionSet::from_json(&text)
        .with_context(|| format!("pinned conditions {conditions_cid} are not a valid condition set"))?;
    ensure_same_conditions(&pinned, expected, contract, conditions_cid.as_str())?;

    let bundle = match manifest {
        CidManifest::Bundle(m) => {
            let text = pinning.fetch_text(&m.encrypted_asset_cid).await?;
            EncryptedAssetBundle::from_json(&text).with_context(|| {
                format!("pinned asset {} is not an encrypted bundle", m.encrypted_asset_cid)
            })?
        }
        CidManifest::Split(m) => {
            let ciphertext = pinning.fetch_text(&m.ciphertext_cid).await?;
            let hash = pinning.fetch_text(&m.data_to_encrypt_hash_cid).await?;
            let key = match (&m.encrypted_symmetric_key_cid, local_key) {
                (Some(cid), _) => pinning.fetch_text(cid).await?,
                (None, Some(key)) => key,
                (None, None) => bail!("{MANIFEST_FILE} has no key CID and no local key was loaded"),
            };
            let bundle = EncryptedAssetBundle {
                ciphertext: ciphertext.trim().to_string(),
                data_to_encrypt_hash: hash.trim().to_string(),
                encrypted_symmetric_key: key.trim().to_string(),
            };
            bundle
                .validate()
                .context("pinned split files do not form a valid encrypted bundle")?;
            bundle
        }
    };
    Ok((bundle, pinned))
}

fn ensure_same_conditions(
    found: &ConditionSet,
    expected: &ConditionSet,
    contract: &EthAddress,
    origin: &str,
) -> Result<()> {
    if !found.matches(expected)? {
        bail!(
            "conditions in {origin} do not gate release of escrow {contract}; \
             re-run encrypt for this contract"
        );
    }
    Ok(())
}
