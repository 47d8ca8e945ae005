//! # Encrypt Subcommand
//!
//! Seals the asset under the escrow's release condition, caches the result
//! locally, pins it, and records the CIDs in `cids.json`.
//!
//! ## Layouts
//!
//! - `bundle`: pins `encryptedAsset.json` (ciphertext, hash, and wrapped key
//!   in one object) and `accessControlConditions.json`.
//! - `split`: pins `encryptedAsset.txt`, `dataToEncryptHash.txt`,
//!   `encryptedSymmetricKey.txt`, and `accessControlConditions.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use egate_core::{BundleManifest, CidManifest, ConditionSet, EncryptedAssetBundle, SplitManifest};
use egate_kms::{encrypt_asset, KmsClient, KmsConfig};
use egate_pin::{PinClient, PinConfig};

use crate::settings::EscrowSettings;
use crate::workspace::{Workspace, MANIFEST_FILE};

/// Asset encrypted when neither `--asset` nor `--asset-file` is given.
pub const DEFAULT_ASSET: &str = "This is the secret asset to be revealed upon fund release.";

/// How the encrypted artifacts are pinned.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// One JSON object plus the condition set.
    #[default]
    Bundle,
    /// One file per field plus the condition set.
    Split,
}

/// Arguments for `egate encrypt`.
#[derive(Args, Debug)]
pub struct EncryptArgs {
    /// Pinning layout.
    #[arg(long, value_enum, default_value_t = Layout::Bundle)]
    pub layout: Layout,

    /// Asset text.
    #[arg(long, conflicts_with = "asset_file")]
    pub asset: Option<String>,

    /// File whose bytes are the asset.
    #[arg(long, value_name = "FILE")]
    pub asset_file: Option<PathBuf>,
}

/// Execute the encrypt subcommand.
pub async fn run_encrypt(args: &EncryptArgs, ws: &Workspace) -> Result<u8> {
    let kms = KmsConfig::from_env().context("key-management configuration")?;
    let pin = PinConfig::from_env().context("pinning configuration")?;
    let settings = EscrowSettings::from_env()?;
    encrypt(args, ws, kms, pin, &settings.chain).await
}

/// Encrypt with explicit configuration.
pub async fn encrypt(
    args: &EncryptArgs,
    ws: &Workspace,
    kms: KmsConfig,
    pin: PinConfig,
    chain: &str,
) -> Result<u8> {
    pin.require_credentials()?;
    let contract = ws.read_contract_address()?;
    let asset = load_asset(args, ws)?;
    let conditions = ConditionSet::escrow_release(&contract, chain);
    let pinning = PinClient::new(pin)?;

    let kms = KmsClient::connect(kms).await?;
    let bundle = encrypt_asset(&kms, &conditions, chain, &asset).await?;
    ws.write_cache(&bundle, &conditions)?;

    let manifest = match args.layout {
        Layout::Bundle => pin_bundle(&pinning, &bundle, &conditions).await?,
        Layout::Split => pin_split(&pinning, &bundle, &conditions).await?,
    };
    ws.write_manifest(&manifest)?;

    println!("Asset encrypted under escrow {contract} ({chain})");
    for (label, cid) in manifest.entries() {
        println!("{label} CID: {cid}");
    }
    println!("Manifest written to {}", ws.root().join(MANIFEST_FILE).display());
    Ok(0)
}

fn load_asset(args: &EncryptArgs, ws: &Workspace) -> Result<Vec<u8>> {
    match (&args.asset, &args.asset_file) {
        (Some(text), _) => Ok(text.as_bytes().to_vec()),
        (None, Some(path)) => {
            let path = ws.resolve(path);
            std::fs::read(&path).with_context(|| format!("failed to read asset {}", path.display()))
        }
        (None, None) => Ok(DEFAULT_ASSET.as_bytes().to_vec()),
    }
}

async fn pin_bundle(
    pinning: &PinClient,
    bundle: &EncryptedAssetBundle,
    conditions: &ConditionSet,
) -> Result<CidManifest> {
    let encrypted_asset_cid = pinning.pin_json("encryptedAsset.json", bundle).await?;
    let access_control_conditions_cid = pinning
        .pin_json("accessControlConditions.json", conditions)
        .await?;
    Ok(CidManifest::Bundle(BundleManifest {
        encrypted_asset_cid,
        access_control_conditions_cid,
    }))
}

async fn pin_split(
    pinning: &PinClient,
    bundle: &EncryptedAssetBundle,
    conditions: &ConditionSet,
) -> Result<CidManifest> {
    let ciphertext_cid = pinning
        .pin_file("encryptedAsset.txt", bundle.ciphertext.clone().into_bytes())
        .await?;
    let data_to_encrypt_hash_cid = pinning
        .pin_file("dataToEncryptHash.txt", bundle.data_to_encrypt_hash.clone().into_bytes())
        .await?;
    let encrypted_symmetric_key_cid = pinning
        .pin_file(
            "encryptedSymmetricKey.txt",
            bundle.encrypted_symmetric_key.clone().into_bytes(),
        )
        .await?;
    let access_control_conditions_cid = pinning
        .pin_json("accessControlConditions.json", conditions)
        .await?;
    Ok(CidManifest::Split(SplitManifest {
        ciphertext_cid,
        data_to_encrypt_hash_cid,
        encrypted_symmetric_key_cid: Some(encrypted_symmetric_key_cid),
        access_control_conditions_cid,
    }))
}
