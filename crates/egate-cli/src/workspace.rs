//! # Working Directory
//!
//! Stages hand state to each other through files in one directory:
//!
//! | File | Written by | Read by |
//! |------|------------|---------|
//! | `contractAddress.txt` | deploy | deposit, encrypt, release, decrypt, status |
//! | `cids.json` | encrypt | decrypt (pinned), status |
//! | `encryptedAsset` | encrypt | decrypt (local) |
//! | `encryptedSymmetricKey` | encrypt | decrypt (local, legacy split manifests) |
//! | `dataToEncryptHash` | encrypt | decrypt (local) |
//! | `accessControlConditions.json` | encrypt | decrypt (local) |
//!
//! Every reader names the file in its error, and all reads happen before a
//! stage opens any network connection.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use egate_core::{CidManifest, ConditionSet, EncryptedAssetBundle, EthAddress};

pub const CONTRACT_ADDRESS_FILE: &str = "contractAddress.txt";
pub const MANIFEST_FILE: &str = "cids.json";
pub const CIPHERTEXT_FILE: &str = "encryptedAsset";
pub const ENCRYPTED_KEY_FILE: &str = "encryptedSymmetricKey";
pub const HASH_FILE: &str = "dataToEncryptHash";
pub const CONDITIONS_FILE: &str = "accessControlConditions.json";

/// The directory stages read and write.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `path` if absolute, else relative to the workspace root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn read(&self, name: &str) -> Result<String> {
        let path = self.path(name);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))
    }

    fn write(&self, name: &str, contents: &str) -> Result<()> {
        let path = self.path(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))
    }

    /// True when `cids.json` exists.
    pub fn has_manifest(&self) -> bool {
        self.path(MANIFEST_FILE).is_file()
    }

    pub fn read_contract_address(&self) -> Result<EthAddress> {
        let text = self.read(CONTRACT_ADDRESS_FILE)?;
        text.trim()
            .parse()
            .with_context(|| format!("{CONTRACT_ADDRESS_FILE} does not hold a contract address"))
    }

    pub fn write_contract_address(&self, address: &EthAddress) -> Result<()> {
        self.write(CONTRACT_ADDRESS_FILE, &address.to_checksum())
    }

    pub fn read_manifest(&self) -> Result<CidManifest> {
        let text = self.read(MANIFEST_FILE)?;
        CidManifest::from_json(&text)
            .with_context(|| format!("{MANIFEST_FILE} is not a recognized CID manifest"))
    }

    pub fn write_manifest(&self, manifest: &CidManifest) -> Result<()> {
        let json = manifest
            .to_json_pretty()
            .context("failed to serialize CID manifest")?;
        self.write(MANIFEST_FILE, &json)
    }

    /// Hex key blob from `encryptedSymmetricKey`.
    pub fn read_encrypted_key(&self) -> Result<String> {
        let text = self.read(ENCRYPTED_KEY_FILE)?;
        let trimmed = text.trim().to_string();
        egate_core::decode_hex_prefixed(&trimmed, ENCRYPTED_KEY_FILE)
            .with_context(|| format!("{ENCRYPTED_KEY_FILE} is not hex"))?;
        Ok(trimmed)
    }

    /// Write the four local cache files.
    pub fn write_cache(&self, bundle: &EncryptedAssetBundle, conditions: &ConditionSet) -> Result<()> {
        self.write(CIPHERTEXT_FILE, &bundle.ciphertext)?;
        self.write(ENCRYPTED_KEY_FILE, &bundle.encrypted_symmetric_key)?;
        self.write(HASH_FILE, &bundle.data_to_encrypt_hash)?;
        let json = conditions
            .to_json_pretty()
            .context("failed to serialize access-control conditions")?;
        self.write(CONDITIONS_FILE, &json)
    }

    /// Read the four local cache files back.
    pub fn read_cache(&self) -> Result<(EncryptedAssetBundle, ConditionSet)> {
        let bundle = EncryptedAssetBundle {
            ciphertext: self.read(CIPHERTEXT_FILE)?.trim().to_string(),
            data_to_encrypt_hash: self.read(HASH_FILE)?.trim().to_string(),
            encrypted_symmetric_key: self.read_encrypted_key()?,
        };
        bundle
            .validate()
            .context("local cache files do not form a valid encrypted bundle")?;
        let conditions = ConditionSet::from_json(&self.read(CONDITIONS_FILE)?)
            .with_context(|| format!("{CONDITIONS_FILE} is not a valid condition set"))?;
        Ok((bundle, conditions))
    }
}
