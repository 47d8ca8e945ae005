//! # Encrypted Asset Bundle
//!
//! What the encrypt stage produces and the decrypt stage consumes. The JSON
//! form is the pinned `encryptedAsset.json` in the bundle layout; in the split
//! layout each field is pinned as its own text file.

use serde::{Deserialize, Serialize};

use crate::digest::{decode_hex_prefixed, sha256};
use crate::error::ValidationError;

/// Ciphertext, plaintext fingerprint, and network-wrapped key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedAssetBundle {
    /// Base64 of `nonce || AES-256-GCM ciphertext`.
    pub ciphertext: String,
    /// Lowercase hex SHA-256 of the plaintext.
    pub data_to_encrypt_hash: String,
    /// Lowercase hex key blob returned by the key-management network.
    pub encrypted_symmetric_key: String,
}

impl EncryptedAssetBundle {
    /// Reject bundles whose fields are empty or not decodable.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ciphertext.trim().is_empty() {
            return Err(ValidationError::InvalidBundle("ciphertext is empty".into()));
        }
        let hash = decode_hex_prefixed(&self.data_to_encrypt_hash, "dataToEncryptHash")?;
        if hash.len() != 32 {
            return Err(ValidationError::InvalidBundle(format!(
                "dataToEncryptHash must be 32 bytes, got {}",
                hash.len()
            )));
        }
        let key = decode_hex_prefixed(&self.encrypted_symmetric_key, "encryptedSymmetricKey")?;
        if key.is_empty() {
            return Err(ValidationError::InvalidBundle(
                "encryptedSymmetricKey is empty".into(),
            ));
        }
        Ok(())
    }

    /// Parse pinned or cached JSON and validate.
    pub fn from_json(text: &str) -> Result<Self, ValidationError> {
        let bundle: Self = serde_json::from_str(text)
            .map_err(|e| ValidationError::InvalidBundle(e.to_string()))?;
        bundle.validate()?;
        Ok(bundle)
    }

    /// True when `plaintext` hashes to the recorded fingerprint.
    pub fn matches_plaintext(&self, plaintext: &[u8]) -> bool {
        hex::encode(sha256(plaintext)).eq_ignore_ascii_case(self.data_to_encrypt_hash.trim())
    }
}
