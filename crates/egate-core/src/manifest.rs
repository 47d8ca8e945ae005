//! # CID Manifest
//!
//! `cids.json` records what the encrypt stage pinned. Two layouts exist:
//!
//! - **bundle**: one JSON object holding ciphertext, hash, and wrapped key,
//!   plus the condition set.
//! - **split**: each piece pinned as its own file. Older manifests omit the
//!   wrapped-key CID; the decrypt stage then falls back to the local
//!   `encryptedSymmetricKey` file.
//!
//! The layout is recognized from field names, so a manifest written by either
//! layout reads back without loss.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A content identifier returned by the pinning service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cid(String);

impl Cid {
    /// Validate and wrap. CIDv0 (base58) and CIDv1 (base32) are both
    /// alphanumeric.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::InvalidCid(raw));
        }
        Ok(Self(raw))
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Cid {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Cid> for String {
    fn from(cid: Cid) -> Self {
        cid.0
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bundle layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundleManifest {
    /// `encryptedAsset.json`.
    pub encrypted_asset_cid: Cid,
    /// `accessControlConditions.json`.
    pub access_control_conditions_cid: Cid,
}

/// Split layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SplitManifest {
    /// `encryptedAsset.txt`.
    pub ciphertext_cid: Cid,
    /// `dataToEncryptHash.txt`.
    pub data_to_encrypt_hash_cid: Cid,
    /// `encryptedSymmetricKey.txt`; absent in manifests from older runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_symmetric_key_cid: Option<Cid>,
    /// `accessControlConditions.json`.
    pub access_control_conditions_cid: Cid,
}

/// Either manifest layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CidManifest {
    /// See [`SplitManifest`].
    Split(SplitManifest),
    /// See [`BundleManifest`].
    Bundle(BundleManifest),
}

impl CidManifest {
    /// Parse `cids.json` text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Pretty JSON for `cids.json`.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// CID of the pinned condition set, present in both layouts.
    pub fn conditions_cid(&self) -> &Cid {
        match self {
            Self::Split(m) => &m.access_control_conditions_cid,
            Self::Bundle(m) => &m.access_control_conditions_cid,
        }
    }

    /// Every CID in the manifest, labelled, in write order.
    pub fn entries(&self) -> Vec<(&'static str, &Cid)> {
        match self {
            Self::Bundle(m) => vec![
                ("encryptedAsset", &m.encrypted_asset_cid),
                ("accessControlConditions", &m.access_control_conditions_cid),
            ],
            Self::Split(m) => {
                let mut out = vec![
                    ("ciphertext", &m.ciphertext_cid),
                    ("dataToEncryptHash", &m.data_to_encrypt_hash_cid),
                ];
                if let Some(k) = &m.encrypted_symmetric_key_cid {
                    out.push(("encryptedSymmetricKey", k));
                }
                out.push(("accessControlConditions", &m.access_control_conditions_cid));
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(s: &str) -> Cid {
        Cid::new(s).unwrap()
    }

    #[test]
    fn bundle_manifest_round_trips() {
        let m = CidManifest::Bundle(BundleManifest {
            encrypted_asset_cid: cid("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"),
            access_control_conditions_cid: cid(
                "bafkreigh2akiscaildcqabsyg3dfr6chu3fgpregiymsck7e7aqa4s52zy",
            ),
        });
        let text = m.to_json_pretty().unwrap();
        assert!(text.contains("\"encryptedAssetCid\""));
        assert_eq!(CidManifest::from_json(&text).unwrap(), m);
    }

    #[test]
    fn split_manifest_round_trips() {
        let m = CidManifest::Split(SplitManifest {
            ciphertext_cid: cid("QmA"),
            data_to_encrypt_hash_cid: cid("QmB"),
            encrypted_symmetric_key_cid: Some(cid("QmC")),
            access_control_conditions_cid: cid("QmD"),
        });
        let text = m.to_json_pretty().unwrap();
        assert_eq!(CidManifest::from_json(&text).unwrap(), m);
        assert_eq!(m.entries().len(), 4);
    }

    #[test]
    fn legacy_split_manifest_without_key_cid_loads() {
        let text = r#"{
          "ciphertextCid": "QmA",
          "dataToEncryptHashCid": "QmB",
          "accessControlConditionsCid": "QmD"
        }"#;
        match CidManifest::from_json(text).unwrap() {
            CidManifest::Split(m) => {
                assert!(m.encrypted_symmetric_key_cid.is_none());
                assert_eq!(m.access_control_conditions_cid.as_str(), "QmD");
            }
            other => panic!("expected split manifest, got {other:?}"),
        }
        let reparsed = CidManifest::from_json(text).unwrap();
        assert!(!reparsed.to_json_pretty().unwrap().contains("encryptedSymmetricKeyCid"));
    }

    #[test]
    fn bundle_manifest_is_not_misread_as_split() {
        let text = r#"{"encryptedAssetCid":"QmA","accessControlConditionsCid":"QmB"}"#;
        assert!(matches!(CidManifest::from_json(text).unwrap(), CidManifest::Bundle(_)));
    }

    #[test]
    fn manifest_with_unknown_shape_is_rejected() {
        assert!(CidManifest::from_json(r#"{"foo":"QmA"}"#).is_err());
        assert!(CidManifest::from_json("not json").is_err());
    }

    #[test]
    fn manifest_with_empty_cid_is_rejected() {
        let text = r#"{"encryptedAssetCid":"","accessControlConditionsCid":"QmB"}"#;
        assert!(CidManifest::from_json(text).is_err());
    }

    #[test]
    fn cid_rejects_whitespace_and_paths() {
        assert!(Cid::new("Qm abc").is_err());
        assert!(Cid::new("../etc/passwd").is_err());
        assert!(Cid::new("").is_err());
    }
}
