//! # Session Keys and Session Signatures
//!
//! A wallet signs once to delegate to an ephemeral ed25519 key
//! (`lit:session:<pubkey>`). That key then signs a short JSON payload per
//! node, binding the delegation, the node URL, and a validity window. The
//! node checks the ed25519 signature and the wallet's delegation before it
//! evaluates any access-control condition.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use egate_core::CanonicalBytes;
use egate_crypto::Wallet;
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::KmsError;
use crate::siwe::{chain_id_for, timestamp, AuthSig, SiweMessage};

/// `derivedVia` for session signatures.
pub const SESSION_DERIVED_VIA: &str = "litSessionSignViaNacl";
/// Signature algorithm tag.
pub const SESSION_ALGO: &str = "ed25519";
/// URI scheme prefix naming a session key.
pub const SESSION_URI_PREFIX: &str = "lit:session:";
/// Resource prefix for condition-gated decryption.
pub const CONDITION_RESOURCE_PREFIX: &str = "lit-accesscontrolcondition";
/// Ability requested for decryption.
pub const DECRYPTION_ABILITY: &str = "access-control-condition-decryption";

/// Session signatures keyed by node URL.
pub type SessionSigs = BTreeMap<String, SessionSig>;

/// One node-bound session signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSig {
    /// Hex ed25519 signature over `signed_message`.
    pub sig: String,
    pub derived_via: String,
    /// Canonical JSON of [`SessionPayload`].
    pub signed_message: String,
    /// Hex session public key.
    pub address: String,
    pub algo: String,
}

impl SessionSig {
    /// Check the ed25519 signature against the embedded session key.
    pub fn verify(&self) -> Result<(), KmsError> {
        let pk_bytes: [u8; 32] = hex::decode(&self.address)
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| KmsError::InvalidSessionSig("session key is not 32 hex bytes".into()))?;
        let sig_bytes: [u8; 64] = hex::decode(&self.sig)
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| KmsError::InvalidSessionSig("signature is not 64 hex bytes".into()))?;
        let key = VerifyingKey::from_bytes(&pk_bytes)
            .map_err(|e| KmsError::InvalidSessionSig(e.to_string()))?;
        key.verify_strict(self.signed_message.as_bytes(), &Signature::from_bytes(&sig_bytes))
            .map_err(|e| KmsError::InvalidSessionSig(e.to_string()))
    }

    /// Parse the signed payload.
    pub fn payload(&self) -> Result<SessionPayload, KmsError> {
        serde_json::from_str(&self.signed_message)
            .map_err(|e| KmsError::InvalidSessionSig(format!("payload: {e}")))
    }
}

/// A resource and the ability requested on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAbilityRequest {
    pub resource: String,
    pub resource_prefix: String,
    pub ability: String,
}

/// The JSON a session key signs for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub session_key: String,
    pub resource_ability_requests: Vec<ResourceAbilityRequest>,
    pub capabilities: Vec<AuthSig>,
    pub issued_at: String,
    pub expiration: String,
    pub node_address: String,
}

/// An ephemeral ed25519 key. Discarded when dropped.
pub struct SessionKey {
    signing: SigningKey,
}

impl SessionKey {
    /// Fresh random key.
    pub fn generate() -> Self {
        Self {
            signing: SigningKey::generate(&mut OsRng),
        }
    }

    /// Hex public key.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing.verifying_key().to_bytes())
    }

    /// `lit:session:<pubkey>`
    pub fn session_uri(&self) -> String {
        format!("{SESSION_URI_PREFIX}{}", self.public_key_hex())
    }

    /// Have `wallet` delegate to this key via a sign-in message.
    pub fn delegate(
        &self,
        wallet: &Wallet,
        domain: &str,
        chain: &str,
        nonce: &str,
        issued_at: DateTime<Utc>,
        ttl_secs: u64,
    ) -> Result<AuthSig, KmsError> {
        SiweMessage {
            domain: domain.to_string(),
            address: wallet.address(),
            statement: "Grant this session key access-control-condition decryption.".into(),
            uri: self.session_uri(),
            chain_id: chain_id_for(chain),
            nonce: nonce.to_string(),
            issued_at,
            expiration_time: issued_at + ttl(ttl_secs),
            resources: vec![format!("{CONDITION_RESOURCE_PREFIX}://*")],
        }
        .sign(wallet)
    }

    /// Sign a payload bound to `node_address`.
    pub fn sign_for_node(
        &self,
        node_address: &str,
        capability: &AuthSig,
        issued_at: DateTime<Utc>,
        ttl_secs: u64,
    ) -> Result<SessionSig, KmsError> {
        let payload = SessionPayload {
            session_key: self.public_key_hex(),
            resource_ability_requests: vec![ResourceAbilityRequest {
                resource: "*".into(),
                resource_prefix: CONDITION_RESOURCE_PREFIX.into(),
                ability: DECRYPTION_ABILITY.into(),
            }],
            capabilities: vec![capability.clone()],
            issued_at: timestamp(&issued_at),
            expiration: timestamp(&(issued_at + ttl(ttl_secs))),
            node_address: node_address.to_string(),
        };
        let bytes = CanonicalBytes::new(&payload)?;
        let signed_message = String::from_utf8_lossy(bytes.as_bytes()).into_owned();
        let sig = self.signing.sign(signed_message.as_bytes());
        Ok(SessionSig {
            sig: hex::encode(sig.to_bytes()),
            derived_via: SESSION_DERIVED_VIA.into(),
            signed_message,
            address: self.public_key_hex(),
            algo: SESSION_ALGO.into(),
        })
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("public_key", &self.public_key_hex())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Upper bound on any validity window (ten years).
const MAX_TTL_SECS: u64 = 10 * 365 * 86_400;

fn ttl(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_TTL_SECS) as i64)
}
