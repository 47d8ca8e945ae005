//! Request and response bodies for the node's `/web/*` endpoints.

use egate_core::ConditionSet;
use serde::{Deserialize, Serialize};

use crate::session::SessionSigs;

/// `POST /web/handshake`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeRequest {
    /// Hex ed25519 public key of a per-connection ephemeral keypair.
    pub client_public_key: String,
    /// Hex of 32 random bytes.
    pub challenge: String,
}

/// Handshake result. Only `latestBlockhash` is required.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeResponse {
    #[serde(default)]
    pub server_public_key: Option<String>,
    #[serde(default)]
    pub subnet_public_key: Option<String>,
    #[serde(default)]
    pub network_public_key: Option<String>,
    pub latest_blockhash: String,
    #[serde(default)]
    pub node_version: Option<String>,
}

/// `POST /web/encryption/store`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreKeyRequest<'a> {
    pub access_control_conditions: &'a ConditionSet,
    /// Base64 of the raw 32-byte key.
    pub symmetric_key: String,
    pub chain: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreKeyResponse {
    /// Hex key blob.
    pub encrypted_symmetric_key: String,
}

/// `POST /web/encryption/retrieve`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveKeyRequest<'a> {
    pub access_control_conditions: &'a ConditionSet,
    /// Hex key blob from the store call.
    pub to_decrypt: String,
    pub chain: &'a str,
    pub session_sigs: &'a SessionSigs,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveKeyResponse {
    /// Base64 of the raw 32-byte key.
    pub symmetric_key: String,
}
