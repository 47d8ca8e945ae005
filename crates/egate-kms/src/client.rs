//! # Node Client
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST | `/web/handshake` | Connect; obtain `latestBlockhash` |
//! | POST | `/web/encryption/store` | Wrap a symmetric key under a condition set |
//! | POST | `/web/encryption/retrieve` | Unwrap a key if the conditions hold |
//!
//! A 401 or 403 from any endpoint is [`KmsError::AccessDenied`].

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use egate_core::ConditionSet;
use ed25519_dalek::SigningKey;
use egate_crypto::SymmetricKey;
use rand_core::{OsRng, RngCore};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{ConfigError, KmsConfig};
use crate::error::KmsError;
use crate::session::SessionSigs;
use crate::types::{
    HandshakeRequest, HandshakeResponse, RetrieveKeyRequest, RetrieveKeyResponse,
    StoreKeyRequest, StoreKeyResponse,
};

/// Header carrying the configured network name.
pub const NETWORK_HEADER: &str = "x-kms-network";

/// A connected key-management node.
#[derive(Debug, Clone)]
pub struct KmsClient {
    http: reqwest::Client,
    config: KmsConfig,
    handshake: HandshakeResponse,
}

impl KmsClient {
    /// Build the HTTP client and perform the handshake.
    pub async fn connect(config: KmsConfig) -> Result<Self, KmsError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            NETWORK_HEADER,
            reqwest::header::HeaderValue::from_str(&config.network)
                .map_err(|_| ConfigError::InvalidHeader("KMS_NETWORK".into()))?,
        );
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| KmsError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        let mut challenge = [0u8; 32];
        OsRng.fill_bytes(&mut challenge);
        let ephemeral = SigningKey::generate(&mut OsRng);
        let req = HandshakeRequest {
            client_public_key: hex::encode(ephemeral.verifying_key().to_bytes()),
            challenge: hex::encode(challenge),
        };

        let handshake: HandshakeResponse =
            post_json(&http, &config, "/web/handshake", &req).await?;
        if handshake.latest_blockhash.trim().is_empty() {
            return Err(KmsError::InvalidResponse {
                endpoint: "POST /web/handshake".into(),
                reason: "latestBlockhash is empty".into(),
            });
        }

        tracing::info!(
            node = %config.node_key(),
            network = %config.network,
            version = handshake.node_version.as_deref().unwrap_or("unknown"),
            "connected to key-management node"
        );
        Ok(Self {
            http,
            config,
            handshake,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &KmsConfig {
        &self.config
    }

    /// Handshake result from [`KmsClient::connect`].
    pub fn handshake(&self) -> &HandshakeResponse {
        &self.handshake
    }

    /// Block hash to use as the sign-in nonce.
    pub fn latest_blockhash(&self) -> &str {
        self.handshake.latest_blockhash.trim()
    }

    /// Host of the node URL, used as the sign-in domain.
    pub fn domain(&self) -> String {
        self.config
            .node_url
            .host_str()
            .unwrap_or("localhost")
            .to_string()
    }

    /// Wrap `key` under `conditions`. Returns the opaque key blob.
    pub async fn store_encryption_key(
        &self,
        conditions: &ConditionSet,
        key: &SymmetricKey,
        chain: &str,
    ) -> Result<Vec<u8>, KmsError> {
        let endpoint = "POST /web/encryption/store";
        let req = StoreKeyRequest {
            access_control_conditions: conditions,
            symmetric_key: BASE64.encode(key.as_bytes()),
            chain,
        };
        let resp: StoreKeyResponse =
            post_json(&self.http, &self.config, "/web/encryption/store", &req).await?;
        let blob = egate_core::decode_hex_prefixed(&resp.encrypted_symmetric_key, "encryptedSymmetricKey")
            .map_err(|e| KmsError::InvalidResponse {
                endpoint: endpoint.into(),
                reason: e.to_string(),
            })?;
        if blob.is_empty() {
            return Err(KmsError::InvalidResponse {
                endpoint: endpoint.into(),
                reason: "encryptedSymmetricKey is empty".into(),
            });
        }
        Ok(blob)
    }

    /// Ask the node to unwrap `encrypted_key`. The node evaluates
    /// `conditions` for the session's delegating wallet.
    pub async fn retrieve_encryption_key(
        &self,
        conditions: &ConditionSet,
        encrypted_key: &[u8],
        chain: &str,
        session_sigs: &SessionSigs,
    ) -> Result<SymmetricKey, KmsError> {
        let endpoint = "POST /web/encryption/retrieve";
        let req = RetrieveKeyRequest {
            access_control_conditions: conditions,
            to_decrypt: hex::encode(encrypted_key),
            chain,
            session_sigs,
        };
        let resp: RetrieveKeyResponse =
            post_json(&self.http, &self.config, "/web/encryption/retrieve", &req).await?;
        let raw = BASE64
            .decode(resp.symmetric_key.trim())
            .map_err(|e| KmsError::InvalidResponse {
                endpoint: endpoint.into(),
                reason: format!("symmetricKey is not base64: {e}"),
            })?;
        Ok(SymmetricKey::from_bytes(&raw)?)
    }
}

async fn post_json<Req: Serialize, Resp: DeserializeOwned>(
    http: &reqwest::Client,
    config: &KmsConfig,
    path: &str,
    body: &Req,
) -> Result<Resp, KmsError> {
    let endpoint = format!("POST {path}");
    let url = format!("{}{path}", config.node_key());

    tracing::debug!(%endpoint, "key-management request");

    let resp = http
        .post(&url)
        .json(body)
        .send()
        .await
        .map_err(|e| KmsError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        let body = resp.text().await.unwrap_or_default();
        return Err(KmsError::AccessDenied {
            endpoint,
            status: status.as_u16(),
            body,
        });
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(KmsError::ApiError {
            endpoint,
            status: status.as_u16(),
            body,
        });
    }

    resp.json().await.map_err(|e| KmsError::Deserialization {
        endpoint,
        source: e,
    })
}
