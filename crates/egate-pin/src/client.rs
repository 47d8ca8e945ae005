//! # Pinning Client
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST | `{api}/pinning/pinFileToIPFS` | Multipart upload, returns `IpfsHash` |
//! | GET | `{gateway}/ipfs/{cid}` | Fetch pinned content |

use std::time::Duration;

use egate_core::Cid;
use serde::{Deserialize, Serialize};

use crate::config::PinConfig;
use crate::error::PinError;

/// Response of `pinFileToIPFS`. Only the CID is used.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PinResponse {
    pub ipfs_hash: String,
    #[serde(default)]
    pub pin_size: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Client for the pinning API and gateway.
#[derive(Debug, Clone)]
pub struct PinClient {
    http: reqwest::Client,
    config: PinConfig,
}

impl PinClient {
    pub fn new(config: PinConfig) -> Result<Self, PinError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PinError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self { http, config })
    }

    /// Upload `content` as a file named `file_name`; returns its CID.
    pub async fn pin_file(&self, file_name: &str, content: Vec<u8>) -> Result<Cid, PinError> {
        let endpoint = "POST /pinning/pinFileToIPFS";
        let creds = self.config.require_credentials()?;
        let url = format!(
            "{}/pinning/pinFileToIPFS",
            self.config.api_url.as_str().trim_end_matches('/')
        );

        let size = content.len();
        let part = reqwest::multipart::Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| PinError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;
        let metadata = serde_json::json!({ "name": file_name }).to_string();
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("pinataMetadata", metadata);

        let resp = self
            .http
            .post(&url)
            .header("pinata_api_key", creds.api_key.as_str())
            .header("pinata_secret_api_key", creds.api_secret.as_str())
            .multipart(form)
            .send()
            .await
            .map_err(|e| PinError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(PinError::ApiError {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        let pinned: PinResponse = resp.json().await.map_err(|e| PinError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })?;
        let cid = Cid::new(pinned.ipfs_hash).map_err(|e| PinError::InvalidCid {
            endpoint: endpoint.into(),
            source: e,
        })?;

        tracing::info!(file_name, size, cid = %cid, "pinned");
        Ok(cid)
    }

    /// Upload `value` as pretty-printed JSON.
    pub async fn pin_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<Cid, PinError> {
        let body = serde_json::to_vec_pretty(value).map_err(|e| PinError::Serialization {
            file_name: file_name.to_string(),
            source: e,
        })?;
        self.pin_file(file_name, body).await
    }

    /// Fetch pinned content through the gateway.
    pub async fn fetch(&self, cid: &Cid) -> Result<Vec<u8>, PinError> {
        let endpoint = format!("GET /ipfs/{cid}");
        let url = format!(
            "{}/ipfs/{cid}",
            self.config.gateway_url.as_str().trim_end_matches('/')
        );

        let resp = self.http.get(&url).send().await.map_err(|e| PinError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(PinError::ApiError {
                endpoint,
                status,
                body,
            });
        }

        let bytes = resp.bytes().await.map_err(|e| PinError::Deserialization {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        tracing::debug!(cid = %cid, len = bytes.len(), "fetched from gateway");
        Ok(bytes.to_vec())
    }

    /// Fetch pinned content as UTF-8 text, lossily.
    pub async fn fetch_text(&self, cid: &Cid) -> Result<String, PinError> {
        let bytes = self.fetch(cid).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
