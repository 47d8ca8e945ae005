//! Key-management node configuration.

use url::Url;

/// Default network name sent with every request.
pub const DEFAULT_NETWORK: &str = "datil-dev";

/// Configuration for one key-management node.
#[derive(Debug, Clone)]
pub struct KmsConfig {
    /// Node base URL.
    pub node_url: Url,
    /// Network the node belongs to.
    pub network: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Lifetime of sign-in messages and session signatures.
    pub session_ttl_secs: u64,
}

impl KmsConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `KMS_NODE_URL` (required)
    /// - `KMS_NETWORK` (default: `datil-dev`)
    /// - `HTTP_TIMEOUT_SECS` (default: 30)
    /// - `KMS_SESSION_TTL_SECS` (default: 86400)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("KMS_NODE_URL").map_err(|_| ConfigError::MissingNodeUrl)?;
        let node_url = Url::parse(raw.trim())
            .map_err(|e| ConfigError::InvalidUrl("KMS_NODE_URL".into(), e.to_string()))?;
        let network = std::env::var("KMS_NETWORK")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_NETWORK.to_string());
        Ok(Self {
            node_url,
            network,
            timeout_secs: env_u64("HTTP_TIMEOUT_SECS", 30)?,
            session_ttl_secs: env_u64("KMS_SESSION_TTL_SECS", 86_400)?,
        })
    }

    /// Point at a mock node (for testing).
    pub fn local_mock(node_url: Url) -> Self {
        Self {
            node_url,
            network: DEFAULT_NETWORK.to_string(),
            timeout_secs: 5,
            session_ttl_secs: 600,
        }
    }

    /// Node URL as a string key, without a trailing slash.
    pub fn node_key(&self) -> String {
        self.node_url.as_str().trim_end_matches('/').to_string()
    }
}

fn env_u64(var: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber(var.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `KMS_NODE_URL` is unset.
    #[error("KMS_NODE_URL environment variable is required")]
    MissingNodeUrl,
    /// Variable name and parse failure for a URL.
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    /// Variable name and the raw value that is not a `u64`.
    #[error("invalid number for {0}: {1:?}")]
    InvalidNumber(String, String),
    /// Variable whose value is not a valid HTTP header.
    #[error("invalid header value for {0}")]
    InvalidHeader(String),
}
