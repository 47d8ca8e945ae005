//! JSON-RPC endpoint configuration.
//!
//! Loaded from the environment by default, or built explicitly for tests.

use url::Url;

/// Configuration for the chain client.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// JSON-RPC endpoint (Alchemy, Infura, a local node).
    pub rpc_url: Url,
    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Delay between receipt polls in milliseconds.
    pub poll_interval_ms: u64,
    /// Give up waiting for a receipt after this many seconds.
    pub confirm_timeout_secs: u64,
}

impl ChainConfig {
    /// Build with defaults for everything except the endpoint.
    pub fn new(rpc_url: Url) -> Self {
        Self {
            rpc_url,
            timeout_secs: 30,
            poll_interval_ms: 2_000,
            confirm_timeout_secs: 300,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ALCHEMY_API_URL` (required)
    /// - `HTTP_TIMEOUT_SECS` (default: 30)
    /// - `TX_POLL_INTERVAL_MS` (default: 2000)
    /// - `TX_CONFIRM_TIMEOUT_SECS` (default: 300)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("ALCHEMY_API_URL")
            .map_err(|_| ConfigError::Missing("ALCHEMY_API_URL"))?;
        let rpc_url = Url::parse(raw.trim())
            .map_err(|e| ConfigError::InvalidUrl("ALCHEMY_API_URL".into(), e.to_string()))?;
        Ok(Self {
            rpc_url,
            timeout_secs: env_u64("HTTP_TIMEOUT_SECS", 30)?,
            poll_interval_ms: env_u64("TX_POLL_INTERVAL_MS", 2_000)?,
            confirm_timeout_secs: env_u64("TX_CONFIRM_TIMEOUT_SECS", 300)?,
        })
    }

    /// Fast polling against a local mock server.
    pub fn local_mock(rpc_url: Url) -> Self {
        Self {
            rpc_url,
            timeout_secs: 5,
            poll_interval_ms: 10,
            confirm_timeout_secs: 2,
        }
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
    /// Required variable is unset.
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    /// Variable name and parse failure for a URL.
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    /// Variable name and the raw value that is not a `u64`.
    #[error("invalid number for {0}: {1:?}")]
    InvalidNumber(String, String),
}
