//! Pinning-service configuration.
//!
//! Uploads need API credentials; gateway fetches do not. Credentials are
//! optional at load time and demanded by [`PinConfig::require_credentials`]
//! before an upload stage touches the network.

use url::Url;
use zeroize::Zeroizing;

/// Pinata API key pair.
#[derive(Clone)]
pub struct PinCredentials {
    pub api_key: String,
    pub api_secret: Zeroizing<String>,
}

impl std::fmt::Debug for PinCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Configuration for the pinning API and its gateway.
#[derive(Debug, Clone)]
pub struct PinConfig {
    /// Default: <https://api.pinata.cloud>
    pub api_url: Url,
    /// Default: <https://gateway.pinata.cloud>
    pub gateway_url: Url,
    pub credentials: Option<PinCredentials>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl PinConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PINATA_API_KEY` / `PINATA_API_SECRET` (both or neither)
    /// - `PINATA_API_URL` (default: `https://api.pinata.cloud`)
    /// - `PINATA_GATEWAY_URL` (default: `https://gateway.pinata.cloud`)
    /// - `HTTP_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let key = non_empty_var("PINATA_API_KEY");
        let secret = non_empty_var("PINATA_API_SECRET");
        let credentials = match (key, secret) {
            (Some(api_key), Some(secret)) => Some(PinCredentials {
                api_key,
                api_secret: Zeroizing::new(secret),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("PINATA_API_SECRET")),
            (None, Some(_)) => return Err(ConfigError::Missing("PINATA_API_KEY")),
        };
        Ok(Self {
            api_url: env_url("PINATA_API_URL", "https://api.pinata.cloud")?,
            gateway_url: env_url("PINATA_GATEWAY_URL", "https://gateway.pinata.cloud")?,
            credentials,
            timeout_secs: match std::env::var("HTTP_TIMEOUT_SECS") {
                Ok(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber("HTTP_TIMEOUT_SECS".into(), raw))?,
                Err(_) => 30,
            },
        })
    }

    /// Point both API and gateway at a mock server (for testing).
    pub fn local_mock(base: Url, api_key: &str, api_secret: &str) -> Self {
        Self {
            api_url: base.clone(),
            gateway_url: base,
            credentials: Some(PinCredentials {
                api_key: api_key.to_string(),
                api_secret: Zeroizing::new(api_secret.to_string()),
            }),
            timeout_secs: 5,
        }
    }

    /// Credentials, or an error naming the missing variables.
    pub fn require_credentials(&self) -> Result<&PinCredentials, ConfigError> {
        self.credentials
            .as_ref()
            .ok_or(ConfigError::Missing("PINATA_API_KEY and PINATA_API_SECRET"))
    }
}

fn non_empty_var(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret() {
        let cfg = PinConfig::local_mock("http://127.0.0.1:9/".parse().unwrap(), "key", "hunter2");
        let debug = format!("{cfg:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("key"));
    }

    #[test]
    fn missing_credentials_are_reported() {
        let mut cfg = PinConfig::local_mock("http://127.0.0.1:9/".parse().unwrap(), "k", "s");
        assert!(cfg.require_credentials().is_ok());
        cfg.credentials = None;
        assert!(matches!(cfg.require_credentials(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("EGATE_NONEXISTENT_PIN_URL_4410", "https://gateway.pinata.cloud").unwrap();
        assert_eq!(url.as_str(), "https://gateway.pinata.cloud/");
    }
}
