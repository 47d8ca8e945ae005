//! Pinning client error types.

/// Errors from the pinning API and gateway.
#[derive(Debug, thiserror::Error)]
pub enum PinError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        /// Endpoint being called.
        endpoint: String,
        /// Underlying transport error.
        source: reqwest::Error,
    },

    /// Non-success status.
    #[error("pinning service returned {status} for {endpoint}: {body}")]
    ApiError {
        /// Endpoint being called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// Response body did not deserialize.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        /// Endpoint being called.
        endpoint: String,
        /// Underlying decode error.
        source: reqwest::Error,
    },

    /// Service returned something that is not a usable content identifier.
    #[error("invalid CID from {endpoint}: {source}")]
    InvalidCid {
        /// Endpoint being called.
        endpoint: String,
        /// Why the CID was rejected.
        source: egate_core::ValidationError,
    },

    /// Content could not be serialized for upload.
    #[error("cannot serialize {file_name}: {source}")]
    Serialization {
        /// Upload file name.
        file_name: String,
        /// Underlying serializer error.
        source: serde_json::Error,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
