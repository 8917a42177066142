//! Error types shared across the crate.
//!
//! Provider errors never reach the user; the bot logs them and replies with a
//! fixed message instead.

/// Failure talking to an external HTTP provider (geocoder, places, completion).
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Transport-level failure: connect, timeout, TLS, body read.
    #[error("request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    /// Provider answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Body was not the JSON shape we expected.
    #[error("failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// Completion provider returned no choices.
    #[error("completion provider returned no choices")]
    EmptyCompletion,
}

impl ProviderError {
    pub fn request(endpoint: &str, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("timed out: {}", err)
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            err.to_string()
        };
        ProviderError::Request {
            endpoint: endpoint.to_string(),
            message,
        }
    }
}

/// Configuration loading or validation failure. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Failure delivering a reply through the messaging transport.
#[derive(Debug, thiserror::Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);
