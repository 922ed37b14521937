//! Error types for the Netbox client

use thiserror::Error;

/// Errors that can occur when talking to Netbox
#[derive(Error, Debug)]
pub enum NetboxError {
    /// HTTP request failed (connect, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected record shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid base URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// API token cannot be sent as a header value
    #[error("Invalid API token: {0}")]
    InvalidToken(String),

    /// Netbox answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body as returned by Netbox
        message: String,
    },
}

impl NetboxError {
    /// Check if Netbox refused the credentials
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, NetboxError::Api { status: 401 | 403, .. })
    }

    /// Check if Netbox rejected the filter itself (unknown tag, bad field)
    #[must_use]
    pub fn is_bad_filter(&self) -> bool {
        matches!(self, NetboxError::Api { status: 400, .. })
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, NetboxError>;
