//! Error types for the SoftLayer client.

use thiserror::Error;

/// Errors raised by SoftLayer API calls.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SoftLayerError {
    /// Raised when the client cannot be configured.
    #[error("invalid SoftLayer client configuration: {0}")]
    Config(String),
    /// Raised when the API answers with a non-success status.
    #[error("SoftLayer API error {status} ({code}) on {path}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// SoftLayer exception code, when the body carried one.
        code: String,
        /// Request path relative to the endpoint.
        path: String,
        /// Error message from the body, or the raw body.
        message: String,
    },
    /// Raised when the request never produced a response.
    #[error("SoftLayer request failed: {message}")]
    Transport {
        /// Message from the HTTP client.
        message: String,
    },
    /// Raised when a success response cannot be decoded.
    #[error("unexpected SoftLayer response from {path}: {message}")]
    Decode {
        /// Request path relative to the endpoint.
        path: String,
        /// Decoder message.
        message: String,
    },
}

impl SoftLayerError {
    /// Returns `true` for HTTP 404 responses.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Returns `true` for authentication and authorisation failures.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for SoftLayerError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            message: value.to_string(),
        }
    }
}
