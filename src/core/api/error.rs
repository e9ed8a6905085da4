//! Error types for the Datamere API client.
//!
//! This module defines the error types used throughout the api module,
//! using thiserror for ergonomic error handling.

use thiserror::Error;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Datamere API client.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (invalid base URL, missing values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Not authenticated - no credential available or the backend rejected it.
    #[error("Not authenticated - please sign in first")]
    NotAuthenticated,

    /// HTTP request error (connection, timeout, transport).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Credential provider failure (keyring unavailable, etc.).
    #[error("Credential error: {0}")]
    Credential(#[from] crate::core::credentials::CredentialError),

    /// Local I/O error (writing a downloaded file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if this error is retriable.
    ///
    /// Transient fetch failures (transport errors, 5xx) may succeed on a
    /// retry; validation and authentication failures will not.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if this error indicates authentication is needed.
    #[must_use]
    pub fn needs_auth(&self) -> bool {
        matches!(self, Self::NotAuthenticated)
    }

    /// Creates an API error from a status code and message.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}
