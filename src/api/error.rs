//! Errors raised at the remote-service boundary

use thiserror::Error;

use super::ObjectKind;

/// Remote API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Session missing or expired
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// The server answered with a non-success status
    #[error("Server rejected {context} (HTTP {status})")]
    Rejected { status: u16, context: String },

    /// A lookup by name or id found nothing
    #[error("{kind} {field}={value} not found")]
    NotFound {
        kind: ObjectKind,
        field: &'static str,
        value: String,
    },

    /// Response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Local I/O while handling the session file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
