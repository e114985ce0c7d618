//! Klump API client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KlumpError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed")]
    Unauthorized,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Transaction reference must not be empty")]
    EmptyReference,
}

impl KlumpError {
    /// True when the failure happened before a well-formed provider response
    /// arrived (DNS, TLS, connect, timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self, KlumpError::Http(_))
    }
}
