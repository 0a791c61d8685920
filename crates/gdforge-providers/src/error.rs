//! Error types for generation clients

use thiserror::Error;

/// Errors that can occur when talking to a generation back end.
///
/// Messages never include the API key. Callers treat every variant the
/// same way: the request produced nothing, and editor state is untouched.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum GenerationError {
    /// Authentication failed (never includes key details)
    #[error("Authentication failed")]
    AuthError,

    /// Rate limited by the vendor
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Network error occurred
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The vendor answered with an error or an unusable status
    #[error("Vendor error: {0}")]
    VendorError(String),

    /// The response body did not have the promised shape
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The vendor answered successfully but with no usable content
    #[error("Empty response from model")]
    EmptyResponse,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Local i/o failed while handling a response payload
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::ParseError(err.to_string())
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::NetworkError("Request timeout".to_string())
        } else if err.is_connect() {
            GenerationError::NetworkError(err.to_string())
        } else if err.is_decode() {
            GenerationError::ParseError(err.to_string())
        } else {
            GenerationError::VendorError(err.to_string())
        }
    }
}

impl From<std::io::Error> for GenerationError {
    fn from(err: std::io::Error) -> Self {
        GenerationError::IoError(err.to_string())
    }
}
