//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the query (PostgREST error body)
    #[error("Backend error [{code}]: {message}")]
    Backend {
        code: String,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },

    /// Auth endpoint rejected the request
    #[error("Auth error: {0}")]
    Auth(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Shorthand for a backend error without details or hint.
    pub fn backend(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            code: code.into(),
            message: message.into(),
            details: None,
            hint: None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
