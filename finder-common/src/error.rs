//! Error types for the restaurant finder

use thiserror::Error;

/// Domain error kinds raised by the service layer
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for restaurant finder operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP status code for each error kind
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::NotFound(_) => 404,
            Self::RateLimited => 429,
            Self::Internal(_) | Self::Config(_) | Self::Io(_) | Self::Json(_) => 500,
        }
    }

    /// Error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal_error",
            Self::RateLimited => "rate_limit_exceeded",
            Self::Config(_) => "config_error",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }

    /// Message safe to hand to API clients.
    ///
    /// Server-side failures never expose their diagnostics.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.status_code() >= 500 {
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        }
    }
}
