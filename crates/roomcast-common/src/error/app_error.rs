//! Application error types
//!
//! Unified error handling shared by the gateway binary and setup code.

use roomcast_core::DomainError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authentication")]
    MissingAuth,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Server startup/runtime errors
    #[error("Server error: {0}")]
    Server(String),
}

impl AppError {
    /// True when the failure should be reported as an authorization problem
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken | Self::TokenExpired | Self::MissingAuth
        )
    }
}

/// Application result type
pub type AppResult<T> = Result<T, AppError>;
