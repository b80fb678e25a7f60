//! Rejections produced when verifying a presented credential

use thiserror::Error;

/// Why a credential token was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    /// Token was valid but the user it names no longer exists
    #[error("Unknown user")]
    UnknownUser,

    /// The directory could not be consulted
    #[error("Authentication unavailable: {0}")]
    Unavailable(String),
}

impl AuthError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::UnknownUser => "UNKNOWN_USER",
            Self::Unavailable(_) => "AUTH_UNAVAILABLE",
        }
    }
}
