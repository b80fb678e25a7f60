//! Handler error types

use crate::connection::RegistryError;
use crate::protocol::{CloseCode, ProtocolError};
use thiserror::Error;

/// Errors that end a connection. Event-level validation failures are not
/// errors: those events are dropped.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Frame could not be decoded
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] ProtocolError),

    /// Registry invariant violated
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Close code sent to the client
    pub fn to_close_code(&self) -> CloseCode {
        match self {
            Self::InvalidPayload(_) => CloseCode::DecodeError,
            Self::Registry(_) => CloseCode::RegistryViolation,
            Self::Internal(_) => CloseCode::UnknownError,
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
