//! WebSocket close codes
//!
//! Gateway-specific close codes sent when the server ends a connection.

use serde::{Deserialize, Serialize};

/// Gateway WebSocket close codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Unknown error occurred
    UnknownError = 4000,
    /// Frame was not a JSON text envelope
    DecodeError = 4002,
    /// Registry invariant violated (duplicate or unknown connection)
    RegistryViolation = 4006,
    /// No inbound frame within the idle timeout
    SessionTimeout = 4009,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            4000 => Some(Self::UnknownError),
            4002 => Some(Self::DecodeError),
            4006 => Some(Self::RegistryViolation),
            4009 => Some(Self::SessionTimeout),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Reason text carried in the close frame
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "Unknown error occurred",
            Self::DecodeError => "Invalid payload encoding",
            Self::RegistryViolation => "Connection registry violation",
            Self::SessionTimeout => "Session timeout",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_u16())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_code_from_u16() {
        assert_eq!(CloseCode::from_u16(4000), Some(CloseCode::UnknownError));
        assert_eq!(CloseCode::from_u16(4002), Some(CloseCode::DecodeError));
        assert_eq!(CloseCode::from_u16(4006), Some(CloseCode::RegistryViolation));
        assert_eq!(CloseCode::from_u16(4009), Some(CloseCode::SessionTimeout));
        assert_eq!(CloseCode::from_u16(1000), None);
        assert_eq!(CloseCode::from_u16(4004), None);
    }

    #[test]
    fn test_close_code_roundtrip() {
        for code in [
            CloseCode::UnknownError,
            CloseCode::DecodeError,
            CloseCode::RegistryViolation,
            CloseCode::SessionTimeout,
        ] {
            assert_eq!(CloseCode::from_u16(u16::from(code)), Some(code));
        }
    }

    #[test]
    fn test_close_code_display() {
        assert_eq!(CloseCode::SessionTimeout.to_string(), "Session timeout (4009)");
    }
}
