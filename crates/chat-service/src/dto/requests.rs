//! Request DTOs for API endpoints

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

/// Account creation request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(
        length(min = 2, max = 32, message = "Username must be 2-32 characters"),
        custom(function = validate_username_chars)
    )]
    pub username: String,

    #[validate(length(max = 64, message = "Display name must be at most 64 characters"))]
    pub display_name: Option<String>,

    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Missing fields"))]
    pub username: String,

    #[validate(length(min = 1, message = "Missing fields"))]
    pub password: String,
}

/// Query parameters for history endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    /// Only messages created before this instant (RFC 3339)
    pub before: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

fn validate_username_chars(username: &str) -> Result<(), validator::ValidationError> {
    let ok = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');

    if ok {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("username_chars");
        err.message = Some("Username may only contain letters, digits, '_', '-' and '.'".into());
        Err(err)
    }
}
