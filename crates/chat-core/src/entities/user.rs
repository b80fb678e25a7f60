//! User entity - a directory record and the identity a connection carries

use chrono::{DateTime, Utc};

use crate::value_objects::UserId;

/// User record as kept by the user directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Unique, always lowercase
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub online: bool,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new offline user; the username is normalized
    pub fn new(id: UserId, username: &str, display_name: Option<String>) -> Self {
        Self {
            id,
            username: Self::normalize_username(username),
            display_name: display_name.filter(|d| !d.trim().is_empty()),
            avatar_url: None,
            online: false,
            last_seen: None,
            created_at: Utc::now(),
        }
    }

    /// Usernames are case-insensitive and stored lowercase
    pub fn normalize_username(username: &str) -> String {
        username.trim().to_lowercase()
    }

    /// Display name, falling back to the username
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    /// Snapshot of the identity fields carried by a connection
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name().to_string(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// Display identity attached to a connection for its whole lifetime.
///
/// Sourced once at authentication and never refreshed while the connection lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserIdentity {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// A user together with the stored password hash, only used for login
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}
