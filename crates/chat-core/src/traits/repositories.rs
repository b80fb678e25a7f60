//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Message, User, UserCredentials};
use crate::error::DomainError;
use crate::value_objects::{MessageId, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Directory
// ============================================================================

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;

    /// Find several users at once; missing ids are skipped
    async fn find_by_ids(&self, ids: &[UserId]) -> RepoResult<Vec<User>>;

    /// Find user by (normalized) username
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Find user and password hash for login
    async fn find_credentials(&self, username: &str) -> RepoResult<Option<UserCredentials>>;

    /// Create a new user. Fails with `UsernameTaken` on a duplicate username.
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    /// Record an online/offline transition
    async fn set_presence(
        &self,
        id: UserId,
        online: bool,
        last_seen: DateTime<Utc>,
    ) -> RepoResult<()>;
}

// ============================================================================
// Message Store
// ============================================================================

/// Query parameters for fetching message history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Only messages created strictly before this instant
    pub before: Option<DateTime<Utc>>,
    pub limit: u32,
}

impl HistoryQuery {
    pub const DEFAULT_LIMIT: u32 = 50;

    pub fn new(before: Option<DateTime<Utc>>, limit: u32) -> Self {
        Self { before, limit }
    }
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            before: None,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Durably append a message
    async fn append(&self, message: &Message) -> RepoResult<MessageId>;

    /// Latest `limit` room messages before `query.before`, returned oldest-first
    async fn room_history(&self, room: &str, query: HistoryQuery) -> RepoResult<Vec<Message>>;

    /// Latest `limit` private messages between two users, returned oldest-first
    async fn private_history(
        &self,
        a: UserId,
        b: UserId,
        query: HistoryQuery,
    ) -> RepoResult<Vec<Message>>;
}
