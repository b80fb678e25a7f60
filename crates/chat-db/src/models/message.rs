//! Message database model

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for messages table.
///
/// Exactly one of `room` and `recipients` is set.
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub room: Option<String>,
    pub recipients: Option<Vec<Uuid>>,
    pub text: String,
    pub meta: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl MessageModel {
    #[inline]
    pub fn is_private(&self) -> bool {
        self.recipients.is_some()
    }
}
