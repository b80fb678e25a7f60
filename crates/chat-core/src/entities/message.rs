//! Message entity - a room or private chat message

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::value_objects::{MessageId, UserId};

/// Where a message is addressed. Exactly one of room or private.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTarget {
    Room(String),
    /// Recipients always include the sender
    Private { recipients: Vec<UserId> },
}

/// Message entity, immutable once created
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub target: MessageTarget,
    pub text: String,
    /// Opaque client-supplied metadata
    pub meta: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message addressed to a room
    pub fn room(sender_id: UserId, room: impl Into<String>, text: impl Into<String>, meta: Option<Value>) -> Self {
        Self {
            id: MessageId::new(),
            sender_id,
            target: MessageTarget::Room(room.into()),
            text: text.into(),
            meta,
            created_at: Utc::now(),
        }
    }

    /// Create a private message; recipients are the sender and `to`
    pub fn private(sender_id: UserId, to: UserId, text: impl Into<String>, meta: Option<Value>) -> Self {
        let mut recipients = vec![sender_id];
        if to != sender_id {
            recipients.push(to);
        }

        Self {
            id: MessageId::new(),
            sender_id,
            target: MessageTarget::Private { recipients },
            text: text.into(),
            meta,
            created_at: Utc::now(),
        }
    }

    /// Room name for room messages
    pub fn room_name(&self) -> Option<&str> {
        match &self.target {
            MessageTarget::Room(room) => Some(room),
            MessageTarget::Private { .. } => None,
        }
    }

    /// Recipients of a private message; empty for room messages
    pub fn recipients(&self) -> &[UserId] {
        match &self.target {
            MessageTarget::Private { recipients } => recipients,
            MessageTarget::Room(_) => &[],
        }
    }

    #[inline]
    pub fn is_private(&self) -> bool {
        matches!(self.target, MessageTarget::Private { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_message() {
        let sender = UserId::new();
        let msg = Message::room(sender, "lobby", "hello", None);

        assert_eq!(msg.room_name(), Some("lobby"));
        assert!(msg.recipients().is_empty());
        assert!(!msg.is_private());
    }

    #[test]
    fn test_private_message_includes_sender() {
        let sender = UserId::new();
        let to = UserId::new();
        let msg = Message::private(sender, to, "psst", None);

        assert!(msg.is_private());
        assert_eq!(msg.recipients(), &[sender, to]);
        assert_eq!(msg.room_name(), None);
    }

    #[test]
    fn test_private_message_to_self_is_deduplicated() {
        let sender = UserId::new();
        let msg = Message::private(sender, sender, "note to self", None);
        assert_eq!(msg.recipients(), &[sender]);
    }

    #[test]
    fn test_meta_is_kept() {
        let meta = serde_json::json!({"client": "web", "nonce": 7});
        let msg = Message::room(UserId::new(), "lobby", "hi", Some(meta.clone()));
        assert_eq!(msg.meta, Some(meta));
    }
}
