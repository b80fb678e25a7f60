//! Entity to DTO conversions

use chat_core::entities::{Message, MessageTarget, User, UserIdentity};

use super::responses::{MessageResponse, SenderResponse, UserResponse};

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name().to_string(),
            avatar_url: user.avatar_url.clone(),
            online: user.online,
            last_seen: user.last_seen,
        }
    }
}

impl From<&UserIdentity> for SenderResponse {
    fn from(identity: &UserIdentity) -> Self {
        Self {
            id: identity.id,
            username: identity.username.clone(),
            display_name: identity.display_name.clone(),
            avatar_url: identity.avatar_url.clone(),
        }
    }
}

impl From<&User> for SenderResponse {
    fn from(user: &User) -> Self {
        Self::from(&user.identity())
    }
}

impl MessageResponse {
    /// Pair a message with its sender's display identity
    pub fn new(message: Message, sender: SenderResponse) -> Self {
        let (room, recipients) = match message.target {
            MessageTarget::Room(room) => (Some(room), None),
            MessageTarget::Private { recipients } => (None, Some(recipients)),
        };

        Self {
            id: message.id,
            sender,
            room,
            recipients,
            text: message.text,
            meta: message.meta,
            created_at: message.created_at,
        }
    }
}
