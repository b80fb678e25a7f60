//! Message entity <-> model mapper

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use chat_core::entities::{Message, MessageTarget};
use chat_core::error::DomainError;
use chat_core::value_objects::{MessageId, UserId};

use crate::models::MessageModel;

impl TryFrom<MessageModel> for Message {
    type Error = DomainError;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        let target = match (model.room, model.recipients) {
            (Some(room), None) => MessageTarget::Room(room),
            (None, Some(recipients)) => MessageTarget::Private {
                recipients: recipients.into_iter().map(UserId::from_uuid).collect(),
            },
            _ => {
                return Err(DomainError::DatabaseError(format!(
                    "message {} must have exactly one of room or recipients",
                    model.id
                )))
            }
        };

        Ok(Message {
            id: MessageId::from_uuid(model.id),
            sender_id: UserId::from_uuid(model.sender_id),
            target,
            text: model.text,
            meta: model.meta,
            created_at: model.created_at,
        })
    }
}

/// Column values for inserting a message
pub struct MessageInsert<'a> {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub room: Option<&'a str>,
    pub recipients: Option<Vec<Uuid>>,
    pub text: &'a str,
    pub meta: Option<&'a Value>,
    pub created_at: DateTime<Utc>,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Self {
        let (room, recipients) = match &message.target {
            MessageTarget::Room(room) => (Some(room.as_str()), None),
            MessageTarget::Private { recipients } => {
                (None, Some(recipients.iter().map(|id| id.into_inner()).collect()))
            }
        };

        Self {
            id: message.id.into_inner(),
            sender_id: message.sender_id.into_inner(),
            room,
            recipients,
            text: &message.text,
            meta: message.meta.as_ref(),
            created_at: message.created_at,
        }
    }
}
