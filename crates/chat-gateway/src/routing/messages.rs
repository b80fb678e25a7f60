//! Message router
//!
//! validate → persist → resolve recipients → fan out

use crate::broadcast::deliver_to;
use crate::connection::{Connection, ConnectionRegistry};
use crate::protocol::ServerEvent;
use crate::rooms::RoomTracker;
use chat_core::{Message, MessageId, MessageStore, MessageTarget, UserId};
use chat_service::dto::{MessageResponse, SenderResponse};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Why a send produced no message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingRoom,
    MissingText,
    MissingRecipient,
    MalformedRecipient,
    /// The delivery task panicked
    Interrupted,
}

impl DropReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingRoom => "missing room",
            Self::MissingText => "missing text",
            Self::MissingRecipient => "missing recipient",
            Self::MalformedRecipient => "malformed recipient",
            Self::Interrupted => "interrupted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Dropped(DropReason),
    Delivered {
        message_id: MessageId,
        /// `false` when the store rejected the message; it was fanned out anyway
        persisted: bool,
        /// Number of outbound queues that accepted the event
        delivered: usize,
    },
}

impl SendOutcome {
    pub fn delivered(&self) -> usize {
        match self {
            Self::Delivered { delivered, .. } => *delivered,
            Self::Dropped(_) => 0,
        }
    }
}

/// Routes room and private messages
#[derive(Clone)]
pub struct MessageRouter {
    store: Arc<dyn MessageStore>,
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomTracker>,
}

impl MessageRouter {
    pub fn new(
        store: Arc<dyn MessageStore>,
        registry: Arc<ConnectionRegistry>,
        rooms: Arc<RoomTracker>,
    ) -> Self {
        Self {
            store,
            registry,
            rooms,
        }
    }

    /// Persist a room message and deliver it to every member, the sender's
    /// own connections included.
    pub async fn send_room_message(
        &self,
        sender: &Connection,
        room: Option<&str>,
        text: Option<&str>,
        meta: Option<Value>,
    ) -> SendOutcome {
        let Some(room) = non_empty(room) else {
            return dropped(sender, DropReason::MissingRoom);
        };
        let Some(text) = non_empty(text) else {
            return dropped(sender, DropReason::MissingText);
        };

        let message = Message::room(sender.user_id(), room, text, meta);
        self.dispatch(message, SenderResponse::from(sender.identity()))
            .await
    }

    /// Persist a private message and deliver it to every connection of the
    /// recipient and of the sender, each exactly once.
    pub async fn send_private_message(
        &self,
        sender: &Connection,
        to_user_id: Option<&str>,
        text: Option<&str>,
        meta: Option<Value>,
    ) -> SendOutcome {
        let Some(to_user_id) = non_empty(to_user_id) else {
            return dropped(sender, DropReason::MissingRecipient);
        };
        let Some(text) = non_empty(text) else {
            return dropped(sender, DropReason::MissingText);
        };
        let Ok(to) = UserId::parse(to_user_id) else {
            return dropped(sender, DropReason::MalformedRecipient);
        };

        let message = Message::private(sender.user_id(), to, text, meta);
        self.dispatch(message, SenderResponse::from(sender.identity()))
            .await
    }

    /// Run persistence and fan-out on a separate task.
    ///
    /// The caller awaits it, but dropping the caller (connection closing
    /// mid-send) does not cancel the store write.
    async fn dispatch(&self, message: Message, sender: SenderResponse) -> SendOutcome {
        let router = self.clone();
        let task = tokio::spawn(async move { router.persist_and_fan_out(message, sender).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "Message delivery task failed");
                SendOutcome::Dropped(DropReason::Interrupted)
            }
        }
    }

    async fn persist_and_fan_out(&self, message: Message, sender: SenderResponse) -> SendOutcome {
        let message_id = message.id;

        let persisted = match self.store.append(&message).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    message_id = %message_id,
                    sender_id = %sender.id,
                    error = %e,
                    "Failed to persist message, delivering anyway"
                );
                false
            }
        };

        let targets = self.resolve(&message);
        let private = message.is_private();
        let payload = MessageResponse::new(message, sender);
        let event = if private {
            ServerEvent::PrivateMessage(payload)
        } else {
            ServerEvent::RoomMessage(payload)
        };

        let delivered = deliver_to(&targets, &event);

        tracing::debug!(
            message_id = %message_id,
            event = event.name(),
            targets = targets.len(),
            delivered,
            persisted,
            "Message routed"
        );

        SendOutcome::Delivered {
            message_id,
            persisted,
            delivered,
        }
    }

    fn resolve(&self, message: &Message) -> Vec<Arc<Connection>> {
        match &message.target {
            MessageTarget::Room(room) => self.registry.resolve(&self.rooms.members_of(room)),
            MessageTarget::Private { recipients } => {
                let ids: HashSet<_> = recipients
                    .iter()
                    .flat_map(|user_id| self.registry.connections_of(*user_id))
                    .collect();
                self.registry.resolve(&ids)
            }
        }
    }
}

impl std::fmt::Debug for MessageRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRouter").finish_non_exhaustive()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn dropped(sender: &Connection, reason: DropReason) -> SendOutcome {
    tracing::debug!(
        connection_id = %sender.id(),
        reason = reason.as_str(),
        "Message dropped"
    );
    SendOutcome::Dropped(reason)
}
