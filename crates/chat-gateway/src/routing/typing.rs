//! Typing notifier. Ephemeral, never persisted.

use crate::broadcast::{deliver_except, deliver_to};
use crate::connection::{Connection, ConnectionRegistry};
use crate::protocol::{ServerEvent, TypingPayload, TypingPrivatePayload};
use crate::rooms::RoomTracker;
use chat_core::UserId;
use chat_service::dto::SenderResponse;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TypingNotifier {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomTracker>,
}

impl TypingNotifier {
    pub fn new(registry: Arc<ConnectionRegistry>, rooms: Arc<RoomTracker>) -> Self {
        Self { registry, rooms }
    }

    /// Notify room members, never the originating connection.
    ///
    /// Returns the number of deliveries, or `None` if the event was dropped.
    pub fn notify_room(&self, from: &Connection, room: Option<&str>, is_typing: bool) -> Option<usize> {
        let Some(room) = room.filter(|r| !r.is_empty()) else {
            tracing::debug!(connection_id = %from.id(), "Typing dropped: missing room");
            return None;
        };

        let targets = self.registry.resolve(&self.rooms.members_of(room));
        let event = ServerEvent::Typing(TypingPayload {
            room: room.to_string(),
            user: SenderResponse::from(from.identity()),
            is_typing,
        });

        Some(deliver_except(&targets, from.id(), &event))
    }

    /// Notify every connection of the target user. The sender's other
    /// connections are not notified.
    pub fn notify_private(
        &self,
        from: &Connection,
        to_user_id: Option<&str>,
        is_typing: bool,
    ) -> Option<usize> {
        let Some(to) = to_user_id.and_then(|id| UserId::parse(id).ok()) else {
            tracing::debug!(connection_id = %from.id(), "Private typing dropped: bad recipient");
            return None;
        };

        let targets = self.registry.handles_of(to);
        let event = ServerEvent::TypingPrivate(TypingPrivatePayload {
            from: SenderResponse::from(from.identity()),
            is_typing,
        });

        Some(deliver_to(&targets, &event))
    }
}
