//! Inbound event handlers
//!
//! Routes decoded client events to the room, message and typing components.
//! Events that fail validation are dropped and logged at `debug`; nothing is
//! ever sent back as an error event.

mod error;
mod rooms;

pub use error::{HandlerError, HandlerResult};
pub use rooms::RoomHandler;

use crate::connection::Connection;
use crate::hub::Hub;
use crate::protocol::ClientEvent;
use std::sync::Arc;

/// Dispatch incoming client events to the appropriate component
pub struct EventDispatcher;

impl EventDispatcher {
    /// Handle one event. Events from a single connection are handled in
    /// arrival order because the connection's reader awaits each call.
    pub async fn dispatch(hub: &Hub, connection: &Arc<Connection>, event: ClientEvent) {
        tracing::trace!(
            connection_id = %connection.id(),
            event = event.name(),
            "Received event"
        );

        match event {
            ClientEvent::JoinRoom(data) => {
                RoomHandler::join(hub, connection, data.room.as_deref());
            }
            ClientEvent::LeaveRoom(data) => {
                RoomHandler::leave(hub, connection, data.room.as_deref());
            }
            ClientEvent::RoomMessage(data) => {
                hub.router()
                    .send_room_message(
                        connection,
                        data.room.as_deref(),
                        data.text.as_deref(),
                        data.meta,
                    )
                    .await;
            }
            ClientEvent::PrivateMessage(data) => {
                hub.router()
                    .send_private_message(
                        connection,
                        data.to_user_id.as_deref(),
                        data.text.as_deref(),
                        data.meta,
                    )
                    .await;
            }
            ClientEvent::Typing(data) => {
                hub.typing().notify_room(
                    connection,
                    data.room.as_deref(),
                    data.is_typing.unwrap_or(false),
                );
            }
            ClientEvent::TypingPrivate(data) => {
                hub.typing().notify_private(
                    connection,
                    data.to_user_id.as_deref(),
                    data.is_typing.unwrap_or(false),
                );
            }
            ClientEvent::Invalid { event, reason } => {
                tracing::debug!(
                    connection_id = %connection.id(),
                    event = %event,
                    reason = %reason,
                    "Dropped malformed event"
                );
            }
            ClientEvent::Unknown(event) => {
                tracing::debug!(
                    connection_id = %connection.id(),
                    event = %event,
                    "Dropped unknown event"
                );
            }
        }
    }
}
