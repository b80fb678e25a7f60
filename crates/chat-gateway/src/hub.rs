//! The hub
//!
//! Owns the connection registry, room tracker and presence coordinator, and
//! wires the router and typing notifier over them. The transport calls
//! [`Hub::connect`] once a connection is authenticated, [`Hub::handle_event`]
//! for every decoded frame, and [`Hub::disconnect`] on every close path.

use crate::broadcast::deliver_to;
use crate::connection::{Connection, ConnectionRegistry, RegistryError};
use crate::handlers::{EventDispatcher, HandlerResult};
use crate::presence::{PresenceCoordinator, PresenceHandle};
use crate::protocol::{ClientEvent, ReadyPayload, ServerEvent};
use crate::rooms::RoomTracker;
use crate::routing::{MessageRouter, TypingNotifier};
use chat_core::{ConnectionId, MessageStore, UserDirectory};
use chat_service::dto::SenderResponse;
use std::sync::Arc;

pub struct Hub {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomTracker>,
    presence: PresenceHandle,
    router: MessageRouter,
    typing: TypingNotifier,
    default_rooms: Vec<String>,
}

impl Hub {
    /// Build the hub and spawn its presence tasks.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        messages: Arc<dyn MessageStore>,
        users: Arc<dyn UserDirectory>,
        default_rooms: Vec<String>,
    ) -> Arc<Self> {
        let (presence, commands) = PresenceHandle::channel();
        let registry = Arc::new(ConnectionRegistry::new(presence.clone()));
        let rooms = Arc::new(RoomTracker::new());

        PresenceCoordinator::spawn(commands, Arc::downgrade(&registry), users);

        Arc::new(Self {
            router: MessageRouter::new(messages, registry.clone(), rooms.clone()),
            typing: TypingNotifier::new(registry.clone(), rooms.clone()),
            registry,
            rooms,
            presence,
            default_rooms,
        })
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn rooms(&self) -> &RoomTracker {
        &self.rooms
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    pub fn typing(&self) -> &TypingNotifier {
        &self.typing
    }

    /// Register an authenticated connection, join the default rooms and send
    /// `ready`. The registry emits the presence transition.
    pub fn connect(&self, connection: Arc<Connection>) -> HandlerResult<()> {
        let connection_id = connection.id();
        let count = self.registry.register(connection.clone())?;

        for room in &self.default_rooms {
            self.rooms.join(connection_id, room);
        }

        connection.deliver(ServerEvent::Ready(ReadyPayload {
            connection_id,
            user: SenderResponse::from(connection.identity()),
            rooms: self.rooms.rooms_of(connection_id),
        }));

        tracing::info!(
            connection_id = %connection_id,
            user_id = %connection.user_id(),
            connections = count,
            "Connection registered"
        );

        Ok(())
    }

    /// Remove a connection from the registry and from every room.
    ///
    /// Rooms are cleaned up even if the registry no longer knew the connection.
    pub fn disconnect(&self, connection_id: ConnectionId) -> Result<Arc<Connection>, RegistryError> {
        let result = self.registry.deregister(connection_id);
        let rooms = self.rooms.drop_connection(connection_id);

        match &result {
            Ok((connection, remaining)) => tracing::info!(
                connection_id = %connection_id,
                user_id = %connection.user_id(),
                remaining = *remaining,
                rooms = rooms.len(),
                "Connection removed"
            ),
            Err(e) => tracing::error!(connection_id = %connection_id, error = %e, "Disconnect failed"),
        }

        result.map(|(connection, _)| connection)
    }

    /// Dispatch one inbound event from `connection`
    pub async fn handle_event(&self, connection: &Arc<Connection>, event: ClientEvent) {
        EventDispatcher::dispatch(self, connection, event).await;
    }

    /// Deliver an event to every member of a room
    pub(crate) fn broadcast_room(&self, room: &str, event: &ServerEvent) -> usize {
        let targets = self.registry.resolve(&self.rooms.members_of(room));
        deliver_to(&targets, event)
    }

    /// Wait for queued presence broadcasts and directory writes
    pub async fn flush_presence(&self) {
        self.presence.flush().await;
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("registry", &self.registry)
            .field("rooms", &self.rooms.room_count())
            .field("default_rooms", &self.default_rooms)
            .finish()
    }
}
