//! Individual WebSocket connection
//!
//! The hub-facing handle of one live connection: its id, the identity it
//! authenticated as, and the bounded outbound queue drained by the transport.

use crate::protocol::ServerEvent;
use chat_core::{ConnectionId, UserId, UserIdentity};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, error::TrySendError};

/// Result of pushing one event into a connection's queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// Queue full; the event was dropped for this connection only
    Full,
    /// Transport already gone
    Closed,
}

/// A single WebSocket connection
pub struct Connection {
    id: ConnectionId,

    /// Identity fixed at authentication
    identity: UserIdentity,

    /// Outbound queue drained by the connection's writer task
    sender: mpsc::Sender<ServerEvent>,

    /// Last inbound frame
    last_activity: Mutex<Instant>,

    /// Events dropped because the queue was full
    dropped: AtomicU64,

    created_at: Instant,
}

impl Connection {
    /// Create a connection with a fresh id
    pub fn new(identity: UserIdentity, sender: mpsc::Sender<ServerEvent>) -> Arc<Self> {
        Self::with_id(ConnectionId::new(), identity, sender)
    }

    pub fn with_id(
        id: ConnectionId,
        identity: UserIdentity,
        sender: mpsc::Sender<ServerEvent>,
    ) -> Arc<Self> {
        let now = Instant::now();
        Arc::new(Self {
            id,
            identity,
            sender,
            last_activity: Mutex::new(now),
            dropped: AtomicU64::new(0),
            created_at: now,
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    pub fn user_id(&self) -> UserId {
        self.identity.id
    }

    /// Record inbound activity
    pub fn touch(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    /// Time since the last inbound frame
    pub fn idle_for(&self) -> Duration {
        self.last_activity.lock().elapsed()
    }

    /// Get connection age
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Push an event without waiting.
    ///
    /// Never blocks: a full queue drops the event for this connection.
    pub fn deliver(&self, event: ServerEvent) -> Delivery {
        match self.sender.try_send(event) {
            Ok(()) => Delivery::Queued,
            Err(TrySendError::Full(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    connection_id = %self.id,
                    event = event.name(),
                    "Outbound queue full, event dropped"
                );
                Delivery::Full
            }
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }

    /// Check if the outbound queue is closed
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("user_id", &self.identity.id)
            .field("dropped", &self.dropped.load(Ordering::Relaxed))
            .field("created_at", &self.created_at)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{connection, identity};
    use super::*;
    use crate::protocol::OnlinePayload;

    fn online(identity: &UserIdentity) -> ServerEvent {
        ServerEvent::UserOnline(OnlinePayload {
            user_id: identity.id,
            username: identity.username.clone(),
        })
    }

    #[tokio::test]
    async fn test_connection_creation() {
        let alice = identity("alice");
        let (conn, _rx) = connection(&alice, 10);

        assert_eq!(conn.user_id(), alice.id);
        assert_eq!(conn.identity().username, "alice");
        assert_eq!(conn.dropped_events(), 0);
        assert!(!conn.is_closed());
    }

    #[tokio::test]
    async fn test_deliver_queues_event() {
        let alice = identity("alice");
        let (conn, mut rx) = connection(&alice, 10);

        assert_eq!(conn.deliver(online(&alice)), Delivery::Queued);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.name(), "user_online");
    }

    #[tokio::test]
    async fn test_full_queue_drops_event() {
        let alice = identity("alice");
        let (conn, mut rx) = connection(&alice, 1);

        assert_eq!(conn.deliver(online(&alice)), Delivery::Queued);
        assert_eq!(conn.deliver(online(&alice)), Delivery::Full);
        assert_eq!(conn.dropped_events(), 1);

        rx.recv().await.unwrap();
        assert_eq!(conn.deliver(online(&alice)), Delivery::Queued);
    }

    #[tokio::test]
    async fn test_closed_queue() {
        let alice = identity("alice");
        let (conn, rx) = connection(&alice, 1);
        drop(rx);

        assert!(conn.is_closed());
        assert_eq!(conn.deliver(online(&alice)), Delivery::Closed);
        assert_eq!(conn.dropped_events(), 0);
    }

    #[tokio::test]
    async fn test_touch_resets_idle_time() {
        let alice = identity("alice");
        let (conn, _rx) = connection(&alice, 1);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(conn.idle_for() >= Duration::from_millis(20));

        conn.touch();
        assert!(conn.idle_for() < Duration::from_millis(20));
    }
}
