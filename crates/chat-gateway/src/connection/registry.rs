//! Connection registry
//!
//! Maps live connections to the users they authenticated as. Both directions
//! (connection → user, user → connections) sit behind one lock so they are
//! never observed out of sync.

use super::Connection;
use crate::presence::{PresenceHandle, UserTransition};
use chat_core::{ConnectionId, UserId};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Registry invariant violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Connection {0} is already registered")]
    DuplicateConnection(ConnectionId),

    #[error("Connection {0} is not registered")]
    UnknownConnection(ConnectionId),
}

#[derive(Default)]
struct RegistryState {
    connections: HashMap<ConnectionId, Arc<Connection>>,
    by_user: HashMap<UserId, HashSet<ConnectionId>>,
}

/// Registry of live, authenticated connections
pub struct ConnectionRegistry {
    state: RwLock<RegistryState>,
    presence: PresenceHandle,
}

impl ConnectionRegistry {
    /// Create a registry that reports 0→1 and 1→0 transitions to `presence`
    pub fn new(presence: PresenceHandle) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            presence,
        }
    }

    /// Register a connection under its owner.
    ///
    /// Returns the owner's connection count after insertion. The first
    /// connection of a user emits an `Online` transition before the lock is
    /// released, so transitions reach the coordinator in registry order.
    pub fn register(&self, connection: Arc<Connection>) -> Result<usize, RegistryError> {
        let id = connection.id();
        let user_id = connection.user_id();

        let mut state = self.state.write();
        if state.connections.contains_key(&id) {
            return Err(RegistryError::DuplicateConnection(id));
        }

        let sessions = state.by_user.entry(user_id).or_default();
        sessions.insert(id);
        let count = sessions.len();

        if count == 1 {
            self.presence.transition(UserTransition::Online {
                identity: connection.identity().clone(),
                at: Utc::now(),
            });
        }

        state.connections.insert(id, connection);

        tracing::debug!(connection_id = %id, user_id = %user_id, count, "Connection registered");

        Ok(count)
    }

    /// Remove a connection from both views.
    ///
    /// Returns the connection and its owner's remaining count. Removing the
    /// last connection of a user emits an `Offline` transition under the lock.
    pub fn deregister(&self, id: ConnectionId) -> Result<(Arc<Connection>, usize), RegistryError> {
        let mut state = self.state.write();
        let connection = state
            .connections
            .remove(&id)
            .ok_or(RegistryError::UnknownConnection(id))?;
        let user_id = connection.user_id();

        let remaining = match state.by_user.get_mut(&user_id) {
            Some(sessions) => {
                sessions.remove(&id);
                sessions.len()
            }
            None => 0,
        };

        if remaining == 0 {
            state.by_user.remove(&user_id);
            self.presence.transition(UserTransition::Offline {
                identity: connection.identity().clone(),
                at: Utc::now(),
            });
        }

        drop(state);

        tracing::debug!(connection_id = %id, user_id = %user_id, remaining, "Connection deregistered");

        Ok((connection, remaining))
    }

    /// Snapshot of a user's connection ids
    pub fn connections_of(&self, user_id: UserId) -> HashSet<ConnectionId> {
        self.state
            .read()
            .by_user
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Resolve ids to handles; ids no longer registered are skipped
    pub fn resolve<'a, I>(&self, ids: I) -> Vec<Arc<Connection>>
    where
        I: IntoIterator<Item = &'a ConnectionId>,
    {
        let state = self.state.read();
        ids.into_iter()
            .filter_map(|id| state.connections.get(id).cloned())
            .collect()
    }

    /// Handles of every connection a user has open
    pub fn handles_of(&self, user_id: UserId) -> Vec<Arc<Connection>> {
        let state = self.state.read();
        state
            .by_user
            .get(&user_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.connections.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get(&self, id: ConnectionId) -> Option<Arc<Connection>> {
        self.state.read().connections.get(&id).cloned()
    }

    /// Snapshot of all live connections
    pub fn all(&self) -> Vec<Arc<Connection>> {
        self.state.read().connections.values().cloned().collect()
    }

    pub fn is_online(&self, user_id: UserId) -> bool {
        self.state.read().by_user.contains_key(&user_id)
    }

    pub fn connection_count(&self) -> usize {
        self.state.read().connections.len()
    }

    pub fn user_count(&self) -> usize {
        self.state.read().by_user.len()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("ConnectionRegistry")
            .field("connections", &state.connections.len())
            .field("users", &state.by_user.len())
            .finish()
    }
}
