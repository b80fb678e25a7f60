//! Room membership tracker
//!
//! Two sharded maps: room → member connections, and connection → joined rooms.
//! A room exists only while it has at least one member.

use chat_core::ConnectionId;
use dashmap::DashMap;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct RoomTracker {
    members: DashMap<String, HashSet<ConnectionId>>,
    joined: DashMap<ConnectionId, HashSet<String>>,
}

impl RoomTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a room. Returns `false` if it was already a member.
    pub fn join(&self, connection: ConnectionId, room: &str) -> bool {
        let changed = self
            .members
            .entry(room.to_string())
            .or_default()
            .insert(connection);

        if changed {
            self.joined
                .entry(connection)
                .or_default()
                .insert(room.to_string());
        }

        changed
    }

    /// Remove a connection from a room. Returns `false` if it was not a member.
    pub fn leave(&self, connection: ConnectionId, room: &str) -> bool {
        let changed = self
            .members
            .get_mut(room)
            .is_some_and(|mut set| set.remove(&connection));

        if changed {
            self.members.remove_if(room, |_, set| set.is_empty());

            if let Some(mut rooms) = self.joined.get_mut(&connection) {
                rooms.remove(room);
            }
            self.joined.remove_if(&connection, |_, rooms| rooms.is_empty());
        }

        changed
    }

    /// Snapshot of a room's members; empty for unknown rooms
    pub fn members_of(&self, room: &str) -> HashSet<ConnectionId> {
        self.members
            .get(room)
            .map(|set| set.clone())
            .unwrap_or_default()
    }

    /// Rooms the connection has joined, sorted by name
    pub fn rooms_of(&self, connection: ConnectionId) -> Vec<String> {
        let mut rooms: Vec<String> = self
            .joined
            .get(&connection)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    /// Remove a connection from every room it joined.
    ///
    /// Rooms left empty are reclaimed. Returns the rooms it was removed from.
    pub fn drop_connection(&self, connection: ConnectionId) -> Vec<String> {
        let Some((_, rooms)) = self.joined.remove(&connection) else {
            return Vec::new();
        };

        for room in &rooms {
            if let Some(mut set) = self.members.get_mut(room) {
                set.remove(&connection);
            }
            self.members.remove_if(room, |_, set| set.is_empty());
        }

        let mut rooms: Vec<String> = rooms.into_iter().collect();
        rooms.sort();
        rooms
    }

    pub fn contains(&self, connection: ConnectionId, room: &str) -> bool {
        self.members
            .get(room)
            .is_some_and(|set| set.contains(&connection))
    }

    /// Number of non-empty rooms
    pub fn room_count(&self) -> usize {
        self.members.len()
    }
}
