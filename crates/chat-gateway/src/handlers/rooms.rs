//! Join/leave handling

use crate::connection::Connection;
use crate::hub::Hub;
use crate::protocol::{RoomMembershipPayload, ServerEvent};
use chat_service::dto::SenderResponse;

pub struct RoomHandler;

impl RoomHandler {
    /// Join a room; on a membership change announce it to every member,
    /// the joiner included. Returns the number of deliveries, `None` when
    /// nothing changed.
    pub fn join(hub: &Hub, connection: &Connection, room: Option<&str>) -> Option<usize> {
        let room = valid_room(connection, room)?;
        if !hub.rooms().join(connection.id(), room) {
            return None;
        }

        tracing::debug!(connection_id = %connection.id(), room = %room, "Joined room");

        let event = ServerEvent::RoomJoined(membership(connection, room));
        Some(hub.broadcast_room(room, &event))
    }

    /// Leave a room; on a membership change announce it to the remaining
    /// members.
    pub fn leave(hub: &Hub, connection: &Connection, room: Option<&str>) -> Option<usize> {
        let room = valid_room(connection, room)?;
        if !hub.rooms().leave(connection.id(), room) {
            return None;
        }

        tracing::debug!(connection_id = %connection.id(), room = %room, "Left room");

        let event = ServerEvent::RoomLeft(membership(connection, room));
        Some(hub.broadcast_room(room, &event))
    }
}

fn valid_room<'a>(connection: &Connection, room: Option<&'a str>) -> Option<&'a str> {
    let room = room.filter(|r| !r.is_empty());
    if room.is_none() {
        tracing::debug!(connection_id = %connection.id(), "Room event dropped: missing room");
    }
    room
}

fn membership(connection: &Connection, room: &str) -> RoomMembershipPayload {
    RoomMembershipPayload {
        room: room.to_string(),
        user: SenderResponse::from(connection.identity()),
    }
}
