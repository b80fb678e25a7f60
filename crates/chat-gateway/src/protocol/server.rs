//! Outbound (server → client) events

use chat_core::{ConnectionId, UserId};
use chat_service::dto::{MessageResponse, SenderResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Events pushed to a connection's outbound queue.
///
/// Serialized as `{"event": "<snake_case variant>", "data": {...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Ready(ReadyPayload),
    UserOnline(OnlinePayload),
    UserOffline(OfflinePayload),
    RoomJoined(RoomMembershipPayload),
    RoomLeft(RoomMembershipPayload),
    /// The persisted message itself, shaped as in history responses
    RoomMessage(MessageResponse),
    PrivateMessage(MessageResponse),
    Typing(TypingPayload),
    TypingPrivate(TypingPrivatePayload),
}

impl ServerEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready(_) => "ready",
            Self::UserOnline(_) => "user_online",
            Self::UserOffline(_) => "user_offline",
            Self::RoomJoined(_) => "room_joined",
            Self::RoomLeft(_) => "room_left",
            Self::RoomMessage(_) => "room_message",
            Self::PrivateMessage(_) => "private_message",
            Self::Typing(_) => "typing",
            Self::TypingPrivate(_) => "typing_private",
        }
    }

    /// Serialize to a JSON text frame
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyPayload {
    pub connection_id: ConnectionId,
    pub user: SenderResponse,
    pub rooms: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlinePayload {
    pub user_id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflinePayload {
    pub user_id: UserId,
    pub username: String,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomMembershipPayload {
    pub room: String,
    pub user: SenderResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub room: String,
    pub user: SenderResponse,
    pub is_typing: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPrivatePayload {
    pub from: SenderResponse,
    pub is_typing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::entities::{Message, User};

    fn sender() -> SenderResponse {
        SenderResponse::from(&User::new(UserId::new(), "alice", Some("Alice".to_string())))
    }

    #[test]
    fn test_envelope_shape() {
        let user_id = UserId::new();
        let event = ServerEvent::UserOnline(OnlinePayload {
            user_id,
            username: "alice".to_string(),
        });

        let json: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["event"], "user_online");
        assert_eq!(json["data"]["userId"], user_id.to_string());
        assert_eq!(json["data"]["username"], "alice");
    }

    #[test]
    fn test_typing_private_fields() {
        let event = ServerEvent::TypingPrivate(TypingPrivatePayload {
            from: sender(),
            is_typing: true,
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "typing_private");
        assert_eq!(json["data"]["isTyping"], true);
        assert_eq!(json["data"]["from"]["displayName"], "Alice");
    }

    #[test]
    fn test_room_message_carries_sender_identity() {
        let from = sender();
        let message = Message::room(from.id, "lobby", "hello", None);
        let event = ServerEvent::RoomMessage(MessageResponse::new(message, from));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(event.name(), "room_message");
        assert_eq!(json["data"]["room"], "lobby");
        assert_eq!(json["data"]["sender"]["username"], "alice");
    }

    #[test]
    fn test_private_message_data_matches_history_shape() {
        let from = sender();
        let message = Message::private(from.id, UserId::new(), "psst", None);
        let response = MessageResponse::new(message, from);
        let event = ServerEvent::PrivateMessage(response.clone());

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["data"], serde_json::to_value(&response).unwrap());
        assert_eq!(json["data"]["text"], "psst");
        assert!(json["data"].get("message").is_none());
    }
}
