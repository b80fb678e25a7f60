//! Inbound (client → server) events

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Frame could not be decoded at all; the connection is closed with 4002
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoomData {
    pub room: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoomMessageData {
    pub room: Option<String>,
    pub text: Option<String>,
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrivateMessageData {
    pub to_user_id: Option<String>,
    pub text: Option<String>,
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypingData {
    pub room: Option<String>,
    pub is_typing: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypingPrivateData {
    pub to_user_id: Option<String>,
    pub is_typing: Option<bool>,
}

/// A decoded client event.
///
/// Field presence is checked by the component handling the event, so every
/// payload field is optional here. `Invalid` covers envelopes whose data has
/// the wrong shape; `Unknown` covers event names the gateway does not handle.
/// Both are dropped by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    JoinRoom(RoomData),
    LeaveRoom(RoomData),
    RoomMessage(RoomMessageData),
    PrivateMessage(PrivateMessageData),
    Typing(TypingData),
    TypingPrivate(TypingPrivateData),
    Invalid { event: String, reason: String },
    Unknown(String),
}

impl ClientEvent {
    /// Decode a text frame.
    ///
    /// Only non-JSON input is an error. JSON that is not an `{event, data}`
    /// envelope decodes to `Invalid`.
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;

        let Value::Object(mut envelope) = value else {
            return Ok(Self::invalid("", "frame is not an object"));
        };
        let Some(Value::String(event)) = envelope.remove("event") else {
            return Ok(Self::invalid("", "missing event name"));
        };
        let data = match envelope.remove("data") {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(data) => data,
        };

        let decoded = match event.as_str() {
            "join_room" => decode(&event, data, Self::JoinRoom),
            "leave_room" => decode(&event, data, Self::LeaveRoom),
            "room_message" => decode(&event, data, Self::RoomMessage),
            "private_message" => decode(&event, data, Self::PrivateMessage),
            "typing" => decode(&event, data, Self::Typing),
            "typing_private" => decode(&event, data, Self::TypingPrivate),
            _ => Self::Unknown(event),
        };

        Ok(decoded)
    }

    /// Wire name of the event
    pub fn name(&self) -> &str {
        match self {
            Self::JoinRoom(_) => "join_room",
            Self::LeaveRoom(_) => "leave_room",
            Self::RoomMessage(_) => "room_message",
            Self::PrivateMessage(_) => "private_message",
            Self::Typing(_) => "typing",
            Self::TypingPrivate(_) => "typing_private",
            Self::Invalid { event, .. } | Self::Unknown(event) => event.as_str(),
        }
    }

    fn invalid(event: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            event: event.to_string(),
            reason: reason.into(),
        }
    }
}

fn decode<T: DeserializeOwned>(event: &str, data: Value, wrap: fn(T) -> ClientEvent) -> ClientEvent {
    match serde_json::from_value(data) {
        Ok(payload) => wrap(payload),
        Err(e) => ClientEvent::invalid(event, e.to_string()),
    }
}
