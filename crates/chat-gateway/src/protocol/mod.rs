//! Gateway protocol definitions
//!
//! Frames are JSON text of the form `{"event": <name>, "data": {...}}` in both
//! directions, with camelCase field names.

mod client;
mod close_codes;
mod server;

pub use client::{
    ClientEvent, PrivateMessageData, ProtocolError, RoomData, RoomMessageData, TypingData,
    TypingPrivateData,
};
pub use close_codes::CloseCode;
pub use server::{
    OfflinePayload, OnlinePayload, ReadyPayload, RoomMembershipPayload, ServerEvent,
    TypingPayload, TypingPrivatePayload,
};
