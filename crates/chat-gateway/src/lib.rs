//! # chat-gateway
//!
//! WebSocket gateway for real-time chat.
//!
//! - `connection`: live connection handles and the registry mapping them to users
//! - `rooms`: room membership
//! - `presence`: online/offline transitions, broadcast and persisted once per user
//! - `routing`: room/private messages and typing notifications
//! - `hub`: ties the above together behind connect / handle_event / disconnect
//! - `server`: axum WebSocket transport

pub mod broadcast;
pub mod connection;
pub mod handlers;
pub mod hub;
pub mod presence;
pub mod protocol;
pub mod rooms;
pub mod routing;
pub mod server;

pub use hub::Hub;
pub use server::{build_gateway_state, create_app, create_gateway_state, run, serve, GatewayState};
