//! Route definitions
//!
//! API routes live under `/api`; the health probe is kept apart so it can
//! bypass rate limiting.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{auth, health, messages};
use crate::state::AppState;

/// Create the API router (excluding health)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(message_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
}

fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages/room/:room", get(messages::room_history))
        .route(
            "/messages/private/:other_user_id",
            get(messages::private_history),
        )
}
