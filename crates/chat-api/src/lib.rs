//! # chat-api
//!
//! REST API server built with Axum: account sign-up and login, message
//! history, and a health probe.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{
    build_app_state, create_app, create_app_state, create_app_with_config, run, run_server, serve,
};
pub use state::AppState;
