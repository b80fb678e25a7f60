//! Axum extractors for request handling
//!
//! Bearer-token authentication and validated JSON bodies.

mod auth;
mod validated;

pub use auth::AuthUser;
pub use validated::ValidatedJson;
