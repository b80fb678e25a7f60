//! Domain error types

mod auth_error;
mod domain_error;

pub use auth_error::AuthError;
pub use domain_error::DomainError;
