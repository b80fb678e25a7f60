//! Business logic services

pub mod auth;
pub mod context;
pub mod error;
pub mod history;
pub mod identity;

pub use auth::AuthService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use history::HistoryService;
pub use identity::TokenVerifier;
