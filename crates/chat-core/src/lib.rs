//! # chat-core
//!
//! Domain layer containing identifiers, entities, and the store and verifier traits
//! the real-time hub depends on.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Message, MessageTarget, User, UserCredentials, UserIdentity};
pub use error::{AuthError, DomainError};
pub use traits::{HistoryQuery, IdentityVerifier, MessageStore, RepoResult, UserDirectory};
pub use value_objects::{ConnectionId, IdParseError, MessageId, UserId};
