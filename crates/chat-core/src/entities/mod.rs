//! Domain entities - core business objects

mod message;
mod user;

pub use message::{Message, MessageTarget};
pub use user::{User, UserCredentials, UserIdentity};
