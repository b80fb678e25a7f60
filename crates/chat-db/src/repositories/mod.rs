//! PostgreSQL implementations of the store traits defined in chat-core.

mod error;
mod message;
mod user;

pub use message::PgMessageStore;
pub use user::PgUserDirectory;
