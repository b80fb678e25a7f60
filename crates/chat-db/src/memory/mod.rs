//! In-process store implementations
//!
//! Same observable semantics as the PostgreSQL stores, kept behind
//! `parking_lot` locks. Nothing survives a restart.

mod message;
mod user;

pub use message::MemoryMessageStore;
pub use user::MemoryUserDirectory;
