//! Event routing
//!
//! Validates inbound chat and typing events, resolves their recipients and
//! fans them out.

mod messages;
mod typing;

pub use messages::{DropReason, MessageRouter, SendOutcome};
pub use typing::TypingNotifier;
