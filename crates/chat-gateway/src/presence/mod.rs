//! Presence coordination
//!
//! The registry reports a user's first connect and last disconnect as
//! [`UserTransition`]s. A single coordinator task broadcasts each transition to
//! every live connection and hands the directory write to a sequential writer
//! task, so broadcasts never wait on storage.

mod coordinator;
mod writer;

pub use coordinator::{PresenceCommand, PresenceCoordinator, PresenceHandle, UserTransition};
pub use writer::PresenceWriter;
