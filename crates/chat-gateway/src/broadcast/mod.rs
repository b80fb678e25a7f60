//! Event fan-out
//!
//! Pushes one event into the outbound queues of a resolved target set.

mod fanout;

pub use fanout::{deliver_except, deliver_to};
