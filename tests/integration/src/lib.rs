//! Integration test utilities for the chat server
//!
//! Runs the REST API and the WebSocket gateway in-process over shared memory
//! stores; no external services are needed.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
