//! Connection management
//!
//! Live connection handles and the registry that owns them.

mod connection;
mod registry;

pub use connection::{Connection, Delivery};
pub use registry::{ConnectionRegistry, RegistryError};

#[cfg(test)]
pub(crate) use connection::test_support;
