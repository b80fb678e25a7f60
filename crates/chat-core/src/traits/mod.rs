//! Traits (ports) implemented by the storage and auth layers

mod identity;
mod repositories;

pub use identity::IdentityVerifier;
pub use repositories::{HistoryQuery, MessageStore, RepoResult, UserDirectory};
