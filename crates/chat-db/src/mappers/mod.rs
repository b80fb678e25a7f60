//! Entity to model mappers
//!
//! - `From<Model> for Entity` / `TryFrom`: database rows to domain objects
//! - `*Insert` structs: entity data prepared for binding

mod message;
mod user;

pub use message::MessageInsert;
