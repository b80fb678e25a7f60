//! # chat-db
//!
//! Storage layer implementing the `chat-core` store traits.
//!
//! ## Overview
//!
//! - PostgreSQL implementations via SQLx (`PgUserDirectory`, `PgMessageStore`)
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives, and entity ↔ model mappers
//! - In-process implementations (`MemoryUserDirectory`, `MemoryMessageStore`) with the
//!   same semantics, for tests and single-binary development setups
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_db::{create_pool, run_migrations, DatabaseConfig, PgUserDirectory};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from_env()).await?;
//!     run_migrations(&pool).await?;
//!     let users = PgUserDirectory::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{MemoryMessageStore, MemoryUserDirectory};
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{PgMessageStore, PgUserDirectory};
