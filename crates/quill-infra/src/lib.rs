//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL storage via SeaORM. Without it only
//!   the in-memory store is built.

pub mod database;
pub mod memory;

pub use database::{DatabaseConfig, DatabaseConnections};
pub use memory::InMemoryBlogStore;

#[cfg(feature = "postgres")]
pub use database::{PostgresCategoryRepository, PostgresPostRepository};
