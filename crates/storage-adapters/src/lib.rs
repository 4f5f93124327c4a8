//! # storage-adapters
//!
//! Implementations of the [`domains::ForumStore`] port. The in-memory store
//! is always compiled and backs tests and single-node deployments; the
//! SQLite store sits behind the `db-sqlite` feature.

pub mod memory;

#[cfg(feature = "db-sqlite")]
pub mod sqlite;

pub use memory::MemoryForumStore;

#[cfg(feature = "db-sqlite")]
pub use sqlite::SqliteForumStore;
