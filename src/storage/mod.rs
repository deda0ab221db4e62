//! SQLite storage layer.
//!
//! # Submodules
//!
//! - [`sqlite`] - Connection handling and transaction discipline

pub mod sqlite;

pub use sqlite::Database;
