//! Command implementations.

pub mod completions;
pub mod db;
pub mod init;
pub mod sync;
pub mod version;
