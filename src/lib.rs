//! restmirror - replicate paginated webservice collections into SQLite
//!
//! This crate provides the core functionality for the `restmirror` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Config file, column mappings and run settings
//! - [`fetch`] - Concurrent paginated HTTP fetcher
//! - [`model`] - Webservice payload types (banners, brokers, condominiums, properties)
//! - [`schema`] - Static field tables and field-to-column resolution
//! - [`storage`] - SQLite connection and transaction helpers
//! - [`sync`] - Replace-sync, active-set reconciliation and tenant iteration
//! - [`hooks`] - Pre/post sync shell hooks
//! - [`validate`] - Pre-run safety checks
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod hooks;
pub mod model;
pub mod schema;
pub mod storage;
pub mod sync;
pub mod validate;

pub use error::{Error, Result};
