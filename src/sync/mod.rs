//! Replication of webservice resources into SQL tables.
//!
//! - **Replace-sync**: scoped delete (whole tenant slice or incoming ids)
//!   followed by a bulk insert, inside the caller's transaction
//! - **Active set**: reset every active flag, then set the listed ids
//! - **Tenants**: each tenant runs in its own transaction; the first failure
//!   stops the run
//!
//! # Architecture
//!
//! ```text
//! for_each_tenant ─▶ Requester::fetch_all ─▶ replace_sync ─▶ mark_active
//!                       (tokio pool)          (same transaction)
//! ```
//!
//! A full sync handles banners, brokers, condominiums and properties in that
//! order, then reconciles the active properties.

mod active;
mod pipeline;
mod replace;
pub mod statement;
mod tenant;
mod types;

pub use active::mark_active;
pub use pipeline::Syncer;
pub use replace::replace_sync;
pub use tenant::{for_each_tenant, tenants, TenantContext};
pub use types::{
    ActiveReport, ResourceReport, RunReport, SyncJob, SyncReport, Target, TenantReport,
    TenantScope,
};

use rusqlite::Transaction;
use tracing::info;

use crate::error::Result;

/// Delete every row of `tables` inside `tx`. Returns the total row count removed.
///
/// # Errors
///
/// Returns the first SQL error; the caller rolls back.
pub fn clear_tables(tx: &Transaction, tables: &[&str]) -> Result<usize> {
    let mut removed = 0;
    for table in tables {
        let n = statement::delete_all(table, None).execute(tx)?;
        info!(table, removed = n, "Table cleared");
        removed += n;
    }
    Ok(removed)
}
