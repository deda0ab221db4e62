//! Sync command implementation.
//!
//! Order of work: load config, validate, pre-hook, sync every tenant,
//! post-hook, report. Nothing is fetched or written when validation or the
//! pre-hook fails; the post-hook only runs after a successful sync.

use std::path::Path;

use colored::Colorize;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::cli::SyncArgs;
use crate::config::{self, ConfigFile, SyncSettings};
use crate::error::Result;
use crate::hooks::run_hook;
use crate::schema;
use crate::storage::Database;
use crate::sync::{RunReport, Syncer, Target};
use crate::validate::validate_sync;

/// Execute the sync command.
///
/// # Errors
///
/// Returns configuration, hook, transport, decode or database errors; see
/// [`crate::error::Error`] for the exit code of each family.
pub fn execute(args: &SyncArgs, config_path: Option<&Path>, json: bool) -> Result<()> {
    let file = ConfigFile::new(config::resolve_config_path(config_path)?);
    let config = file.load()?;
    let overrides = args.overrides();

    validate_sync(&config, &overrides)?;
    schema::validate_all()?;

    if let Some(hook) = &args.pre_hook {
        run_hook("pre", hook)?;
    }

    let settings = SyncSettings::new(&config, &overrides);
    let db_path = file.database_path(&config);
    debug!(path = %db_path.display(), "Opening database");
    let mut db = Database::open(&db_path)?;

    let runtime = Runtime::new()?;
    let syncer = Syncer::new(&settings, &runtime, &file)?;
    let target = Target::from(args.resource);
    let report = syncer.run(&mut db, target)?;

    if let Some(hook) = &args.post_hook {
        run_hook("post", hook)?;
    }

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    println!("{} {}", "Sync complete".green().bold(), report.run_id);

    for tenant in &report.tenants {
        if !tenant.tenant.is_empty() {
            println!();
            println!("{}", format!("Tenant {}", tenant.tenant).cyan().bold());
        }

        for resource in &tenant.resources {
            println!(
                "  {:<14} fetched {:>6}  deleted {:>6}  inserted {:>6}  ({})",
                resource.resource.name(),
                resource.fetched,
                resource.rows.deleted,
                resource.rows.inserted,
                resource.rows.table,
            );
            if !resource.failed_pages.is_empty() {
                let pages: Vec<String> =
                    resource.failed_pages.iter().map(ToString::to_string).collect();
                println!(
                    "  {}",
                    format!("skipped pages: {}", pages.join(", ")).yellow()
                );
            }
        }

        if let Some(active) = &tenant.active {
            println!(
                "  {:<14} deactivated {:>6}  activated {:>6}  ({})",
                "active", active.deactivated, active.activated, active.table,
            );
        }
    }

    println!();
    println!("  Total inserted: {}", report.inserted());
    if report.failed_pages() > 0 {
        println!(
            "  {}",
            format!("{} page(s) could not be fetched", report.failed_pages()).yellow()
        );
    }
    if let Some(at) = report.last_sync {
        println!("  last_sync: {}", at.to_rfc3339());
    }
}
