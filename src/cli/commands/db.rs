//! Database maintenance commands.

use std::path::Path;

use serde::Serialize;

use crate::cli::DbCommands;
use crate::config::{self, ConfigFile};
use crate::error::Result;
use crate::model::ResourceKind;
use crate::storage::Database;
use crate::sync::clear_tables;

#[derive(Serialize)]
struct ClearOutput<'a> {
    tables: Vec<&'a str>,
    removed: usize,
}

/// Execute db commands.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the database write fails.
pub fn execute(command: &DbCommands, config_path: Option<&Path>, json: bool) -> Result<()> {
    match command {
        DbCommands::Clear => clear(config_path, json),
    }
}

/// Delete every row of the four resource tables in one transaction.
fn clear(config_path: Option<&Path>, json: bool) -> Result<()> {
    let file = ConfigFile::new(config::resolve_config_path(config_path)?);
    let config = file.load()?;
    let mut db = Database::open(&file.database_path(&config))?;

    let tables: Vec<&str> = ResourceKind::ALL
        .iter()
        .map(|kind| config.mappings.table(*kind))
        .collect();
    let removed = db.run_in_tx("db clear", |tx| clear_tables(tx, &tables))?;

    if json {
        let output = ClearOutput { tables, removed };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Cleared {} ({removed} rows)", tables.join(", "));
    }

    Ok(())
}
