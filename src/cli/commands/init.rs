//! Write a starter config file.
//!
//! The template maps every webservice field to a column of the same name
//! and points `db.path` at `restmirror.db` next to the config file. Fill in
//! `endpoint`, `webservice_key` (or `tenant_mapping`) and adjust the
//! mappings to the target schema before the first `sync`.

use crate::config::{self, ConfigFile};
use crate::error::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct InitOutput {
    path: PathBuf,
    database: PathBuf,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns [`Error::AlreadyInitialized`] when the file exists and `force`
/// is not set, or an error if the file cannot be written.
pub fn execute(config_path: Option<&Path>, force: bool, json: bool) -> Result<()> {
    let file = ConfigFile::new(config::resolve_config_path(config_path)?);

    if file.exists() && !force {
        return Err(Error::AlreadyInitialized {
            path: file.path().to_path_buf(),
        });
    }

    let template = config::template();
    file.save(&template)?;
    let database = file.database_path(&template);

    if json {
        let output = InitOutput {
            path: file.path().to_path_buf(),
            database,
        };
        let payload = serde_json::to_string(&output)?;
        println!("{payload}");
    } else {
        println!("Wrote config template");
        println!("  Config:   {}", file.path().display());
        println!("  Database: {}", database.display());
        println!();
        println!("Next: set endpoint and webservice_key, then run 'restmirror sync'.");
    }

    Ok(())
}
