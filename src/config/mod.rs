//! Configuration management.
//!
//! This module locates the config file, loads it, and persists the
//! `last_sync` bookkeeping between runs.
//!
//! # Layout
//!
//! - **Config file**: `~/.restmirror/config.json` unless `--config` or
//!   `RESTMIRROR_CONFIG` points elsewhere
//! - **Database**: `db.path` in the config, resolved relative to the config
//!   file's directory
//!
//! # Submodules
//!
//! - [`types`] - Serde types of the config file
//! - [`settings`] - Immutable run settings (config merged with CLI flags)

mod settings;
mod types;

pub use settings::{SyncOverrides, SyncSettings, DEFAULT_CONCURRENCY, MAX_CONCURRENCY};
pub use types::{ColumnMapping, Config, DbConfig, Mappings, TenantEntry, DEFAULT_ACTIVE_COLUMN};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Banner, Broker, Condominium, Property};
use crate::schema::{mapping_key, Resource};

/// Name of the database file used when `db.path` is left empty.
pub const DEFAULT_DB_FILE: &str = "restmirror.db";

/// Get the global restmirror directory (`~/.restmirror`).
#[must_use]
pub fn global_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".restmirror"))
}

/// Resolve the config file path.
///
/// Priority:
/// 1. `explicit` (the `--config` flag, which clap also fills from
///    `RESTMIRROR_CONFIG`)
/// 2. `~/.restmirror/config.json`
///
/// # Errors
///
/// Returns an error if no home directory can be determined.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    global_dir()
        .map(|dir| dir.join("config.json"))
        .ok_or_else(|| Error::Config("Could not determine home directory".into()))
}

/// Persists sync bookkeeping between runs.
pub trait StateStore {
    /// Record the start time of the last successful property sync.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    fn save_last_sync(&self, at: DateTime<Utc>) -> Result<()>;
}

/// Handle on the config file at a known path.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load and parse the config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] when the file is missing, or a
    /// configuration error when it cannot be read or parsed.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Err(Error::ConfigNotFound {
                path: self.path.clone(),
            });
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
    }

    /// Write the config file atomically (temp file, then rename).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {e}"))
            })?;
        }

        let content = serde_json::to_string_pretty(config)?;
        let tmp = self.path.with_extension("json.tmp");
        write_synced(&tmp, content.as_bytes())
            .map_err(|e| Error::Config(format!("Failed to write config file: {e}")))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| Error::Config(format!("Failed to replace config file: {e}")))?;

        debug!(path = %self.path.display(), "Config written");
        Ok(())
    }

    /// Database file for `config`.
    ///
    /// Empty `db.path` means [`DEFAULT_DB_FILE`]; relative paths resolve
    /// against the directory holding the config file.
    #[must_use]
    pub fn database_path(&self, config: &Config) -> PathBuf {
        let configured = if config.db.path.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_DB_FILE)
        } else {
            config.db.path.clone()
        };

        if configured.is_absolute() {
            return configured;
        }
        self.path
            .parent()
            .map_or_else(|| configured.clone(), |dir| dir.join(&configured))
    }
}

/// Write `content` to `path` and flush it to disk before returning.
fn write_synced(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(content)?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

impl StateStore for ConfigFile {
    fn save_last_sync(&self, at: DateTime<Utc>) -> Result<()> {
        // Re-read so edits made while the sync ran are kept.
        let mut config = self.load()?;
        config.last_sync = Some(at);
        self.save(&config)
    }
}

/// A starter config with every schema field mapped to a same-named column.
#[must_use]
pub fn template() -> Config {
    fn identity_mapping<T: Resource>() -> ColumnMapping {
        T::schema()
            .iter()
            .map(|f| {
                let key = mapping_key(f.remote);
                (key.to_string(), key.to_string())
            })
            .collect()
    }

    Config {
        db: DbConfig {
            path: PathBuf::from(DEFAULT_DB_FILE),
        },
        endpoint: "https://api.example.com/webservice".to_string(),
        version: "6".to_string(),
        webservice_key: Some(String::new()),
        mappings: Mappings {
            banners: identity_mapping::<Banner>(),
            brokers: identity_mapping::<Broker>(),
            condominiums: identity_mapping::<Condominium>(),
            properties: identity_mapping::<Property>(),
            ..Mappings::default()
        },
        ..Config::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::resolve_columns;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_config_path_with_explicit() {
        let explicit = PathBuf::from("/custom/restmirror.json");
        assert_eq!(resolve_config_path(Some(&explicit)).unwrap(), explicit);
    }

    #[test]
    fn test_resolve_config_path_defaults_to_global() {
        let path = resolve_config_path(None).unwrap();
        assert!(path.ends_with(".restmirror/config.json"));
    }

    #[test]
    fn test_missing_file_is_config_not_found() {
        let dir = TempDir::new().unwrap();
        let file = ConfigFile::new(dir.path().join("nope.json"));
        assert!(matches!(file.load(), Err(Error::ConfigNotFound { .. })));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let file = ConfigFile::new(dir.path().join("nested").join("config.json"));
        let config = template();

        file.save(&config).unwrap();
        assert_eq!(file.load().unwrap(), config);
        assert!(!dir.path().join("nested").join("config.json.tmp").exists());
    }

    #[test]
    fn test_save_last_sync_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let file = ConfigFile::new(dir.path().join("config.json"));
        let mut config = template();
        config.truncate_all = true;
        file.save(&config).unwrap();

        let at = DateTime::parse_from_rfc3339("2024-02-03T04:05:06Z")
            .unwrap()
            .with_timezone(&Utc);
        file.save_last_sync(at).unwrap();

        let reloaded = file.load().unwrap();
        assert_eq!(reloaded.last_sync, Some(at));
        assert!(reloaded.truncate_all);
    }

    #[test]
    fn test_database_path_is_relative_to_config() {
        let file = ConfigFile::new("/etc/restmirror/config.json");
        let mut config = Config::default();
        assert_eq!(
            file.database_path(&config),
            PathBuf::from("/etc/restmirror/restmirror.db")
        );

        config.db.path = PathBuf::from("/var/lib/site.db");
        assert_eq!(file.database_path(&config), PathBuf::from("/var/lib/site.db"));
    }

    #[test]
    fn test_template_maps_every_field() {
        let config = template();
        resolve_columns::<Banner>(&config.mappings.banners, "banners").unwrap();
        resolve_columns::<Broker>(&config.mappings.brokers, "brokers").unwrap();
        resolve_columns::<Condominium>(&config.mappings.condominiums, "condominiums").unwrap();
        resolve_columns::<Property>(&config.mappings.properties, "properties").unwrap();
    }
}
