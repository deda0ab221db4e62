//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::SyncOverrides;
use crate::model::ResourceKind;
use crate::sync::Target;

pub mod commands;

/// restmirror - replicate webservice collections into SQLite
#[derive(Parser, Debug)]
#[command(name = "restmirror", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (default: ~/.restmirror/config.json)
    #[arg(long, global = true, env = "RESTMIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, alias = "robot", global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a config file template
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Replicate webservice resources into the database
    Sync(SyncArgs),

    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

// ============================================================================
// Sync
// ============================================================================

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// What to replicate
    #[arg(value_enum, default_value_t = SyncResource::All)]
    pub resource: SyncResource,

    /// Only sync this tenant (multi-tenant configs)
    #[arg(long)]
    pub tenant: Option<String>,

    /// Fetch at most this many pages per resource
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Parallel page requests (1-5)
    #[arg(long)]
    pub concurrent_requests: Option<usize>,

    /// Fetch every property instead of those changed since the last sync
    #[arg(long)]
    pub ignore_last_sync: bool,

    /// Delete all rows of each table before inserting
    #[arg(long)]
    pub truncate: bool,

    /// Shell command to run before syncing
    #[arg(long, value_name = "CMD")]
    pub pre_hook: Option<String>,

    /// Shell command to run after a successful sync
    #[arg(long, value_name = "CMD")]
    pub post_hook: Option<String>,
}

impl SyncArgs {
    #[must_use]
    pub fn overrides(&self) -> SyncOverrides {
        SyncOverrides {
            tenant: self.tenant.clone(),
            max_pages: self.max_pages,
            concurrent_requests: self.concurrent_requests,
            ignore_last_sync: self.ignore_last_sync,
            truncate: self.truncate,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncResource {
    /// Every resource, then the active properties
    All,
    Banners,
    Brokers,
    Condominiums,
    /// Properties, then the active properties
    Properties,
    /// Only the active flag of properties
    Active,
}

impl From<SyncResource> for Target {
    fn from(resource: SyncResource) -> Self {
        match resource {
            SyncResource::All => Self::All,
            SyncResource::Banners => Self::Resource(ResourceKind::Banner),
            SyncResource::Brokers => Self::Resource(ResourceKind::Broker),
            SyncResource::Condominiums => Self::Resource(ResourceKind::Condominium),
            SyncResource::Properties => Self::Resource(ResourceKind::Property),
            SyncResource::Active => Self::Active,
        }
    }
}

// ============================================================================
// Database
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Delete every row of the resource tables
    Clear,
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sync_defaults_to_all() {
        let cli = Cli::parse_from(["restmirror", "sync"]);
        match cli.command {
            Commands::Sync(args) => {
                assert_eq!(Target::from(args.resource), Target::All);
                assert!(!args.truncate);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_sync_flags_become_overrides() {
        let cli = Cli::parse_from([
            "restmirror",
            "sync",
            "properties",
            "--tenant",
            "acme",
            "--max-pages",
            "3",
            "--ignore-last-sync",
        ]);
        let Commands::Sync(args) = cli.command else {
            panic!("expected sync");
        };
        assert_eq!(
            Target::from(args.resource),
            Target::Resource(ResourceKind::Property)
        );
        let overrides = args.overrides();
        assert_eq!(overrides.tenant.as_deref(), Some("acme"));
        assert_eq!(overrides.max_pages, Some(3));
        assert!(overrides.ignore_last_sync);
        assert!(!overrides.truncate);
    }
}
