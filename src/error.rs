//! Error types for restmirror.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=transport, 3=decode, 4=config, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for restmirror operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Transport (exit 2)
    TransportError,
    HttpStatus,

    // Decode (exit 3)
    DecodeError,

    // Configuration (exit 4)
    ConfigError,
    MissingColumnMapping,
    UnknownTenant,
    ConfigNotFound,
    AlreadyInitialized,

    // Database (exit 5)
    DatabaseError,
    RollbackFailed,

    // Hooks (exit 6)
    HookFailed,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::TransportError => "TRANSPORT_ERROR",
            Self::HttpStatus => "HTTP_STATUS",
            Self::DecodeError => "DECODE_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::MissingColumnMapping => "MISSING_COLUMN_MAPPING",
            Self::UnknownTenant => "UNKNOWN_TENANT",
            Self::ConfigNotFound => "CONFIG_NOT_FOUND",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::RollbackFailed => "ROLLBACK_FAILED",
            Self::HookFailed => "HOOK_FAILED",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::TransportError | Self::HttpStatus => 2,
            Self::DecodeError => 3,
            Self::ConfigError
            | Self::MissingColumnMapping
            | Self::UnknownTenant
            | Self::ConfigNotFound
            | Self::AlreadyInitialized => 4,
            Self::DatabaseError | Self::RollbackFailed => 5,
            Self::HookFailed => 6,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether re-running the same command may succeed without changes.
    ///
    /// True only for transport-level failures (timeouts, 5xx, refused
    /// connections). Nothing inside restmirror retries on its own.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportError | Self::HttpStatus)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur while fetching and replicating resources.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Request to {url} returned status code {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Malformed payload from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Column mapping for field \"{field}\" of table \"{table}\" not found")]
    MissingColumnMapping { field: String, table: String },

    #[error("Tenant not found for id: {id}")]
    UnknownTenant { id: String },

    #[error("Configuration file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Rolling back failed. Reported in place of the error that triggered
    /// the rollback, which is kept as `cause`.
    #[error("Transaction rollback failed: {rollback} (while handling: {cause})")]
    Rollback {
        rollback: rusqlite::Error,
        cause: Box<Error>,
    },

    #[error("Hook `{command}` failed: {reason}")]
    Hook { command: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Transport { .. } => ErrorCode::TransportError,
            Self::HttpStatus { .. } => ErrorCode::HttpStatus,
            Self::Decode { .. } => ErrorCode::DecodeError,
            Self::MissingColumnMapping { .. } => ErrorCode::MissingColumnMapping,
            Self::UnknownTenant { .. } => ErrorCode::UnknownTenant,
            Self::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Rollback { .. } => ErrorCode::RollbackFailed,
            Self::Hook { .. } => ErrorCode::HookFailed,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// True for the configuration family (mapping, tenants, config file).
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        self.exit_code() == 4
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::MissingColumnMapping { field, table } => Some(format!(
                "Add \"{field}\": \"<column>\" to the mapping used for table \"{table}\" in the config file."
            )),

            Self::UnknownTenant { id } => Some(format!(
                "No entry in tenant_mapping has identifier '{id}'. Check the --tenant value."
            )),

            Self::ConfigNotFound { path } => Some(format!(
                "Run `restmirror init` to create a template at {}, then fill in the mappings.",
                path.display()
            )),

            Self::AlreadyInitialized { path } => Some(format!(
                "A config file already exists at {}. Use `--force` to overwrite it.",
                path.display()
            )),

            Self::HttpStatus { status, .. } if *status == 401 || *status == 403 => {
                Some("The webservice rejected the key. Check webservice_key / tenant_mapping.".to_string())
            }

            Self::Transport { .. } | Self::HttpStatus { .. } => {
                Some("The webservice could not be reached. Nothing was committed for this tenant; re-run later.".to_string())
            }

            Self::Rollback { .. } => Some(
                "The database may hold a partially applied transaction. Inspect it before re-running."
                    .to_string(),
            ),

            Self::Decode { .. }
            | Self::Config(_)
            | Self::Database(_)
            | Self::Hook { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(ToString::to_string)
            .unwrap_or_default();
        Self::Transport {
            url,
            reason: err.to_string(),
        }
    }
}
