//! Run settings.
//!
//! A [`SyncSettings`] is assembled once per invocation from the loaded
//! [`Config`] and the `sync` command flags, then passed by reference to
//! every component. Nothing mutates it afterwards.

use chrono::{DateTime, Utc};
use tracing::warn;

use super::types::{Config, Mappings, TenantEntry};

/// Default and ceiling of concurrent page requests.
pub const DEFAULT_CONCURRENCY: usize = 5;
pub const MAX_CONCURRENCY: usize = 5;

/// `sync` flags that override or complement the config file.
#[derive(Debug, Clone, Default)]
pub struct SyncOverrides {
    pub tenant: Option<String>,
    pub max_pages: Option<usize>,
    pub concurrent_requests: Option<usize>,
    pub ignore_last_sync: bool,
    pub truncate: bool,
}

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub endpoint: String,
    pub version: String,
    pub webservice_key: Option<String>,
    pub tenant_column: Option<String>,
    pub tenants: Vec<TenantEntry>,
    /// Narrow a multi-tenant run to this tenant identifier.
    pub tenant_filter: Option<String>,
    pub truncate: bool,
    /// `start` for the property fetch. `None` when ignored or never synced.
    pub since: Option<DateTime<Utc>>,
    pub max_pages: usize,
    pub concurrency: usize,
    pub mappings: Mappings,
}

impl SyncSettings {
    #[must_use]
    pub fn new(config: &Config, overrides: &SyncOverrides) -> Self {
        let requested = overrides.concurrent_requests.unwrap_or(DEFAULT_CONCURRENCY);
        let concurrency = if requested > MAX_CONCURRENCY {
            warn!(
                requested,
                max = MAX_CONCURRENCY,
                "Concurrent requests above the supported ceiling, clamping"
            );
            MAX_CONCURRENCY
        } else {
            requested.max(1)
        };

        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            version: config.version.clone(),
            webservice_key: config
                .webservice_key
                .clone()
                .filter(|k| !k.trim().is_empty()),
            tenant_column: config
                .tenant_column
                .clone()
                .filter(|c| !c.trim().is_empty()),
            tenants: config.tenant_mapping.clone(),
            tenant_filter: overrides.tenant.clone(),
            truncate: config.truncate_all || overrides.truncate,
            since: if overrides.ignore_last_sync {
                None
            } else {
                config.last_sync
            },
            max_pages: overrides.max_pages.unwrap_or(usize::MAX).max(1),
            concurrency,
            mappings: config.mappings.clone(),
        }
    }

    /// True when rows carry a tenant discriminator column.
    #[must_use]
    pub fn is_multi_tenant(&self) -> bool {
        !self.tenants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concurrency_is_clamped() {
        let settings = SyncSettings::new(
            &Config::default(),
            &SyncOverrides {
                concurrent_requests: Some(20),
                ..SyncOverrides::default()
            },
        );
        assert_eq!(settings.concurrency, MAX_CONCURRENCY);

        let settings = SyncSettings::new(&Config::default(), &SyncOverrides::default());
        assert_eq!(settings.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(settings.max_pages, usize::MAX);
    }

    #[test]
    fn test_truncate_from_config_or_flag() {
        let mut config = Config::default();
        assert!(!SyncSettings::new(&config, &SyncOverrides::default()).truncate);

        config.truncate_all = true;
        assert!(SyncSettings::new(&config, &SyncOverrides::default()).truncate);

        config.truncate_all = false;
        let flag = SyncOverrides {
            truncate: true,
            ..SyncOverrides::default()
        };
        assert!(SyncSettings::new(&config, &flag).truncate);
    }

    #[test]
    fn test_ignore_last_sync_drops_since() {
        let config = Config {
            last_sync: Some(Utc::now()),
            ..Config::default()
        };
        assert!(SyncSettings::new(&config, &SyncOverrides::default()).since.is_some());

        let ignore = SyncOverrides {
            ignore_last_sync: true,
            ..SyncOverrides::default()
        };
        assert!(SyncSettings::new(&config, &ignore).since.is_none());
    }

    #[test]
    fn test_endpoint_trailing_slash_is_trimmed() {
        let config = Config {
            endpoint: "https://ws.example.com/webservice/".to_string(),
            ..Config::default()
        };
        let settings = SyncSettings::new(&config, &SyncOverrides::default());
        assert_eq!(settings.endpoint, "https://ws.example.com/webservice");
    }
}
