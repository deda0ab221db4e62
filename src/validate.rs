//! Pre-run validation of destructive or inconsistent setups.
//!
//! Runs before any hook, request or write. Every failure is a
//! configuration error with a message naming the offending setting.

use std::collections::HashSet;

use tracing::warn;

use crate::config::{Config, SyncOverrides};
use crate::error::{Error, Result};
use crate::model::ResourceKind;

/// Check that `config` combined with the `sync` flags can run safely.
///
/// # Errors
///
/// Returns [`Error::Config`] when:
/// - `--truncate` is given while a `last_sync` exists, without `--ignore-last-sync`
/// - the endpoint is empty
/// - neither a webservice key nor a tenant mapping is configured, or both are
/// - tenants are configured without a discriminator column, or with one
///   that a column mapping already uses
/// - a tenant entry has an empty identifier or key, or an identifier repeats
pub fn validate_sync(config: &Config, overrides: &SyncOverrides) -> Result<()> {
    if overrides.truncate && config.last_sync.is_some() && !overrides.ignore_last_sync {
        return Err(Error::Config(
            "Truncating with a previous last_sync would drop every property not changed since then. \
             Remove --truncate, or add --ignore-last-sync to fetch every property"
                .to_string(),
        ));
    }
    if config.truncate_all && config.last_sync.is_some() && !overrides.ignore_last_sync {
        warn!("truncate_all is set together with last_sync: only changed properties will remain");
    }

    if config.endpoint.trim().is_empty() {
        return Err(Error::Config("The webservice endpoint must be configured".to_string()));
    }

    let has_key = config
        .webservice_key
        .as_deref()
        .is_some_and(|k| !k.trim().is_empty());
    let has_tenants = !config.tenant_mapping.is_empty();

    match (has_key, has_tenants) {
        (false, false) => {
            return Err(Error::Config(
                "Either webservice_key or tenant_mapping must be configured".to_string(),
            ));
        }
        (true, true) => {
            return Err(Error::Config(
                "Configure webservice_key OR tenant_mapping, not both".to_string(),
            ));
        }
        _ => {}
    }

    if has_tenants {
        let Some(column) = config
            .tenant_column
            .as_deref()
            .filter(|c| !c.trim().is_empty())
        else {
            return Err(Error::Config(
                "tenant_column must be set when tenant_mapping is configured".to_string(),
            ));
        };

        for kind in ResourceKind::ALL {
            let mapping = config.mappings.columns(kind);
            if let Some((field, _)) = mapping.iter().find(|(_, c)| c.as_str() == column) {
                return Err(Error::Config(format!(
                    "tenant_column '{column}' is also the column of {kind} field '{field}'; \
                     rows would carry it twice"
                )));
            }
        }

        let mut seen = HashSet::new();
        for (i, tenant) in config.tenant_mapping.iter().enumerate() {
            if tenant.identifier.trim().is_empty() || tenant.webservice_key.trim().is_empty() {
                return Err(Error::Config(format!(
                    "tenant_mapping entry {} is incomplete: identifier and webservice_key are required",
                    i + 1
                )));
            }
            if !seen.insert(tenant.identifier.as_str()) {
                return Err(Error::Config(format!(
                    "tenant identifier '{}' appears more than once in tenant_mapping",
                    tenant.identifier
                )));
            }
        }
    }

    Ok(())
}
