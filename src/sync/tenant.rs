//! Tenant iteration.
//!
//! A run covers either one implicit tenant (the global webservice key, no
//! discriminator column) or the configured tenant list, optionally narrowed
//! to a single identifier. Tenants run in order; the first failure stops
//! the run and later tenants are never started.

use tracing::{debug, error, info, warn};

use crate::config::SyncSettings;
use crate::error::{Error, Result};

use super::types::TenantScope;

/// The tenant a pass is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    /// Empty in single-tenant mode.
    pub identifier: String,
    pub webservice_key: String,
    /// Discriminator applied to rows; `None` in single-tenant mode.
    pub scope: Option<TenantScope>,
}

impl TenantContext {
    /// Identifier for logs, `-` for the implicit tenant.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.identifier.is_empty() {
            "-"
        } else {
            &self.identifier
        }
    }
}

/// Tenants of this run, in configuration order.
///
/// # Errors
///
/// Returns a configuration error when no key is configured, when the
/// discriminator column is missing in multi-tenant mode, or
/// [`Error::UnknownTenant`] when the requested tenant does not exist.
pub fn tenants(settings: &SyncSettings) -> Result<Vec<TenantContext>> {
    if !settings.is_multi_tenant() {
        let key = settings
            .webservice_key
            .clone()
            .ok_or_else(|| Error::Config("The webservice key must be configured".to_string()))?;
        if let Some(id) = &settings.tenant_filter {
            warn!(tenant = %id, "Tenant filter ignored: no tenant_mapping configured");
        }
        return Ok(vec![TenantContext {
            identifier: String::new(),
            webservice_key: key,
            scope: None,
        }]);
    }

    let column = settings.tenant_column.clone().ok_or_else(|| {
        Error::Config("The tenant discriminator column must be set for multi-tenant sync".to_string())
    })?;

    let selected: Vec<_> = match &settings.tenant_filter {
        Some(id) => {
            let entry = settings
                .tenants
                .iter()
                .find(|t| &t.identifier == id)
                .ok_or_else(|| Error::UnknownTenant { id: id.clone() })?;
            debug!(tenant = %id, "Tenant found");
            vec![entry]
        }
        None => settings.tenants.iter().collect(),
    };

    Ok(selected
        .into_iter()
        .map(|t| TenantContext {
            identifier: t.identifier.clone(),
            webservice_key: t.webservice_key.clone(),
            scope: Some(TenantScope {
                column: column.clone(),
                identifier: t.identifier.clone(),
            }),
        })
        .collect())
}

/// Run `f` once per tenant, stopping at the first failure.
///
/// Returns the number of tenants that completed.
///
/// # Errors
///
/// Returns the tenant resolution error or the first error of `f`.
pub fn for_each_tenant<F>(settings: &SyncSettings, mut f: F) -> Result<usize>
where
    F: FnMut(&TenantContext) -> Result<()>,
{
    let tenants = tenants(settings)?;
    let total = tenants.len();

    for (i, tenant) in tenants.iter().enumerate() {
        debug!(tenant = tenant.label(), index = i + 1, total, "Tenant bound");
        if let Err(e) = f(tenant) {
            error!(
                tenant = tenant.label(),
                error = %e,
                skipped = total - i - 1,
                "Tenant sync failed, aborting"
            );
            return Err(e);
        }
        info!(tenant = tenant.label(), "Tenant synchronized");
    }

    Ok(total)
}
