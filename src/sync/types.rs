//! Types shared by the sync engine.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::ColumnMapping;
use crate::model::ResourceKind;

/// What a `sync` invocation replicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Every resource, then the active set, in one transaction per tenant.
    All,
    Resource(ResourceKind),
    /// Only the active-set reconciliation of properties.
    Active,
}

/// Tenant discriminator applied to every row and every delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantScope {
    pub column: String,
    pub identifier: String,
}

/// One replace-sync call.
#[derive(Debug)]
pub struct SyncJob<'a, T> {
    pub items: &'a [T],
    pub mapping: &'a ColumnMapping,
    pub table: &'a str,
    pub tenant: Option<&'a TenantScope>,
    /// Delete every (tenant) row instead of only the incoming identifiers.
    pub truncate: bool,
}

/// Rows touched by one replace-sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub table: String,
    pub deleted: usize,
    pub inserted: usize,
}

/// Rows touched by the active-set reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActiveReport {
    pub table: String,
    pub deactivated: usize,
    pub activated: usize,
}

/// Outcome of one resource within a tenant pass.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceReport {
    pub resource: ResourceKind,
    pub fetched: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_pages: Vec<usize>,
    #[serde(flatten)]
    pub rows: SyncReport,
}

/// Outcome of one tenant pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TenantReport {
    /// Tenant identifier, empty in single-tenant mode.
    pub tenant: String,
    pub resources: Vec<ResourceReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<ActiveReport>,
    /// When this pass started fetching properties.
    #[serde(skip)]
    pub property_fetch_started: Option<DateTime<Utc>>,
}

impl TenantReport {
    #[must_use]
    pub fn failed_pages(&self) -> usize {
        self.resources.iter().map(|r| r.failed_pages.len()).sum()
    }
}

/// Outcome of a whole `sync` invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub tenants: Vec<TenantReport>,
    /// Value persisted as `last_sync`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

impl RunReport {
    #[must_use]
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            tenants: Vec::new(),
            last_sync: None,
        }
    }

    #[must_use]
    pub fn inserted(&self) -> usize {
        self.tenants
            .iter()
            .flat_map(|t| &t.resources)
            .map(|r| r.rows.inserted)
            .sum()
    }

    #[must_use]
    pub fn failed_pages(&self) -> usize {
        self.tenants.iter().map(TenantReport::failed_pages).sum()
    }
}
