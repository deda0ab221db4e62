//! On-disk configuration types.
//!
//! The config file is JSON. Unknown keys are ignored and every section has
//! a default, so a partially filled template still loads; completeness is
//! checked later by [`crate::validate`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ResourceKind;

/// Remote field name (last dotted segment) to local column name.
pub type ColumnMapping = BTreeMap<String, String>;

/// Default name of the boolean column flagged by the active-set reconciler.
pub const DEFAULT_ACTIVE_COLUMN: &str = "active";

/// Root of the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub db: DbConfig,
    pub endpoint: String,
    pub version: String,

    /// Key for single-tenant mode. Mutually exclusive with `tenant_mapping`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webservice_key: Option<String>,

    /// Start time of the last successful property sync.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,

    /// Discriminator column holding the tenant identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_column: Option<String>,

    pub tenant_mapping: Vec<TenantEntry>,
    pub truncate_all: bool,
    pub mappings: Mappings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// SQLite file. Relative paths resolve against the config file's directory.
    pub path: PathBuf,
}

/// One tenant of a multi-tenant setup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantEntry {
    pub identifier: String,
    pub webservice_key: String,
}

/// Column mappings and table names per resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mappings {
    pub banners: ColumnMapping,
    pub brokers: ColumnMapping,
    pub condominiums: ColumnMapping,
    pub properties: ColumnMapping,

    /// Remote contract name (case-insensitive) to local contract name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub contracts: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub banners_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brokers_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condominiums_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_column: Option<String>,
}

impl Mappings {
    /// Column mapping of a resource.
    #[must_use]
    pub fn columns(&self, kind: ResourceKind) -> &ColumnMapping {
        match kind {
            ResourceKind::Banner => &self.banners,
            ResourceKind::Broker => &self.brokers,
            ResourceKind::Condominium => &self.condominiums,
            ResourceKind::Property => &self.properties,
        }
    }

    /// Target table of a resource, falling back to its default name.
    #[must_use]
    pub fn table(&self, kind: ResourceKind) -> &str {
        let configured = match kind {
            ResourceKind::Banner => &self.banners_table,
            ResourceKind::Broker => &self.brokers_table,
            ResourceKind::Condominium => &self.condominiums_table,
            ResourceKind::Property => &self.properties_table,
        };
        configured
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| kind.default_table())
    }

    #[must_use]
    pub fn active_column(&self) -> &str {
        self.active_column
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_ACTIVE_COLUMN)
    }

    /// Contract remapping with lowercased keys, ready for lookups.
    #[must_use]
    pub fn contract_lookup(&self) -> BTreeMap<String, String> {
        self.contracts
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_loads_with_defaults() {
        let config: Config = serde_json::from_str(
            r#"{
                "endpoint": "https://ws.example.com/webservice",
                "webservice_key": "abc",
                "mappings": {"banners_table": "site_banners"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.webservice_key.as_deref(), Some("abc"));
        assert!(config.tenant_mapping.is_empty());
        assert!(!config.truncate_all);
        assert_eq!(config.mappings.table(ResourceKind::Banner), "site_banners");
        assert_eq!(config.mappings.table(ResourceKind::Property), "properties");
        assert_eq!(config.mappings.active_column(), "active");
    }

    #[test]
    fn test_last_sync_is_rfc3339() {
        let config: Config =
            serde_json::from_str(r#"{"last_sync": "2024-05-01T12:30:00Z"}"#).unwrap();
        assert_eq!(config.last_sync.unwrap().timestamp(), 1_714_566_600);
    }

    #[test]
    fn test_contract_lookup_lowercases_keys() {
        let mut mappings = Mappings::default();
        mappings
            .contracts
            .insert("Venda".to_string(), "sale".to_string());
        let lookup = mappings.contract_lookup();
        assert_eq!(lookup.get("venda").map(String::as_str), Some("sale"));
        assert!(!lookup.contains_key("Venda"));
    }
}
