//! Sync pipeline.
//!
//! Binds each tenant, fetches its resources and replaces the matching rows,
//! one transaction per tenant (or per tenant and resource for single
//! resource targets). Database work stays on the calling thread; only the
//! HTTP fetches run on the tokio runtime.

use chrono::{DateTime, Utc};
use rusqlite::Transaction;
use tokio::runtime::Runtime;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::{SyncSettings, StateStore};
use crate::error::Result;
use crate::fetch::{FetchOutcome, Requester};
use crate::model::{Banner, Broker, Condominium, Property, ResourceKind};
use crate::schema::{identity_column, Resource};
use crate::storage::Database;

use super::active::mark_active;
use super::replace::replace_sync;
use super::tenant::{for_each_tenant, TenantContext};
use super::types::{ActiveReport, ResourceReport, RunReport, SyncJob, Target, TenantReport};

/// Drives a sync run.
pub struct Syncer<'a> {
    settings: &'a SyncSettings,
    runtime: &'a Runtime,
    requester: Requester,
    state: &'a dyn StateStore,
}

impl<'a> Syncer<'a> {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        settings: &'a SyncSettings,
        runtime: &'a Runtime,
        state: &'a dyn StateStore,
    ) -> Result<Self> {
        Ok(Self {
            settings,
            runtime,
            requester: Requester::new(settings)?,
            state,
        })
    }

    /// Run `target` for every tenant.
    ///
    /// When properties were synchronized for every tenant of an unfiltered
    /// run, `last_sync` is persisted afterwards with the earliest property
    /// fetch start. Failing to persist it is logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns the first tenant failure. Tenants committed before it stay
    /// committed.
    pub fn run(&self, db: &mut Database, target: Target) -> Result<RunReport> {
        let mut report = RunReport::new(Uuid::new_v4());
        let span = info_span!("sync", run_id = %report.run_id);
        let _guard = span.enter();
        info!(?target, truncate = self.settings.truncate, "Sync started");

        for_each_tenant(self.settings, |tenant| {
            let span = info_span!("tenant", tenant = tenant.label());
            let _guard = span.enter();
            let pass = TenantPass {
                syncer: self,
                requester: self.requester.for_tenant(&tenant.webservice_key),
                tenant,
            };
            report.tenants.push(pass.run(db, target)?);
            Ok(())
        })?;

        report.last_sync = self.persist_last_sync(&report);
        info!(
            tenants = report.tenants.len(),
            inserted = report.inserted(),
            failed_pages = report.failed_pages(),
            "Sync finished"
        );
        Ok(report)
    }

    fn persist_last_sync(&self, report: &RunReport) -> Option<DateTime<Utc>> {
        let started = report
            .tenants
            .iter()
            .filter_map(|t| t.property_fetch_started)
            .min()?;

        if self.settings.is_multi_tenant() && self.settings.tenant_filter.is_some() {
            info!("Run narrowed to one tenant, last_sync left unchanged");
            return None;
        }

        let missing: usize = report
            .tenants
            .iter()
            .flat_map(|t| &t.resources)
            .filter(|r| r.resource == ResourceKind::Property)
            .map(|r| r.failed_pages.len())
            .sum();
        if missing > 0 {
            warn!(
                failed_pages = missing,
                last_sync = %started,
                "Saving last_sync with property pages missing; their items wait for a full sync"
            );
        }

        match self.state.save_last_sync(started) {
            Ok(()) => {
                debug!(last_sync = %started, "last_sync saved");
                Some(started)
            }
            Err(e) => {
                error!(error = %e, "Failed to save last_sync");
                None
            }
        }
    }
}

/// One tenant's share of a run.
struct TenantPass<'s, 'a> {
    syncer: &'s Syncer<'a>,
    requester: Requester,
    tenant: &'s TenantContext,
}

impl TenantPass<'_, '_> {
    fn settings(&self) -> &SyncSettings {
        self.syncer.settings
    }

    fn run(&self, db: &mut Database, target: Target) -> Result<TenantReport> {
        let mut report = TenantReport {
            tenant: self.tenant.identifier.clone(),
            ..TenantReport::default()
        };

        match target {
            Target::All => db.run_in_tx("sync all", |tx| {
                for kind in ResourceKind::ALL {
                    self.sync_kind(tx, kind, &mut report)?;
                }
                Ok(())
            })?,
            Target::Resource(kind) => {
                db.run_in_tx(kind.name(), |tx| self.sync_kind(tx, kind, &mut report))?;
            }
            Target::Active => {
                report.active = Some(db.run_in_tx("active", |tx| self.sync_active(tx))?);
            }
        }

        Ok(report)
    }

    fn sync_kind(&self, tx: &Transaction, kind: ResourceKind, report: &mut TenantReport) -> Result<()> {
        match kind {
            ResourceKind::Banner => report.resources.push(self.sync_resource::<Banner>(tx)?),
            ResourceKind::Broker => report.resources.push(self.sync_resource::<Broker>(tx)?),
            ResourceKind::Condominium => {
                report.resources.push(self.sync_resource::<Condominium>(tx)?);
            }
            ResourceKind::Property => {
                let started = Utc::now();
                report.resources.push(self.sync_properties(tx)?);
                report.property_fetch_started = Some(started);
                report.active = Some(self.sync_active(tx)?);
            }
        }
        Ok(())
    }

    fn fetch<T: Resource>(&self, since: Option<DateTime<Utc>>) -> Result<FetchOutcome<T>> {
        info!(resource = T::KIND.name(), "Fetching");
        let outcome = self.syncer.runtime.block_on(self.requester.fetch_all::<T>(since))?;
        if !outcome.is_complete() {
            warn!(
                resource = T::KIND.name(),
                failed_pages = ?outcome.failed_pages,
                "Fetched with missing pages"
            );
        }
        Ok(outcome)
    }

    fn replace<T: Resource>(&self, tx: &Transaction, outcome: FetchOutcome<T>) -> Result<ResourceReport> {
        let mappings = &self.settings().mappings;
        let rows = replace_sync(
            tx,
            &SyncJob {
                items: &outcome.items,
                mapping: mappings.columns(T::KIND),
                table: mappings.table(T::KIND),
                tenant: self.tenant.scope.as_ref(),
                truncate: self.settings().truncate,
            },
        )?;

        Ok(ResourceReport {
            resource: T::KIND,
            fetched: outcome.items.len(),
            failed_pages: outcome.failed_pages,
            rows,
        })
    }

    fn sync_resource<T: Resource>(&self, tx: &Transaction) -> Result<ResourceReport> {
        let outcome = self.fetch::<T>(None)?;
        self.replace(tx, outcome)
    }

    fn sync_properties(&self, tx: &Transaction) -> Result<ResourceReport> {
        let since = self.settings().since;
        match since {
            Some(at) => debug!(last_sync = %at, "Fetching properties changed since last sync"),
            None => debug!("Fetching every property"),
        }

        let mut outcome = self.fetch::<Property>(since)?;

        let contracts = self.settings().mappings.contract_lookup();
        if !contracts.is_empty() {
            outcome.items = outcome
                .items
                .into_iter()
                .map(|p| p.with_remapped_contracts(&contracts))
                .collect();
        }

        self.replace(tx, outcome)
    }

    fn sync_active(&self, tx: &Transaction) -> Result<ActiveReport> {
        info!("Fetching active properties");
        let ids = self.syncer.runtime.block_on(self.requester.fetch_active_ids())?;

        let mappings = &self.settings().mappings;
        let table = mappings.table(ResourceKind::Property);
        let pk_column = identity_column::<Property>(mappings.columns(ResourceKind::Property), table)?;

        mark_active(
            tx,
            &ids,
            table,
            &pk_column,
            mappings.active_column(),
            self.tenant.scope.as_ref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{self, Config, SyncOverrides, TenantEntry};
    use crate::error::Error;
    use crate::schema::mapping_key;
    use crate::sync::statement::quote_ident;
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct MemoryState {
        saved: RefCell<Vec<DateTime<Utc>>>,
    }

    impl StateStore for MemoryState {
        fn save_last_sync(&self, at: DateTime<Utc>) -> Result<()> {
            self.saved.borrow_mut().push(at);
            Ok(())
        }
    }

    fn ddl<T: Resource>(table: &str, extra: &[String]) -> String {
        let mut cols: Vec<String> = T::schema()
            .iter()
            .map(|f| quote_ident(mapping_key(f.remote)))
            .collect();
        cols.extend(extra.iter().cloned());
        format!("CREATE TABLE {table} ({})", cols.join(", "))
    }

    fn create_tables(db: &Database, tenant_column: Option<&str>) {
        let extra: Vec<String> = tenant_column.map(|c| format!("{c} TEXT")).into_iter().collect();
        let mut property_extra = extra.clone();
        property_extra.push("active INTEGER DEFAULT 0".to_string());

        db.execute(&ddl::<Banner>("banners", &extra)).unwrap();
        db.execute(&ddl::<Broker>("brokers", &extra)).unwrap();
        db.execute(&ddl::<Condominium>("condominiums", &extra)).unwrap();
        db.execute(&ddl::<Property>("properties", &property_extra)).unwrap();
    }

    fn page(data: Value) -> Value {
        let total = data.as_array().map_or(0, Vec::len);
        json!({"data": data, "page": 1, "pageSize": 100, "total": total})
    }

    async fn mount(server: &MockServer, route: &str, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn mount_tenant(server: &MockServer, key: &str, offset: i64) {
        mount(
            server,
            &format!("/{key}/banners"),
            200,
            page(json!([{"id_banner": offset + 1, "titulo": "Home"}, {"id_banner": offset + 2}])),
        )
        .await;
        mount(
            server,
            &format!("/{key}/corretores"),
            200,
            page(json!([{"id_corretor": offset + 10, "nome": "Ana"}])),
        )
        .await;
        mount(
            server,
            &format!("/{key}/condominios"),
            200,
            page(json!([{"id_condominio": offset + 20, "nome": "Solar"}])),
        )
        .await;
        mount(
            server,
            &format!("/{key}/imoveis"),
            200,
            page(json!([
                {"id_imovel": offset + 30, "contrato": "Venda,Locação"},
                {"id_imovel": offset + 31, "contrato": "Temporada"}
            ])),
        )
        .await;
        mount(
            server,
            &format!("/{key}/imoveis/ativos"),
            200,
            json!({"data": {"total": 1, "result": [offset + 31]}}),
        )
        .await;
    }

    fn count(db: &Database, sql: &str) -> i64 {
        db.conn().query_row(sql, [], |r| r.get(0)).unwrap()
    }

    fn base_config(server: &MockServer) -> Config {
        Config {
            endpoint: server.uri(),
            version: "6".to_string(),
            mappings: config::template().mappings,
            ..Config::default()
        }
    }

    #[test]
    fn test_sync_all_single_tenant() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        rt.block_on(mount_tenant(&server, "k", 0));

        let mut config = base_config(&server);
        config.webservice_key = Some("k".to_string());
        config
            .mappings
            .contracts
            .insert("VENDA".to_string(), "sale".to_string());
        let settings = SyncSettings::new(&config, &SyncOverrides::default());

        let mut db = Database::open_memory().unwrap();
        create_tables(&db, None);
        let state = MemoryState::default();

        let report = Syncer::new(&settings, &rt, &state)
            .unwrap()
            .run(&mut db, Target::All)
            .unwrap();

        assert_eq!(count(&db, "SELECT COUNT(*) FROM banners"), 2);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM brokers"), 1);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM condominiums"), 1);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM properties"), 2);
        assert_eq!(
            count(&db, "SELECT id_imovel FROM properties WHERE active = 1"),
            31
        );
        let contracts: String = db
            .conn()
            .query_row("SELECT contrato FROM properties WHERE id_imovel = 30", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(contracts, r#"["sale","Locação"]"#);

        assert_eq!(report.inserted(), 6);
        assert_eq!(report.tenants.len(), 1);
        assert_eq!(state.saved.borrow().len(), 1);
        assert_eq!(report.last_sync, state.saved.borrow().first().copied());
    }

    #[test]
    fn test_single_resource_target_leaves_others_alone() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        rt.block_on(mount_tenant(&server, "k", 0));

        let mut config = base_config(&server);
        config.webservice_key = Some("k".to_string());
        let settings = SyncSettings::new(&config, &SyncOverrides::default());

        let mut db = Database::open_memory().unwrap();
        create_tables(&db, None);
        let state = MemoryState::default();

        Syncer::new(&settings, &rt, &state)
            .unwrap()
            .run(&mut db, Target::Resource(ResourceKind::Broker))
            .unwrap();

        assert_eq!(count(&db, "SELECT COUNT(*) FROM brokers"), 1);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM banners"), 0);
        assert!(state.saved.borrow().is_empty());
    }

    #[test]
    fn test_failing_tenant_aborts_and_keeps_earlier_commits() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        rt.block_on(mount_tenant(&server, "key-a", 0));
        rt.block_on(mount_tenant(&server, "key-c", 1000));
        rt.block_on(mount(&server, "/key-b/banners", 500, json!({})));

        let mut config = base_config(&server);
        config.tenant_column = Some("tenant".to_string());
        config.tenant_mapping = ["a", "b", "c"]
            .iter()
            .map(|id| TenantEntry {
                identifier: (*id).to_string(),
                webservice_key: format!("key-{id}"),
            })
            .collect();
        let settings = SyncSettings::new(&config, &SyncOverrides::default());

        let mut db = Database::open_memory().unwrap();
        create_tables(&db, Some("tenant"));
        let state = MemoryState::default();

        let err = Syncer::new(&settings, &rt, &state)
            .unwrap()
            .run(&mut db, Target::All)
            .unwrap_err();

        assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
        assert_eq!(count(&db, "SELECT COUNT(*) FROM banners WHERE tenant = 'a'"), 2);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM properties WHERE tenant = 'a'"), 2);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM banners WHERE tenant <> 'a'"), 0);
        assert!(state.saved.borrow().is_empty());
    }

    #[test]
    fn test_missing_mapping_fails_tenant_without_writes() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        rt.block_on(mount_tenant(&server, "k", 0));

        let mut config = base_config(&server);
        config.webservice_key = Some("k".to_string());
        config.mappings.condominiums.remove("nome");
        let settings = SyncSettings::new(&config, &SyncOverrides::default());

        let mut db = Database::open_memory().unwrap();
        create_tables(&db, None);
        let state = MemoryState::default();

        let err = Syncer::new(&settings, &rt, &state)
            .unwrap()
            .run(&mut db, Target::All)
            .unwrap_err();

        assert!(err.is_configuration());
        // Banners and brokers ran earlier in the same transaction.
        assert_eq!(count(&db, "SELECT COUNT(*) FROM banners"), 0);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM brokers"), 0);
    }

    #[test]
    fn test_last_sync_saved_when_property_pages_fail() {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        rt.block_on(async {
            let data: Vec<Value> = (1..=100).map(|id| json!({"id_imovel": id})).collect();
            Mock::given(method("GET"))
                .and(path("/k/imoveis"))
                .and(query_param("page", "1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(
                    json!({"data": data, "page": 1, "pageSize": 100, "total": 200}),
                ))
                .expect(1)
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/k/imoveis"))
                .and(query_param("page", "2"))
                .respond_with(ResponseTemplate::new(500))
                .expect(1)
                .mount(&server)
                .await;
            mount(
                &server,
                "/k/imoveis/ativos",
                200,
                json!({"data": {"total": 1, "result": [1]}}),
            )
            .await;
        });

        let mut config = base_config(&server);
        config.webservice_key = Some("k".to_string());
        let settings = SyncSettings::new(&config, &SyncOverrides::default());

        let mut db = Database::open_memory().unwrap();
        create_tables(&db, None);
        let state = MemoryState::default();

        let report = Syncer::new(&settings, &rt, &state)
            .unwrap()
            .run(&mut db, Target::Resource(ResourceKind::Property))
            .unwrap();

        assert_eq!(count(&db, "SELECT COUNT(*) FROM properties"), 100);
        assert_eq!(report.failed_pages(), 1);
        assert_eq!(report.tenants[0].resources[0].failed_pages, vec![2]);
        assert_eq!(state.saved.borrow().len(), 1);
        assert_eq!(report.last_sync, state.saved.borrow().first().copied());
    }
}
