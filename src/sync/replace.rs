//! Replace-sync: scoped delete followed by a bulk insert.

use rusqlite::types::Value;
use rusqlite::Transaction;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::schema::{identity_column, resolve_columns, Resource};

use super::statement::{delete_all, delete_by_ids, insert_rows, Statement};
use super::types::{SyncJob, SyncReport};

/// Replace the rows of `job.items` in `job.table` inside `tx`.
///
/// 1. Every schema field is resolved to its mapped column (sorted by remote
///    key). A missing mapping fails before any statement runs.
/// 2. With `truncate`, every row (of the tenant) is deleted; otherwise only
///    rows whose primary key is among the incoming identifiers.
/// 3. All items are inserted, tagged with the tenant identifier when a
///    tenant scope is given.
///
/// Empty input is a no-op. The caller owns the transaction and rolls back
/// on error.
///
/// # Errors
///
/// Returns [`crate::Error::MissingColumnMapping`] or the first SQL error.
pub fn replace_sync<T: Resource>(tx: &Transaction, job: &SyncJob<'_, T>) -> Result<SyncReport> {
    let mut report = SyncReport {
        table: job.table.to_string(),
        ..SyncReport::default()
    };

    if job.items.is_empty() {
        debug!(table = %job.table, "Nothing to sync");
        return Ok(report);
    }

    let resolved = resolve_columns::<T>(job.mapping, job.table)?;
    let pk_column = identity_column::<T>(job.mapping, job.table)?;

    let mut columns: Vec<String> = resolved.iter().map(|c| c.column.clone()).collect();
    if let Some(tenant) = job.tenant {
        columns.push(tenant.column.clone());
    }

    let mut ids = Vec::with_capacity(job.items.len());
    let rows: Vec<Vec<Value>> = job
        .items
        .iter()
        .map(|item| {
            ids.push(item.identifier());
            let mut row: Vec<Value> = resolved.iter().map(|c| (c.field.read)(item)).collect();
            if let Some(tenant) = job.tenant {
                row.push(Value::Text(tenant.identifier.clone()));
            }
            row
        })
        .collect();

    if job.truncate {
        warn!(table = %job.table, "Truncating table");
        report.deleted = delete_all(job.table, job.tenant).execute(tx)?;
    } else {
        for stmt in delete_by_ids(job.table, &pk_column, &ids, job.tenant) {
            report.deleted += stmt.execute(tx)?;
        }
    }
    debug!(table = %job.table, deleted = report.deleted, "Stale rows removed");

    report.inserted = insert_rows(job.table, &columns, rows)
        .iter()
        .map(|stmt: &Statement| stmt.execute(tx))
        .sum::<Result<usize>>()?;

    info!(
        table = %job.table,
        deleted = report.deleted,
        inserted = report.inserted,
        "Rows synchronized"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnMapping;
    use crate::error::Error;
    use crate::model::Broker;
    use crate::schema::mapping_key;
    use crate::storage::Database;
    use crate::sync::types::TenantScope;

    fn mapping() -> ColumnMapping {
        Broker::schema()
            .iter()
            .map(|f| {
                let key = mapping_key(f.remote);
                let column = if key == "id_corretor" { "id" } else { f.local };
                (key.to_string(), column.to_string())
            })
            .collect()
    }

    fn setup() -> Database {
        let db = Database::open_memory().unwrap();
        db.execute(
            "CREATE TABLE brokers (
                id INTEGER NOT NULL,
                tenant TEXT,
                name TEXT, email TEXT, phone TEXT, mobile_phone TEXT,
                creci TEXT, role TEXT, avatar_url TEXT
            )",
        )
        .unwrap();
        db
    }

    fn broker(id: i64, name: &str) -> Broker {
        Broker {
            id,
            name: name.to_string(),
            ..Broker::default()
        }
    }

    fn names(db: &Database, tenant: Option<&str>) -> Vec<(i64, String)> {
        let mut stmt = db
            .conn()
            .prepare("SELECT id, name FROM brokers WHERE tenant IS ?1 ORDER BY id")
            .unwrap();
        let rows = stmt
            .query_map([tenant], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        rows
    }

    fn run(
        db: &mut Database,
        items: &[Broker],
        tenant: Option<&TenantScope>,
        truncate: bool,
    ) -> Result<SyncReport> {
        let mapping = mapping();
        db.run_in_tx("test", |tx| {
            replace_sync(
                tx,
                &SyncJob {
                    items,
                    mapping: &mapping,
                    table: "brokers",
                    tenant,
                    truncate,
                },
            )
        })
    }

    fn scope(id: &str) -> TenantScope {
        TenantScope {
            column: "tenant".to_string(),
            identifier: id.to_string(),
        }
    }

    #[test]
    fn test_replace_by_id_keeps_other_rows() {
        let mut db = setup();
        run(&mut db, &[broker(1, "a"), broker(2, "b"), broker(3, "c")], None, false).unwrap();

        let report = run(&mut db, &[broker(1, "a2"), broker(2, "b2")], None, false).unwrap();
        assert_eq!(report.deleted, 2);
        assert_eq!(report.inserted, 2);
        assert_eq!(
            names(&db, None),
            [(1, "a2".to_string()), (2, "b2".to_string()), (3, "c".to_string())]
        );
    }

    #[test]
    fn test_truncate_removes_everything_first() {
        let mut db = setup();
        run(&mut db, &[broker(1, "a"), broker(2, "b"), broker(3, "c")], None, false).unwrap();

        let report = run(&mut db, &[broker(9, "z")], None, true).unwrap();
        assert_eq!(report.deleted, 3);
        assert_eq!(names(&db, None), [(9, "z".to_string())]);
    }

    #[test]
    fn test_tenants_with_overlapping_ids_are_isolated() {
        let mut db = setup();
        let acme = scope("acme");
        let globex = scope("globex");

        run(&mut db, &[broker(1, "acme-1"), broker(2, "acme-2")], Some(&acme), false).unwrap();
        run(&mut db, &[broker(1, "globex-1")], Some(&globex), false).unwrap();
        run(&mut db, &[broker(1, "acme-1b")], Some(&acme), false).unwrap();
        run(&mut db, &[broker(5, "globex-5")], Some(&globex), true).unwrap();

        assert_eq!(
            names(&db, Some("acme")),
            [(1, "acme-1b".to_string()), (2, "acme-2".to_string())]
        );
        assert_eq!(names(&db, Some("globex")), [(5, "globex-5".to_string())]);
    }

    #[test]
    fn test_missing_mapping_writes_nothing() {
        let mut db = setup();
        run(&mut db, &[broker(1, "a")], None, false).unwrap();

        let mut incomplete = mapping();
        incomplete.remove("creci");
        let items = [broker(1, "changed"), broker(2, "new")];
        let err = db
            .run_in_tx("test", |tx| {
                replace_sync(
                    tx,
                    &SyncJob {
                        items: &items,
                        mapping: &incomplete,
                        table: "brokers",
                        tenant: None,
                        truncate: true,
                    },
                )
            })
            .unwrap_err();

        assert!(matches!(err, Error::MissingColumnMapping { ref field, .. } if field == "creci"));
        assert!(err.is_configuration());
        assert_eq!(names(&db, None), [(1, "a".to_string())]);
    }

    #[test]
    fn test_empty_items_is_a_no_op() {
        let mut db = setup();
        run(&mut db, &[broker(1, "a")], None, false).unwrap();

        let report = run(&mut db, &[], None, true).unwrap();
        assert_eq!(report, SyncReport { table: "brokers".to_string(), deleted: 0, inserted: 0 });
        assert_eq!(names(&db, None).len(), 1);
    }

    #[test]
    fn test_sql_failure_rolls_back() {
        let mut db = setup();
        run(&mut db, &[broker(1, "a")], None, false).unwrap();

        let mut wrong = mapping();
        wrong.insert("nome".to_string(), "no_such_column".to_string());
        let items = [broker(1, "b")];
        let result = db.run_in_tx("test", |tx| {
            replace_sync(
                tx,
                &SyncJob {
                    items: &items,
                    mapping: &wrong,
                    table: "brokers",
                    tenant: None,
                    truncate: false,
                },
            )
        });

        assert!(matches!(result, Err(Error::Database(_))));
        assert_eq!(names(&db, None), [(1, "a".to_string())]);
    }
}
