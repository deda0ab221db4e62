//! Active-set reconciliation of properties.

use rusqlite::Transaction;
use tracing::{debug, info};

use crate::error::Result;

use super::statement::{mark_active as mark_stmt, reset_active};
use super::types::{ActiveReport, TenantScope};

/// Flag exactly `ids` as active in `table` (within the tenant, if any).
///
/// Every active row is reset first, then the listed identifiers are set.
/// With no identifiers the table (or tenant slice) ends up fully inactive.
///
/// # Errors
///
/// Returns the first SQL error; the caller rolls back.
pub fn mark_active(
    tx: &Transaction,
    ids: &[i64],
    table: &str,
    pk_column: &str,
    active_column: &str,
    tenant: Option<&TenantScope>,
) -> Result<ActiveReport> {
    let deactivated = reset_active(table, active_column, tenant).execute(tx)?;
    debug!(table, deactivated, "Active flags reset");

    let mut activated = 0;
    for stmt in mark_stmt(table, pk_column, active_column, ids, tenant) {
        activated += stmt.execute(tx)?;
    }

    info!(table, activated, listed = ids.len(), "Active properties marked");
    Ok(ActiveReport {
        table: table.to_string(),
        deactivated,
        activated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn setup() -> Database {
        let db = Database::open_memory().unwrap();
        db.execute("CREATE TABLE properties (id INTEGER, tenant TEXT, active INTEGER DEFAULT 0)")
            .unwrap();
        db.execute(
            "INSERT INTO properties (id, tenant, active) VALUES
                (1, 'a', 1), (5, 'a', 0), (7, 'a', 1), (9, 'a', 0),
                (5, 'b', 1), (8, 'b', 1)",
        )
        .unwrap();
        db
    }

    fn active_ids(db: &Database, tenant: &str) -> Vec<i64> {
        let mut stmt = db
            .conn()
            .prepare("SELECT id FROM properties WHERE active = 1 AND tenant = ?1 ORDER BY id")
            .unwrap();
        let ids = stmt
            .query_map([tenant], |r| r.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        ids
    }

    #[test]
    fn test_exactly_listed_ids_are_active() {
        let mut db = setup();
        let scope = TenantScope {
            column: "tenant".to_string(),
            identifier: "a".to_string(),
        };

        let report = db
            .run_in_tx("active", |tx| {
                mark_active(tx, &[5, 7], "properties", "id", "active", Some(&scope))
            })
            .unwrap();

        assert_eq!(active_ids(&db, "a"), [5, 7]);
        assert_eq!(report.deactivated, 2);
        assert_eq!(report.activated, 2);
        // The other tenant is untouched.
        assert_eq!(active_ids(&db, "b"), [5, 8]);
    }

    #[test]
    fn test_empty_list_deactivates_everything() {
        let mut db = setup();
        db.run_in_tx("active", |tx| {
            mark_active(tx, &[], "properties", "id", "active", None)
        })
        .unwrap();

        assert!(active_ids(&db, "a").is_empty());
        assert!(active_ids(&db, "b").is_empty());
    }
}
