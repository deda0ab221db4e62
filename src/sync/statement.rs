//! SQL statement builder.
//!
//! Table and column names come from user configuration, so every
//! identifier is quoted; values are always bound as parameters.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use crate::error::Result;

use super::types::TenantScope;

/// Upper bound of bound parameters per statement (SQLite default since 3.32).
pub const MAX_PARAMS: usize = 32_766;

/// Quote an SQL identifier, doubling embedded quotes.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// A statement with its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    /// Run the statement, returning the number of changed rows.
    ///
    /// # Errors
    ///
    /// Returns the SQLite error of the statement.
    pub fn execute(&self, conn: &Connection) -> Result<usize> {
        Ok(conn.execute(&self.sql, params_from_iter(self.params.iter()))?)
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn push_tenant_filter(sql: &mut String, params: &mut Vec<Value>, tenant: Option<&TenantScope>) {
    if let Some(t) = tenant {
        sql.push_str(&format!(" AND {} = ?", quote_ident(&t.column)));
        params.push(Value::Text(t.identifier.clone()));
    }
}

/// `DELETE FROM table [WHERE tenant = ?]`
#[must_use]
pub fn delete_all(table: &str, tenant: Option<&TenantScope>) -> Statement {
    let mut sql = format!("DELETE FROM {}", quote_ident(table));
    let mut params = Vec::new();
    if let Some(t) = tenant {
        sql.push_str(&format!(" WHERE {} = ?", quote_ident(&t.column)));
        params.push(Value::Text(t.identifier.clone()));
    }
    Statement { sql, params }
}

/// `DELETE FROM table WHERE pk IN (...) [AND tenant = ?]`, chunked under
/// the parameter limit.
#[must_use]
pub fn delete_by_ids(
    table: &str,
    pk_column: &str,
    ids: &[i64],
    tenant: Option<&TenantScope>,
) -> Vec<Statement> {
    ids.chunks(MAX_PARAMS - 1)
        .map(|chunk| {
            let mut sql = format!(
                "DELETE FROM {} WHERE {} IN ({})",
                quote_ident(table),
                quote_ident(pk_column),
                placeholders(chunk.len())
            );
            let mut params: Vec<Value> = chunk.iter().copied().map(Value::Integer).collect();
            push_tenant_filter(&mut sql, &mut params, tenant);
            Statement { sql, params }
        })
        .collect()
}

/// Multi-row `INSERT INTO table (cols) VALUES (...), (...)`.
///
/// Rows are split across several statements only when one statement would
/// exceed [`MAX_PARAMS`]. Every row must have `columns.len()` values.
#[must_use]
pub fn insert_rows(table: &str, columns: &[String], rows: Vec<Vec<Value>>) -> Vec<Statement> {
    if columns.is_empty() || rows.is_empty() {
        return Vec::new();
    }

    let quoted: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    let head = format!("INSERT INTO {} ({}) VALUES ", quote_ident(table), quoted.join(", "));
    let tuple = format!("({})", placeholders(columns.len()));
    let rows_per_statement = (MAX_PARAMS / columns.len()).max(1);

    let mut statements = Vec::new();
    let mut rows = rows.into_iter().peekable();
    while rows.peek().is_some() {
        let mut sql = head.clone();
        let mut params = Vec::with_capacity(rows_per_statement * columns.len());
        for (i, row) in rows.by_ref().take(rows_per_statement).enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&tuple);
            params.extend(row);
        }
        statements.push(Statement { sql, params });
    }
    statements
}

/// `UPDATE table SET active = 0 WHERE active = 1 [AND tenant = ?]`
#[must_use]
pub fn reset_active(table: &str, active_column: &str, tenant: Option<&TenantScope>) -> Statement {
    let active = quote_ident(active_column);
    let mut sql = format!(
        "UPDATE {} SET {active} = 0 WHERE {active} = 1",
        quote_ident(table)
    );
    let mut params = Vec::new();
    push_tenant_filter(&mut sql, &mut params, tenant);
    Statement { sql, params }
}

/// `UPDATE table SET active = 1 WHERE pk IN (...) [AND tenant = ?]`, chunked.
#[must_use]
pub fn mark_active(
    table: &str,
    pk_column: &str,
    active_column: &str,
    ids: &[i64],
    tenant: Option<&TenantScope>,
) -> Vec<Statement> {
    ids.chunks(MAX_PARAMS - 1)
        .map(|chunk| {
            let mut sql = format!(
                "UPDATE {} SET {} = 1 WHERE {} IN ({})",
                quote_ident(table),
                quote_ident(active_column),
                quote_ident(pk_column),
                placeholders(chunk.len())
            );
            let mut params: Vec<Value> = chunk.iter().copied().map(Value::Integer).collect();
            push_tenant_filter(&mut sql, &mut params, tenant);
            Statement { sql, params }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> TenantScope {
        TenantScope {
            column: "tenant_id".to_string(),
            identifier: "acme".to_string(),
        }
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("banners"), "\"banners\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_delete_all_with_and_without_tenant() {
        assert_eq!(delete_all("t", None).sql, "DELETE FROM \"t\"");

        let stmt = delete_all("t", Some(&scope()));
        assert_eq!(stmt.sql, "DELETE FROM \"t\" WHERE \"tenant_id\" = ?");
        assert_eq!(stmt.params, [Value::Text("acme".to_string())]);
    }

    #[test]
    fn test_delete_by_ids() {
        let stmts = delete_by_ids("t", "id", &[1, 2], Some(&scope()));
        assert_eq!(stmts.len(), 1);
        assert_eq!(
            stmts[0].sql,
            "DELETE FROM \"t\" WHERE \"id\" IN (?, ?) AND \"tenant_id\" = ?"
        );
        assert_eq!(stmts[0].params.len(), 3);
    }

    #[test]
    fn test_insert_rows_single_statement() {
        let columns = vec!["a".to_string(), "b".to_string()];
        let rows = vec![
            vec![Value::Integer(1), Value::Null],
            vec![Value::Integer(2), Value::Text("x".to_string())],
        ];
        let stmts = insert_rows("t", &columns, rows);
        assert_eq!(stmts.len(), 1);
        assert_eq!(
            stmts[0].sql,
            "INSERT INTO \"t\" (\"a\", \"b\") VALUES (?, ?), (?, ?)"
        );
        assert_eq!(stmts[0].params.len(), 4);
    }

    #[test]
    fn test_insert_rows_splits_at_param_limit() {
        let columns: Vec<String> = (0..100).map(|i| format!("c{i}")).collect();
        let rows: Vec<Vec<Value>> = (0..700).map(|_| vec![Value::Null; 100]).collect();
        let stmts = insert_rows("t", &columns, rows);

        // 327 rows of 100 columns fit under the limit.
        assert_eq!(stmts.len(), 3);
        assert!(stmts.iter().all(|s| s.params.len() <= MAX_PARAMS));
        assert_eq!(stmts.iter().map(|s| s.params.len()).sum::<usize>(), 70_000);
    }

    #[test]
    fn test_active_statements() {
        let reset = reset_active("p", "active", None);
        assert_eq!(reset.sql, "UPDATE \"p\" SET \"active\" = 0 WHERE \"active\" = 1");

        let mark = mark_active("p", "id", "active", &[5, 7], Some(&scope()));
        assert_eq!(
            mark[0].sql,
            "UPDATE \"p\" SET \"active\" = 1 WHERE \"id\" IN (?, ?) AND \"tenant_id\" = ?"
        );
        assert!(mark_active("p", "id", "active", &[], None).is_empty());
    }
}
