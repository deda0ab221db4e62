//! SQLite connection and transaction handling.
//!
//! restmirror writes into tables it does not own, so no schema is applied
//! here. Every write runs inside [`Database::run_in_tx`], an IMMEDIATE
//! transaction committed or rolled back with the closure's result.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, error};

use crate::error::{Error, Result};

/// Busy timeout while waiting on another writer.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Target database handle.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open a database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        debug!(path = %path.display(), "Database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Get a reference to the underlying connection.
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute one statement outside any explicit transaction.
    ///
    /// # Errors
    ///
    /// Returns the SQLite error of the statement.
    pub fn execute(&self, sql: &str) -> Result<usize> {
        Ok(self.conn.execute(sql, [])?)
    }

    fn begin(&mut self) -> Result<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    /// Run `f` inside an IMMEDIATE transaction.
    ///
    /// Commits when `f` succeeds, rolls back otherwise.
    ///
    /// # Errors
    ///
    /// Returns the error of `f`, a commit error, or [`Error::Rollback`] when
    /// rolling back failed too.
    pub fn run_in_tx<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self.begin()?;
        debug!(op, "Transaction started");
        let result = f(&tx);
        finish_tx(tx, result)
    }
}

/// Commit `tx` on success, roll it back on failure.
///
/// A failed rollback is reported as [`Error::Rollback`], carrying the error
/// that triggered it.
fn finish_tx<R>(tx: Transaction<'_>, result: Result<R>) -> Result<R> {
    match result {
        Ok(value) => {
            tx.commit()?;
            debug!("Transaction committed");
            Ok(value)
        }
        Err(cause) => match tx.rollback() {
            Ok(()) => {
                debug!(error = %cause, "Transaction rolled back");
                Err(cause)
            }
            Err(rollback) => {
                error!(error = %rollback, cause = %cause, "Rollback failed");
                Err(Error::Rollback {
                    rollback,
                    cause: Box::new(cause),
                })
            }
        },
    }
}
