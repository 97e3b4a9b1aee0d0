//! Shared storage handle.
//!
//! The engine owns one SQLite connection; every table gateway reaches it
//! through an `Arc<Storage>`. The connection sits behind a mutex that is held
//! for exactly one statement, so concurrent callers are serialized.
//!
//! # Commit discipline
//!
//! Writes are committed only by an explicit [`commit`](Storage::commit). The
//! first mutating statement after a commit or rollback opens a transaction
//! with `BEGIN`; later writes join it. Dropping the connection with a
//! transaction still open discards the pending writes.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use coldorm_core::Value;
use rusqlite::{Connection, params_from_iter};
use tracing::{debug, info, trace};

use crate::convert::{bind_all, read_row};
use crate::error::{OrmError, Result};
use crate::schema::{INTERNAL_TABLE_PREFIX, LIST_TABLES_SQL};
use crate::statement::Statement;

pub(crate) struct Storage {
    conn: Mutex<Connection>,
    log_statements: bool,
}

impl Storage {
    pub(crate) fn open(path: &Path, log_statements: bool) -> Result<Self> {
        debug!(path = %path.display(), "Opening storage file");
        Ok(Self::new(Connection::open(path)?, log_statements))
    }

    pub(crate) fn open_in_memory(log_statements: bool) -> Result<Self> {
        Ok(Self::new(Connection::open_in_memory()?, log_statements))
    }

    fn new(conn: Connection, log_statements: bool) -> Self {
        Self {
            conn: Mutex::new(conn),
            log_statements,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| OrmError::LockPoisoned)
    }

    fn log(&self, sql: &str, params: &[Value]) {
        if self.log_statements {
            info!(sql, ?params, "Executing statement");
        } else {
            trace!(sql, ?params, "Executing statement");
        }
    }

    /// Runs a migration statement immediately, in autocommit mode.
    ///
    /// Only the engine's migration calls this, before any gateway has written.
    /// Data-definition statements issued afterwards go through
    /// [`execute`](Self::execute) and stay pending until commit.
    pub(crate) fn execute_ddl(&self, sql: &str) -> Result<()> {
        self.log(sql, &[]);
        let conn = self.lock()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Runs a mutating statement, opening a transaction if none is pending.
    ///
    /// Covers `DROP TABLE` as well as row writes, so both become durable only
    /// at [`commit`](Self::commit).
    ///
    /// Returns the number of affected rows and the last inserted row id.
    pub(crate) fn execute(&self, statement: &Statement) -> Result<(usize, i64)> {
        self.log(&statement.sql, &statement.params);
        let conn = self.lock()?;
        if conn.is_autocommit() {
            conn.execute_batch("BEGIN")?;
        }
        let changed = conn.execute(&statement.sql, params_from_iter(bind_all(&statement.params)))?;
        Ok((changed, conn.last_insert_rowid()))
    }

    /// Runs a query and returns the first `width` columns of every row, in
    /// storage row order.
    pub(crate) fn query(&self, statement: &Statement, width: usize) -> Result<Vec<Vec<Value>>> {
        self.log(&statement.sql, &statement.params);
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&statement.sql)?;
        let rows = stmt
            .query_map(params_from_iter(bind_all(&statement.params)), |row| {
                read_row(row, width)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Lists user tables from the storage catalog.
    ///
    /// SQLite's own bookkeeping tables (`sqlite_sequence` and friends) are
    /// left out.
    pub(crate) fn list_tables(&self) -> Result<Vec<String>> {
        self.log(LIST_TABLES_SQL, &[]);
        let conn = self.lock()?;
        let mut stmt = conn.prepare(LIST_TABLES_SQL)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names
            .into_iter()
            .filter(|name| !name.starts_with(INTERNAL_TABLE_PREFIX))
            .collect())
    }

    /// Commits pending writes. A no-op when nothing is pending.
    pub(crate) fn commit(&self) -> Result<()> {
        let conn = self.lock()?;
        if !conn.is_autocommit() {
            self.log("COMMIT", &[]);
            conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    /// Discards pending writes. A no-op when nothing is pending.
    pub(crate) fn rollback(&self) -> Result<()> {
        let conn = self.lock()?;
        if !conn.is_autocommit() {
            self.log("ROLLBACK", &[]);
            conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    /// Returns `true` while a transaction with uncommitted writes is open.
    pub(crate) fn has_pending_writes(&self) -> Result<bool> {
        Ok(!self.lock()?.is_autocommit())
    }
}
