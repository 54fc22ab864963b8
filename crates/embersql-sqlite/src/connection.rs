//! Bundled-SQLite driver implementation.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;

use crate::driver::{ListenerId, SqlDriver, SqlStatement, TableListener};
use crate::error::{execution_error, native_code_and_message, prepare_error, DriverError};
use crate::listener::ListenerRegistry;
use crate::statement::SqliteStatement;

/// Lock-guarded connection slot shared between the driver and its
/// statements. `None` after close; every user must check-and-fail rather
/// than touch a stale handle.
pub(crate) struct ConnectionHandle {
    conn: Mutex<Option<Connection>>,
}

impl ConnectionHandle {
    pub(crate) fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A [`SqlDriver`] over one bundled-SQLite connection.
///
/// All statement execution is serialized by the connection lock. WAL
/// journaling and NORMAL synchronization are applied once at open so
/// readers stay concurrent with an in-flight writer transaction; writes
/// against this connection are still serialized by the engine.
pub struct SqliteDriver {
    handle: Arc<ConnectionHandle>,
    listeners: ListenerRegistry,
}

impl std::fmt::Debug for SqliteDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDriver").finish_non_exhaustive()
    }
}

impl SqliteDriver {
    /// Opens (creating if needed) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::OpenFailed`] when the engine cannot open the
    /// file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DriverError> {
        let path_display = path.as_ref().display().to_string();
        let conn = Connection::open(path.as_ref()).map_err(|e| {
            let (code, message) = native_code_and_message(&e);
            DriverError::OpenFailed {
                path: path_display.clone(),
                code,
                message,
            }
        })?;
        tracing::info!(path = %path_display, "database opened");
        Ok(Self::from_connection(conn))
    }

    /// Opens a private in-memory database. Used by tests and throwaway
    /// work; the same pragmas are applied as for file databases.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::OpenFailed`] when the engine refuses.
    pub fn open_in_memory() -> Result<Self, DriverError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            let (code, message) = native_code_and_message(&e);
            DriverError::OpenFailed {
                path: String::from(":memory:"),
                code,
                message,
            }
        })?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        let driver = Self {
            handle: Arc::new(ConnectionHandle {
                conn: Mutex::new(Some(conn)),
            }),
            listeners: ListenerRegistry::new(),
        };
        driver.apply_open_pragmas();
        driver
    }

    /// Write-amplifying settings applied once per connection. A failure
    /// here (e.g. WAL on a read-only filesystem) is logged and tolerated;
    /// the connection stays usable with the engine defaults.
    fn apply_open_pragmas(&self) {
        for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
            if let Err(e) = self.execute(pragma) {
                tracing::warn!(pragma, error = %e, "failed to apply connection pragma");
            }
        }
    }
}

impl SqlDriver for SqliteDriver {
    fn execute(&self, sql: &str) -> Result<(), DriverError> {
        tracing::debug!(sql, "EXECUTE");
        let guard = self.handle.lock();
        let conn = guard.as_ref().ok_or(DriverError::AlreadyClosed)?;
        conn.execute_batch(sql)
            .map_err(|e| execution_error(sql, &e, false))
    }

    fn prepare(&self, sql: &str) -> Result<Box<dyn SqlStatement>, DriverError> {
        tracing::debug!(sql, "PREPARE");
        let guard = self.handle.lock();
        let conn = guard.as_ref().ok_or(DriverError::AlreadyClosed)?;
        // Compile eagerly so syntax errors surface here; the compiled
        // statement parks in the connection's cache and is re-fetched at
        // execution time.
        let (columns, parameter_count) = {
            let stmt = conn
                .prepare_cached(sql)
                .map_err(|e| prepare_error(sql, &e))?;
            let columns: Vec<String> =
                stmt.column_names().iter().map(|n| String::from(*n)).collect();
            (columns, stmt.parameter_count())
        };
        Ok(Box::new(SqliteStatement::new(
            Arc::clone(&self.handle),
            String::from(sql),
            columns,
            parameter_count,
        )))
    }

    fn changes(&self) -> Result<i64, DriverError> {
        let guard = self.handle.lock();
        let conn = guard.as_ref().ok_or(DriverError::AlreadyClosed)?;
        Ok(conn.changes() as i64)
    }

    fn last_insert_id(&self) -> Result<i64, DriverError> {
        let guard = self.handle.lock();
        let conn = guard.as_ref().ok_or(DriverError::AlreadyClosed)?;
        Ok(conn.last_insert_rowid())
    }

    fn add_listener(&self, table: &str, listener: TableListener) -> ListenerId {
        self.listeners.add(table, listener)
    }

    fn remove_listener(&self, table: &str, id: ListenerId) {
        self.listeners.remove(table, id)
    }

    fn notify_listeners(&self, table: &str) {
        self.listeners.notify(table)
    }

    fn close(&self) {
        let mut guard = self.handle.lock();
        if guard.take().is_some() {
            tracing::info!("database closed");
        }
    }
}
