//! The connection and prepared-statement contract.
//!
//! All generated/DAO code is written against these traits, never against a
//! concrete engine. The shapes follow the SQLite C API: 1-based parameter
//! indexes on bind, 0-based column indexes on read, `step()` returning
//! `true` while a result row is available.

use std::sync::Arc;

use embersql_core::{ColumnType, ScalarKind, SqlValue};

use crate::error::DriverError;

/// A change-notification callback for one table.
pub type TableListener = Arc<dyn Fn() + Send + Sync + 'static>;

/// Handle returned by [`SqlDriver::add_listener`], used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// One open database connection.
///
/// Implementations must serialize (or otherwise make safe) concurrent
/// statement execution against the single underlying connection, and must
/// check-and-fail with [`DriverError::AlreadyClosed`] after [`close`]
/// instead of touching a stale handle.
///
/// [`close`]: SqlDriver::close
pub trait SqlDriver: Send + Sync + std::fmt::Debug {
    /// Runs a statement with no parameters and no result rows.
    fn execute(&self, sql: &str) -> Result<(), DriverError>;

    /// Compiles a statement for parameterized execution.
    ///
    /// Compilation errors surface here as [`DriverError::PrepareFailed`].
    fn prepare(&self, sql: &str) -> Result<Box<dyn SqlStatement>, DriverError>;

    /// Affected-row count of the most recent insert/update/delete.
    fn changes(&self) -> Result<i64, DriverError>;

    /// Rowid generated by the most recent insert.
    fn last_insert_id(&self) -> Result<i64, DriverError>;

    /// Opens a transaction.
    fn begin_transaction(&self) -> Result<(), DriverError> {
        tracing::debug!("BEGIN TRANSACTION");
        self.execute("BEGIN TRANSACTION")
            .map_err(|e| DriverError::BeginFailed {
                message: e.to_string(),
            })
    }

    /// Commits the open transaction.
    fn end_transaction(&self) -> Result<(), DriverError> {
        tracing::debug!("COMMIT");
        self.execute("COMMIT").map_err(|e| DriverError::CommitFailed {
            message: e.to_string(),
        })
    }

    /// Rolls back the open transaction. A rollback failure is logged but
    /// not escalated; the error that triggered the rollback is the
    /// actionable one.
    fn rollback_transaction(&self) {
        tracing::debug!("ROLLBACK");
        if let Err(e) = self.execute("ROLLBACK") {
            tracing::error!(error = %e, "failed to roll back transaction");
        }
    }

    /// Registers a change listener for a table. Listeners live until
    /// removed or the driver is dropped.
    fn add_listener(&self, table: &str, listener: TableListener) -> ListenerId;

    /// Removes a previously registered listener.
    fn remove_listener(&self, table: &str, id: ListenerId);

    /// Notifies the table's listeners, synchronously and in registration
    /// order. Called by the DAO after a write has committed.
    fn notify_listeners(&self, table: &str);

    /// Closes the connection. Idempotent; later operations fail with
    /// [`DriverError::AlreadyClosed`].
    fn close(&self);
}

/// Transaction helper over any [`SqlDriver`].
pub trait SqlDriverExt: SqlDriver {
    /// Begins a transaction, runs `block`, commits on success, rolls back
    /// and re-raises on any failure (including a failed commit).
    fn transaction<R, E, F>(&self, block: F) -> Result<R, E>
    where
        E: From<DriverError>,
        F: FnOnce() -> Result<R, E>,
    {
        self.begin_transaction()?;
        match block() {
            Ok(value) => {
                if let Err(e) = self.end_transaction() {
                    self.rollback_transaction();
                    return Err(e.into());
                }
                Ok(value)
            }
            Err(e) => {
                self.rollback_transaction();
                Err(e)
            }
        }
    }
}

impl<D: SqlDriver + ?Sized> SqlDriverExt for D {}

/// One compiled statement: bind parameters, step through execution, read
/// result columns, reset for reuse.
pub trait SqlStatement: Send + std::fmt::Debug {
    /// Binds an integer (1-based index); `None` binds NULL.
    fn bind_long(&mut self, index: usize, value: Option<i64>) -> Result<(), DriverError>;

    /// Binds a float (1-based index); `None` binds NULL.
    fn bind_double(&mut self, index: usize, value: Option<f64>) -> Result<(), DriverError>;

    /// Binds text (1-based index); `None` binds NULL.
    fn bind_string(&mut self, index: usize, value: Option<&str>) -> Result<(), DriverError>;

    /// Binds a blob (1-based index); `None` binds NULL.
    fn bind_blob(&mut self, index: usize, value: Option<&[u8]>) -> Result<(), DriverError>;

    /// Binds NULL (1-based index).
    fn bind_null(&mut self, index: usize) -> Result<(), DriverError>;

    /// Binds a [`SqlValue`], dispatching exhaustively on its variant. This
    /// is the single bind-dispatch point of the type-mapping engine.
    fn bind_value(&mut self, index: usize, value: &SqlValue) -> Result<(), DriverError> {
        match value {
            SqlValue::Null => self.bind_null(index),
            SqlValue::Integer(v) => self.bind_long(index, Some(*v)),
            SqlValue::Real(v) => self.bind_double(index, Some(*v)),
            SqlValue::Text(v) => self.bind_string(index, Some(v)),
            SqlValue::Blob(v) => self.bind_blob(index, Some(v)),
        }
    }

    /// Executes one step. Returns `true` when a result row is available,
    /// `false` when exhausted or for statements that produce no rows.
    fn step(&mut self) -> Result<bool, DriverError>;

    /// Reads an integer from the current row (0-based index).
    fn column_long(&self, index: usize) -> Result<i64, DriverError>;

    /// Reads a float from the current row (0-based index).
    fn column_double(&self, index: usize) -> Result<f64, DriverError>;

    /// Reads text from the current row (0-based index).
    fn column_string(&self, index: usize) -> Result<String, DriverError>;

    /// Reads a blob from the current row (0-based index).
    fn column_blob(&self, index: usize) -> Result<Vec<u8>, DriverError>;

    /// Storage class of a column in the current row.
    fn column_type(&self, index: usize) -> Result<ColumnType, DriverError>;

    /// Name of a result column.
    fn column_name(&self, index: usize) -> Result<String, DriverError>;

    /// Number of result columns (0 for non-row-producing statements).
    fn column_count(&self) -> usize;

    /// Clears all prior bindings and row state so the statement can be
    /// safely re-bound and re-stepped inside a loop.
    fn reset(&mut self);

    /// Releases the statement. Idempotent; also runs on `Drop`, so every
    /// exit path releases exactly once.
    fn close(&mut self);
}

/// Extracts a column as a [`SqlValue`] according to the host kind. This is
/// the single extract-dispatch point of the type-mapping engine.
///
/// NULL columns read as [`SqlValue::Null`] regardless of kind; booleans
/// normalize to integer 0/1; unrecognized kinds read through their text
/// representation rather than being dropped.
///
/// # Errors
///
/// Propagates column-read failures from the statement.
pub fn read_column(
    stmt: &dyn SqlStatement,
    index: usize,
    kind: ScalarKind,
) -> Result<SqlValue, DriverError> {
    if stmt.column_type(index)? == ColumnType::Null {
        return Ok(SqlValue::Null);
    }
    Ok(match kind {
        ScalarKind::Int | ScalarKind::BigInt => SqlValue::Integer(stmt.column_long(index)?),
        ScalarKind::Bool => SqlValue::Integer(i64::from(stmt.column_long(index)? != 0)),
        ScalarKind::Double | ScalarKind::Float => SqlValue::Real(stmt.column_double(index)?),
        ScalarKind::Bytes => SqlValue::Blob(stmt.column_blob(index)?),
        ScalarKind::Text | ScalarKind::Other => SqlValue::Text(stmt.column_string(index)?),
    })
}
