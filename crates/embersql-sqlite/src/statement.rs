//! Prepared-statement implementation.
//!
//! The contract is the C API's bind/step/reset cycle; the backing engine is
//! reached through the connection's statement cache. Execution happens on
//! the first `step()`: the statement re-fetches its cached compilation,
//! binds the buffered parameters, and either runs to completion (no result
//! columns) or materializes the result rows under the connection lock.
//! Subsequent `step()` calls walk the materialized rows, so the lock is
//! never held across contract calls.

use std::collections::VecDeque;
use std::sync::Arc;

use embersql_core::{ColumnType, SqlValue};
use rusqlite::types::{Value, ValueRef};

use crate::connection::ConnectionHandle;
use crate::driver::SqlStatement;
use crate::error::{execution_error, prepare_error, DriverError};

enum State {
    /// Bound (or not) and not yet executed.
    Pending,
    /// Executed with result rows; `current` is the row `step()` last
    /// yielded.
    Rows {
        remaining: VecDeque<Vec<SqlValue>>,
        current: Option<Vec<SqlValue>>,
    },
    /// Executed to completion.
    Done,
    /// Released.
    Closed,
}

/// A compiled statement against one [`SqliteDriver`](crate::SqliteDriver).
pub struct SqliteStatement {
    handle: Arc<ConnectionHandle>,
    sql: String,
    columns: Vec<String>,
    params: Vec<Value>,
    state: State,
}

impl std::fmt::Debug for SqliteStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStatement")
            .field("sql", &self.sql)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

impl SqliteStatement {
    pub(crate) fn new(
        handle: Arc<ConnectionHandle>,
        sql: String,
        columns: Vec<String>,
        parameter_count: usize,
    ) -> Self {
        Self {
            handle,
            sql,
            columns,
            // Unbound parameters are NULL, as in the C API.
            params: vec![Value::Null; parameter_count],
            state: State::Pending,
        }
    }

    fn bind(&mut self, index: usize, value: Value) -> Result<(), DriverError> {
        if matches!(self.state, State::Closed) {
            return Err(DriverError::BindFailed {
                sql: self.sql.clone(),
                index,
                message: String::from("statement is closed"),
            });
        }
        if index == 0 || index > self.params.len() {
            return Err(DriverError::BindFailed {
                sql: self.sql.clone(),
                index,
                message: format!(
                    "parameter index out of range (statement has {})",
                    self.params.len()
                ),
            });
        }
        self.params[index - 1] = value;
        Ok(())
    }

    fn execute_pending(&mut self) -> Result<bool, DriverError> {
        let guard = self.handle.lock();
        let conn = guard.as_ref().ok_or(DriverError::AlreadyClosed)?;
        let mut stmt = conn
            .prepare_cached(&self.sql)
            .map_err(|e| prepare_error(&self.sql, &e))?;
        for (i, value) in self.params.iter().enumerate() {
            stmt.raw_bind_parameter(i + 1, value)
                .map_err(|e| DriverError::BindFailed {
                    sql: self.sql.clone(),
                    index: i + 1,
                    message: e.to_string(),
                })?;
        }

        if self.columns.is_empty() {
            stmt.raw_execute()
                .map_err(|e| execution_error(&self.sql, &e, true))?;
            self.state = State::Done;
            return Ok(false);
        }

        let column_count = self.columns.len();
        let mut remaining = VecDeque::new();
        let mut rows = stmt.raw_query();
        while let Some(row) = rows
            .next()
            .map_err(|e| execution_error(&self.sql, &e, true))?
        {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value = row
                    .get_ref(i)
                    .map_err(|e| execution_error(&self.sql, &e, true))?;
                values.push(owned_value(value));
            }
            remaining.push_back(values);
        }

        match remaining.pop_front() {
            Some(first) => {
                self.state = State::Rows {
                    remaining,
                    current: Some(first),
                };
                Ok(true)
            }
            None => {
                self.state = State::Done;
                Ok(false)
            }
        }
    }

    fn current(&self, index: usize) -> Result<&SqlValue, DriverError> {
        match &self.state {
            State::Rows {
                current: Some(row), ..
            } => row.get(index).ok_or(DriverError::InvalidColumn { index }),
            _ => Err(DriverError::NoCurrentRow),
        }
    }
}

fn owned_value(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(v) => SqlValue::Integer(v),
        ValueRef::Real(v) => SqlValue::Real(v),
        ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
    }
}

impl SqlStatement for SqliteStatement {
    fn bind_long(&mut self, index: usize, value: Option<i64>) -> Result<(), DriverError> {
        self.bind(index, value.map_or(Value::Null, Value::Integer))
    }

    fn bind_double(&mut self, index: usize, value: Option<f64>) -> Result<(), DriverError> {
        self.bind(index, value.map_or(Value::Null, Value::Real))
    }

    fn bind_string(&mut self, index: usize, value: Option<&str>) -> Result<(), DriverError> {
        self.bind(
            index,
            value.map_or(Value::Null, |v| Value::Text(String::from(v))),
        )
    }

    fn bind_blob(&mut self, index: usize, value: Option<&[u8]>) -> Result<(), DriverError> {
        self.bind(index, value.map_or(Value::Null, |v| Value::Blob(v.to_vec())))
    }

    fn bind_null(&mut self, index: usize) -> Result<(), DriverError> {
        self.bind(index, Value::Null)
    }

    fn step(&mut self) -> Result<bool, DriverError> {
        let advanced = match &mut self.state {
            State::Closed => {
                return Err(DriverError::StepFailed {
                    sql: self.sql.clone(),
                    code: -1,
                    message: String::from("statement is closed"),
                })
            }
            State::Done => return Ok(false),
            State::Pending => None,
            State::Rows { remaining, current } => match remaining.pop_front() {
                Some(row) => {
                    *current = Some(row);
                    Some(true)
                }
                None => Some(false),
            },
        };
        match advanced {
            Some(true) => Ok(true),
            Some(false) => {
                self.state = State::Done;
                Ok(false)
            }
            None => self.execute_pending(),
        }
    }

    fn column_long(&self, index: usize) -> Result<i64, DriverError> {
        Ok(match self.current(index)? {
            SqlValue::Integer(v) => *v,
            SqlValue::Real(v) => *v as i64,
            SqlValue::Text(s) => s.trim().parse().unwrap_or(0),
            SqlValue::Null | SqlValue::Blob(_) => 0,
        })
    }

    fn column_double(&self, index: usize) -> Result<f64, DriverError> {
        Ok(match self.current(index)? {
            SqlValue::Real(v) => *v,
            SqlValue::Integer(v) => *v as f64,
            SqlValue::Text(s) => s.trim().parse().unwrap_or(0.0),
            SqlValue::Null | SqlValue::Blob(_) => 0.0,
        })
    }

    fn column_string(&self, index: usize) -> Result<String, DriverError> {
        Ok(match self.current(index)? {
            SqlValue::Text(s) => s.clone(),
            SqlValue::Integer(v) => v.to_string(),
            SqlValue::Real(v) => v.to_string(),
            SqlValue::Blob(b) => String::from_utf8_lossy(b).into_owned(),
            SqlValue::Null => String::new(),
        })
    }

    fn column_blob(&self, index: usize) -> Result<Vec<u8>, DriverError> {
        Ok(match self.current(index)? {
            SqlValue::Blob(b) => b.clone(),
            SqlValue::Text(s) => s.clone().into_bytes(),
            SqlValue::Integer(_) | SqlValue::Real(_) | SqlValue::Null => Vec::new(),
        })
    }

    fn column_type(&self, index: usize) -> Result<ColumnType, DriverError> {
        Ok(self.current(index)?.column_type())
    }

    fn column_name(&self, index: usize) -> Result<String, DriverError> {
        self.columns
            .get(index)
            .cloned()
            .ok_or(DriverError::InvalidColumn { index })
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn reset(&mut self) {
        if matches!(self.state, State::Closed) {
            return;
        }
        for value in &mut self.params {
            *value = Value::Null;
        }
        self.state = State::Pending;
    }

    fn close(&mut self) {
        self.params.clear();
        self.state = State::Closed;
    }
}

impl Drop for SqliteStatement {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::SqliteDriver;
    use crate::driver::SqlDriver;

    fn seeded() -> SqliteDriver {
        let driver = SqliteDriver::open_in_memory().unwrap();
        driver
            .execute(
                "CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT, \
                 name TEXT NOT NULL, score REAL, data BLOB)",
            )
            .unwrap();
        driver
    }

    #[test]
    fn test_bind_step_and_read_back() {
        let driver = seeded();
        let mut insert = driver
            .prepare("INSERT INTO t (name, score, data) VALUES (?, ?, ?)")
            .unwrap();
        insert.bind_string(1, Some("alice")).unwrap();
        insert.bind_double(2, Some(9.5)).unwrap();
        insert.bind_blob(3, Some(&[1, 2, 3])).unwrap();
        assert!(!insert.step().unwrap());

        let mut select = driver
            .prepare("SELECT id, name, score, data FROM t WHERE name = ?")
            .unwrap();
        select.bind_string(1, Some("alice")).unwrap();
        assert!(select.step().unwrap());
        assert_eq!(select.column_long(0).unwrap(), 1);
        assert_eq!(select.column_string(1).unwrap(), "alice");
        assert!((select.column_double(2).unwrap() - 9.5).abs() < f64::EPSILON);
        assert_eq!(select.column_blob(3).unwrap(), vec![1, 2, 3]);
        assert!(!select.step().unwrap());
    }

    #[test]
    fn test_step_is_false_for_non_row_statements() {
        let driver = seeded();
        let mut stmt = driver
            .prepare("INSERT INTO t (name) VALUES ('x')")
            .unwrap();
        assert_eq!(stmt.column_count(), 0);
        assert!(!stmt.step().unwrap());
        assert!(!stmt.step().unwrap());
    }

    #[test]
    fn test_reset_clears_bindings_for_reuse() {
        let driver = seeded();
        let mut stmt = driver
            .prepare("INSERT INTO t (name, score) VALUES (?, ?)")
            .unwrap();
        for (name, score) in [("a", 1.0), ("b", 2.0), ("c", 3.0)] {
            stmt.bind_string(1, Some(name)).unwrap();
            stmt.bind_double(2, Some(score)).unwrap();
            assert!(!stmt.step().unwrap());
            stmt.reset();
        }
        // After reset with no re-bind, unbound parameters are NULL: the
        // NOT NULL column must reject the row.
        let err = stmt.step().unwrap_err();
        assert!(err.is_constraint_violation());

        let mut count = driver.prepare("SELECT COUNT(*) FROM t").unwrap();
        assert!(count.step().unwrap());
        assert_eq!(count.column_long(0).unwrap(), 3);
    }

    #[test]
    fn test_column_metadata() {
        let driver = seeded();
        driver
            .execute("INSERT INTO t (name, score) VALUES ('x', NULL)")
            .unwrap();
        let mut stmt = driver.prepare("SELECT id, name, score FROM t").unwrap();
        assert_eq!(stmt.column_count(), 3);
        assert_eq!(stmt.column_name(0).unwrap(), "id");
        assert_eq!(stmt.column_name(2).unwrap(), "score");
        assert!(matches!(
            stmt.column_name(9),
            Err(DriverError::InvalidColumn { index: 9 })
        ));
        assert!(stmt.step().unwrap());
        assert_eq!(stmt.column_type(0).unwrap(), ColumnType::Integer);
        assert_eq!(stmt.column_type(1).unwrap(), ColumnType::Text);
        assert_eq!(stmt.column_type(2).unwrap(), ColumnType::Null);
    }

    #[test]
    fn test_reading_without_a_row_fails() {
        let driver = seeded();
        let stmt = driver.prepare("SELECT id FROM t").unwrap();
        assert!(matches!(
            stmt.column_long(0),
            Err(DriverError::NoCurrentRow)
        ));
    }

    #[test]
    fn test_bind_index_out_of_range() {
        let driver = seeded();
        let mut stmt = driver
            .prepare("SELECT id FROM t WHERE name = ?")
            .unwrap();
        assert!(matches!(
            stmt.bind_string(0, Some("x")),
            Err(DriverError::BindFailed { index: 0, .. })
        ));
        assert!(matches!(
            stmt.bind_string(2, Some("x")),
            Err(DriverError::BindFailed { index: 2, .. })
        ));
    }

    #[test]
    fn test_bind_value_dispatch() {
        let driver = seeded();
        let mut stmt = driver
            .prepare("INSERT INTO t (name, score, data) VALUES (?, ?, ?)")
            .unwrap();
        stmt.bind_value(1, &SqlValue::Text(String::from("v")))
            .unwrap();
        stmt.bind_value(2, &SqlValue::Null).unwrap();
        stmt.bind_value(3, &SqlValue::Blob(vec![7])).unwrap();
        assert!(!stmt.step().unwrap());
        assert_eq!(driver.changes().unwrap(), 1);
    }

    #[test]
    fn test_statement_fails_after_driver_close() {
        let driver = seeded();
        let mut stmt = driver.prepare("SELECT id FROM t").unwrap();
        driver.close();
        assert_eq!(stmt.step().unwrap_err(), DriverError::AlreadyClosed);
    }

    #[test]
    fn test_closed_statement_rejects_use() {
        let driver = seeded();
        let mut stmt = driver.prepare("SELECT id FROM t").unwrap();
        stmt.close();
        stmt.close();
        assert!(matches!(
            stmt.step(),
            Err(DriverError::StepFailed { .. })
        ));
    }
}
