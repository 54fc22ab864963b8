//! Driver and statement errors.
//!
//! Execution errors embed the failing SQL and the engine's native error
//! code/message. Everything is `Clone` so a failed lazy open can replay its
//! original error to later callers.

use thiserror::Error;

/// Errors raised by the driver/statement layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DriverError {
    /// The database file could not be opened.
    #[error("cannot open database '{path}' (code {code}): {message}")]
    OpenFailed {
        /// Database path.
        path: String,
        /// Native error code.
        code: i32,
        /// Native error message.
        message: String,
    },

    /// An operation ran against a closed connection.
    #[error("database is closed")]
    AlreadyClosed,

    /// Statement compilation failed.
    #[error("prepare failed: {sql} (code {code}): {message}")]
    PrepareFailed {
        /// The failing SQL text.
        sql: String,
        /// Native error code.
        code: i32,
        /// Native error message.
        message: String,
    },

    /// Stepping a statement failed.
    #[error("step failed: {sql} (code {code}): {message}")]
    StepFailed {
        /// The failing SQL text.
        sql: String,
        /// Native error code.
        code: i32,
        /// Native error message.
        message: String,
    },

    /// Binding a statement parameter failed.
    #[error("bind failed at index {index}: {sql}: {message}")]
    BindFailed {
        /// The statement's SQL text.
        sql: String,
        /// The 1-based parameter index.
        index: usize,
        /// What went wrong.
        message: String,
    },

    /// A direct execute failed.
    #[error("execute failed: {sql} (code {code}): {message}")]
    ExecuteFailed {
        /// The failing SQL text.
        sql: String,
        /// Native error code.
        code: i32,
        /// Native error message.
        message: String,
    },

    /// The engine reported a uniqueness/not-null violation.
    #[error("constraint violation: {sql} (code {code}): {message}")]
    ConstraintViolation {
        /// The failing SQL text.
        sql: String,
        /// Native (extended) error code.
        code: i32,
        /// Native error message.
        message: String,
    },

    /// A transaction could not be opened.
    #[error("failed to begin transaction: {message}")]
    BeginFailed {
        /// The underlying failure.
        message: String,
    },

    /// A transaction could not be committed.
    #[error("failed to commit transaction: {message}")]
    CommitFailed {
        /// The underlying failure.
        message: String,
    },

    /// A column was read while no result row is current.
    #[error("no current row to read a column from")]
    NoCurrentRow,

    /// A column index outside the statement's result shape.
    #[error("column index {index} is out of range")]
    InvalidColumn {
        /// The offending 0-based index.
        index: usize,
    },
}

impl DriverError {
    /// Whether this error is the distinguished constraint-violation subtype.
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }
}

/// Pulls the native (extended) code and message out of a rusqlite error.
pub(crate) fn native_code_and_message(error: &rusqlite::Error) -> (i32, String) {
    match error {
        rusqlite::Error::SqliteFailure(native, message) => (
            native.extended_code,
            message
                .clone()
                .unwrap_or_else(|| native.to_string()),
        ),
        other => (-1, other.to_string()),
    }
}

pub(crate) fn is_native_constraint(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(native, _)
            if native.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Maps a rusqlite execution failure, distinguishing constraint violations.
pub(crate) fn execution_error(
    sql: &str,
    error: &rusqlite::Error,
    as_step: bool,
) -> DriverError {
    let (code, message) = native_code_and_message(error);
    if is_native_constraint(error) {
        DriverError::ConstraintViolation {
            sql: String::from(sql),
            code,
            message,
        }
    } else if as_step {
        DriverError::StepFailed {
            sql: String::from(sql),
            code,
            message,
        }
    } else {
        DriverError::ExecuteFailed {
            sql: String::from(sql),
            code,
            message,
        }
    }
}

pub(crate) fn prepare_error(sql: &str, error: &rusqlite::Error) -> DriverError {
    let (code, message) = native_code_and_message(error);
    DriverError::PrepareFailed {
        sql: String::from(sql),
        code,
        message,
    }
}
