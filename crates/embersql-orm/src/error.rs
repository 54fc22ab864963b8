//! Unified error type for DAO and lifecycle operations.

use embersql_core::{QueryError, SchemaError};
use embersql_sqlite::DriverError;
use thiserror::Error;

/// Any failure surfaced by the data-access layer.
///
/// `Clone` so the migration manager's terminal `Failed` state can replay
/// the original open error to every later caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DbError {
    /// Schema metadata was invalid.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A query-builder call was invalid.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The driver or a statement failed.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// The persisted schema version is newer than the declared target.
    /// Raised before any statement touches a user table.
    #[error("database version mismatch: persisted {current} is newer than target {target}; downgrade is not supported")]
    DowngradeUnsupported {
        /// The persisted `user_version`.
        current: i32,
        /// The declared target version.
        target: i32,
    },
}

impl DbError {
    /// Whether the underlying failure is a constraint violation.
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Driver(e) if e.is_constraint_violation())
    }
}

/// Result type alias for data-access operations.
pub type Result<T> = std::result::Result<T, DbError>;
