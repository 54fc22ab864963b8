//! Schema and query-builder errors.

use thiserror::Error;

/// Errors detected while normalizing an entity declaration, or while gating
/// a migration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The entity declares no primary-key field.
    #[error("entity '{entity}' has no primary key field")]
    MissingPrimaryKey {
        /// Entity name.
        entity: String,
    },

    /// The entity declares more than one primary-key field.
    #[error("entity '{entity}' declares more than one primary key field")]
    MultiplePrimaryKeys {
        /// Entity name.
        entity: String,
    },

    /// Two fields map to the same column name.
    #[error("entity '{entity}' declares duplicate column '{column}'")]
    DuplicateColumn {
        /// Entity name.
        entity: String,
        /// The duplicated column name.
        column: String,
    },

    /// An index references a column that is not declared on the table.
    #[error("index '{index}' on entity '{entity}' references unknown column '{column}'")]
    InvalidIndexDefinition {
        /// Entity name.
        entity: String,
        /// Index name.
        index: String,
        /// The undeclared column name.
        column: String,
    },
}

/// Errors raised synchronously by query-builder calls, before any SQL is
/// generated or sent to a driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// An order-by target whose rendered name is not a plain identifier.
    /// Order-by targets cannot be parameter-bound, so anything outside
    /// `[A-Za-z0-9_]+` is rejected outright.
    #[error("invalid order-by column name: {name:?}")]
    InvalidOrderByColumn {
        /// The offending rendered name.
        name: String,
    },

    /// A negative limit.
    #[error("limit must be >= 0, got {value}")]
    NegativeLimit {
        /// The offending value.
        value: i64,
    },

    /// A negative offset.
    #[error("offset must be >= 0, got {value}")]
    NegativeOffset {
        /// The offending value.
        value: i64,
    },
}
