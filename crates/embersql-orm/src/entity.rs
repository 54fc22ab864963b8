//! The entity contract.
//!
//! An entity supplies statically produced metadata plus the two value
//! conversions the DAO needs. There is no reflection anywhere: the
//! descriptor is built once (typically in a `Lazy` static) from an explicit
//! [`EntityDef`](embersql_core::EntityDef), and `to_values`/`from_row` are
//! plain hand-written (or build-time generated) code.

use embersql_core::{SqlValue, TableDescriptor};
use embersql_sqlite::{DriverError, SqlStatement};

/// A type mapped to one table.
///
/// Implementations must keep all three members consistent with each other:
/// `to_values` returns one value per descriptor column, in descriptor
/// order, and `from_row` reads columns 0..n in the same order. That order
/// is the only correlation between bind indexes and the SQL column list.
pub trait Entity: Clone + Send + 'static {
    /// The normalized table metadata for this entity.
    fn descriptor() -> &'static TableDescriptor;

    /// This instance's column values, in descriptor column order
    /// (primary key included).
    fn to_values(&self) -> Vec<SqlValue>;

    /// Reconstructs an instance from the statement's current row. Columns
    /// arrive in descriptor order at indexes `0..column_count`.
    ///
    /// # Errors
    ///
    /// Propagates column-read failures.
    fn from_row(stmt: &dyn SqlStatement) -> Result<Self, DriverError>;

    /// This instance's primary-key value.
    fn primary_key_value(&self) -> SqlValue {
        let mut values = self.to_values();
        values.swap_remove(Self::descriptor().primary_key)
    }
}
