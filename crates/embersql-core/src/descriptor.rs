//! Normalized table metadata.
//!
//! A [`TableDescriptor`] is produced once per entity by the extractor and is
//! the sole source of truth for both DDL and DML generation. Column order
//! equals declared field order (ignored fields excluded) and is never
//! re-sorted: it is the only correlation between bind indexes and the SQL
//! column list.

use crate::value::{ColumnType, ScalarKind};

/// Immutable schema metadata for one entity/table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    /// SQL table name.
    pub table_name: String,
    /// Declared columns, in field-declaration order.
    pub columns: Vec<ColumnDescriptor>,
    /// Index into `columns` of the primary-key column.
    pub primary_key: usize,
    /// Whether the primary key is auto-generated (`AUTOINCREMENT`).
    pub auto_generate: bool,
    /// Single-column and composite indexes, merged into one flat list.
    pub indexes: Vec<IndexDescriptor>,
}

impl TableDescriptor {
    /// Returns the primary-key column.
    #[must_use]
    pub fn primary_key_column(&self) -> &ColumnDescriptor {
        &self.columns[self.primary_key]
    }

    /// Looks up a declared column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the declared column names, joined for a SQL column list.
    #[must_use]
    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Metadata for one declared column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// SQL column name.
    pub name: String,
    /// Host scalar kind of the backing field.
    pub kind: ScalarKind,
    /// Explicit storage-class override, if declared.
    pub type_override: Option<ColumnType>,
    /// Whether the column carries `NOT NULL`.
    pub not_null: bool,
    /// Raw default-value literal, if declared. Quoting is decided by the
    /// resolved storage class at DDL time, not by the host kind.
    pub default_value: Option<String>,
}

impl ColumnDescriptor {
    /// Resolves the storage class: the explicit override if present,
    /// otherwise the kind's default inference.
    #[must_use]
    pub fn storage_class(&self) -> ColumnType {
        self.type_override.unwrap_or_else(|| self.kind.storage_class())
    }
}

/// Metadata for one index, single-column or composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescriptor {
    /// Index name (explicit, or derived `idx_<table>_<column>`).
    pub name: String,
    /// Ordered indexed column names.
    pub columns: Vec<String>,
    /// Whether this is a UNIQUE index.
    pub unique: bool,
}
