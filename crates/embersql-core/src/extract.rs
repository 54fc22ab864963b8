//! Entity declarations and metadata extraction.
//!
//! An [`EntityDef`] is the statically constructed description of one entity:
//! ordered fields with their per-field options, plus class-level composite
//! indexes. [`extract`] normalizes it into a [`TableDescriptor`], enforcing
//! the descriptor invariants. The runtime never inspects entity types
//! reflectively; this declaration is the whole input surface.

use std::collections::HashSet;

use crate::descriptor::{ColumnDescriptor, IndexDescriptor, TableDescriptor};
use crate::error::SchemaError;
use crate::value::{ColumnType, ScalarKind};

/// Declaration of one entity: ordered fields plus composite indexes.
#[derive(Debug, Clone)]
pub struct EntityDef {
    name: String,
    table_name: Option<String>,
    fields: Vec<FieldDef>,
    composite_indexes: Vec<CompositeIndexDef>,
}

impl EntityDef {
    /// Starts a declaration for the entity with the given name.
    ///
    /// The table name defaults to the entity name unless overridden with
    /// [`table_name`](Self::table_name).
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: None,
            fields: Vec::new(),
            composite_indexes: Vec::new(),
        }
    }

    /// Overrides the SQL table name.
    #[must_use]
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    /// Appends a field. Declaration order is significant: it fixes the
    /// column order, the bind order and the row-parsing order.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Declares a single composite index.
    #[must_use]
    pub fn composite_index(mut self, index: CompositeIndexDef) -> Self {
        self.composite_indexes.push(index);
        self
    }

    /// Declares several composite indexes at once. Both this container form
    /// and the singular [`composite_index`](Self::composite_index) form are
    /// accepted and merged into one flat list.
    #[must_use]
    pub fn composite_indexes(
        mut self,
        indexes: impl IntoIterator<Item = CompositeIndexDef>,
    ) -> Self {
        self.composite_indexes.extend(indexes);
        self
    }

    /// Returns the entity name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Declaration of one entity field.
#[derive(Debug, Clone)]
pub struct FieldDef {
    name: String,
    kind: ScalarKind,
    ignored: bool,
    primary_key: bool,
    auto_generate: bool,
    column_name: Option<String>,
    default_value: Option<String>,
    not_null: bool,
    type_override: Option<ColumnType>,
    index: Option<FieldIndex>,
}

#[derive(Debug, Clone)]
struct FieldIndex {
    name: Option<String>,
    unique: bool,
}

impl FieldDef {
    /// Starts a field declaration with the given name and host kind.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ignored: false,
            primary_key: false,
            auto_generate: false,
            column_name: None,
            default_value: None,
            not_null: false,
            type_override: None,
            index: None,
        }
    }

    /// Excludes this field from the mapping entirely: it appears in no DDL,
    /// no bind order and no row parsing.
    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// Marks this field as the primary key. With `auto_generate`, inserts
    /// omit the column and the engine assigns the value.
    #[must_use]
    pub fn primary_key(mut self, auto_generate: bool) -> Self {
        self.primary_key = true;
        self.auto_generate = auto_generate;
        self
    }

    /// Overrides the SQL column name (defaults to the field name).
    #[must_use]
    pub fn column_name(mut self, name: impl Into<String>) -> Self {
        self.column_name = Some(name.into());
        self
    }

    /// Declares a raw SQL default-value literal.
    #[must_use]
    pub fn default_value(mut self, literal: impl Into<String>) -> Self {
        self.default_value = Some(literal.into());
        self
    }

    /// Adds a `NOT NULL` constraint.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Overrides the inferred storage class.
    #[must_use]
    pub fn column_type(mut self, column_type: ColumnType) -> Self {
        self.type_override = Some(column_type);
        self
    }

    /// Declares a single-column index on this field, named
    /// `idx_<table>_<column>`.
    #[must_use]
    pub fn indexed(mut self, unique: bool) -> Self {
        self.index = Some(FieldIndex { name: None, unique });
        self
    }

    /// Declares a single-column index with an explicit name.
    #[must_use]
    pub fn indexed_named(mut self, name: impl Into<String>, unique: bool) -> Self {
        self.index = Some(FieldIndex {
            name: Some(name.into()),
            unique,
        });
        self
    }
}

/// Declaration of a composite index over several columns.
///
/// Columns are referenced by their SQL column names, not field names.
#[derive(Debug, Clone)]
pub struct CompositeIndexDef {
    name: String,
    columns: Vec<String>,
    unique: bool,
}

impl CompositeIndexDef {
    /// Declares a composite index with the given name over the given columns.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    /// Makes this a UNIQUE index.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Normalizes one entity declaration into a [`TableDescriptor`].
///
/// # Errors
///
/// Returns a [`SchemaError`] when the declaration has no (or more than one)
/// primary key, duplicate column names, or an index referencing an
/// undeclared column.
pub fn extract(def: &EntityDef) -> Result<TableDescriptor, SchemaError> {
    let table_name = def
        .table_name
        .clone()
        .unwrap_or_else(|| def.name.clone());

    let mut columns = Vec::new();
    let mut indexes = Vec::new();
    let mut primary_key: Option<usize> = None;
    let mut auto_generate = false;
    let mut seen = HashSet::new();

    for field in &def.fields {
        if field.ignored {
            continue;
        }

        let column_name = field
            .column_name
            .clone()
            .unwrap_or_else(|| field.name.clone());

        if !seen.insert(column_name.clone()) {
            return Err(SchemaError::DuplicateColumn {
                entity: def.name.clone(),
                column: column_name,
            });
        }

        if field.primary_key {
            if primary_key.is_some() {
                return Err(SchemaError::MultiplePrimaryKeys {
                    entity: def.name.clone(),
                });
            }
            primary_key = Some(columns.len());
            auto_generate = field.auto_generate;
        }

        if let Some(index) = &field.index {
            let name = index
                .name
                .clone()
                .unwrap_or_else(|| format!("idx_{table_name}_{column_name}"));
            indexes.push(IndexDescriptor {
                name,
                columns: vec![column_name.clone()],
                unique: index.unique,
            });
        }

        columns.push(ColumnDescriptor {
            name: column_name,
            kind: field.kind,
            type_override: field.type_override,
            not_null: field.not_null,
            default_value: field.default_value.clone(),
        });
    }

    let primary_key = primary_key.ok_or_else(|| SchemaError::MissingPrimaryKey {
        entity: def.name.clone(),
    })?;

    for composite in &def.composite_indexes {
        indexes.push(IndexDescriptor {
            name: composite.name.clone(),
            columns: composite.columns.clone(),
            unique: composite.unique,
        });
    }

    for index in &indexes {
        for column in &index.columns {
            if !seen.contains(column) {
                return Err(SchemaError::InvalidIndexDefinition {
                    entity: def.name.clone(),
                    index: index.name.clone(),
                    column: column.clone(),
                });
            }
        }
    }

    Ok(TableDescriptor {
        table_name,
        columns,
        primary_key,
        auto_generate,
        indexes,
    })
}

/// Extracts every declaration, skipping the ones that fail.
///
/// A failed entity never blocks the others: its error is collected and the
/// remaining declarations still compile.
#[must_use]
pub fn extract_all(defs: &[EntityDef]) -> (Vec<TableDescriptor>, Vec<SchemaError>) {
    let mut tables = Vec::new();
    let mut errors = Vec::new();
    for def in defs {
        match extract(def) {
            Ok(table) => tables.push(table),
            Err(e) => errors.push(e),
        }
    }
    (tables, errors)
}
