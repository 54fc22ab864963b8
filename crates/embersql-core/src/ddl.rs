//! DDL generation.
//!
//! Emits the exact `CREATE TABLE` / `CREATE INDEX` / `DROP TABLE` text for a
//! [`TableDescriptor`]. Everything carries `IF NOT EXISTS` / `IF EXISTS`
//! semantics so schema creation is idempotent.

use std::fmt::Write as _;

use crate::descriptor::{IndexDescriptor, TableDescriptor};
use crate::value::ColumnType;

/// Builds the `CREATE TABLE IF NOT EXISTS` statement for a table.
#[must_use]
pub fn create_table_sql(table: &TableDescriptor) -> String {
    let mut defs = Vec::with_capacity(table.columns.len());
    for (i, column) in table.columns.iter().enumerate() {
        let storage = column.storage_class();
        let mut def = format!("{} {}", column.name, storage.as_sql());
        if i == table.primary_key {
            if table.auto_generate {
                def.push_str(" PRIMARY KEY AUTOINCREMENT");
            } else {
                def.push_str(" PRIMARY KEY");
            }
        } else {
            if column.not_null {
                def.push_str(" NOT NULL");
            }
            if let Some(literal) = &column.default_value {
                let _ = write!(def, " DEFAULT {}", render_default(storage, literal));
            }
        }
        defs.push(def);
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        table.table_name,
        defs.join(", ")
    )
}

/// Builds one `CREATE INDEX IF NOT EXISTS` statement.
#[must_use]
pub fn create_index_sql(table_name: &str, index: &IndexDescriptor) -> String {
    let unique = if index.unique { "UNIQUE " } else { "" };
    format!(
        "CREATE {unique}INDEX IF NOT EXISTS {} ON {table_name} ({})",
        index.name,
        index.columns.join(", ")
    )
}

/// Builds the full idempotent creation sequence: the table, then one
/// statement per index in declaration order.
#[must_use]
pub fn create_statements(table: &TableDescriptor) -> Vec<String> {
    let mut statements = vec![create_table_sql(table)];
    for index in &table.indexes {
        statements.push(create_index_sql(&table.table_name, index));
    }
    statements
}

/// Builds the `DROP TABLE IF EXISTS` statement.
#[must_use]
pub fn drop_table_sql(table: &TableDescriptor) -> String {
    format!("DROP TABLE IF EXISTS {}", table.table_name)
}

/// Renders a default-value literal.
///
/// The literal is quoted as a string only when the storage class is TEXT and
/// the value is neither the `CURRENT_TIMESTAMP`/`NULL` keyword nor already
/// quoted; in every other case it is emitted verbatim. The decision depends
/// on the resolved storage class alone, never on the host kind.
fn render_default(storage: ColumnType, literal: &str) -> String {
    let is_keyword = literal.eq_ignore_ascii_case("CURRENT_TIMESTAMP")
        || literal.eq_ignore_ascii_case("NULL");
    if storage == ColumnType::Text && !is_keyword && !literal.starts_with('\'') {
        format!("'{literal}'")
    } else {
        String::from(literal)
    }
}
