//! DML statement templates.
//!
//! [`DmlTemplates`] precomputes every parameterized statement a DAO needs
//! for one table. All statements reference columns by name in declared
//! order — never `*` — so the bind order published in
//! [`insert_columns`](DmlTemplates::insert_columns) /
//! [`update_columns`](DmlTemplates::update_columns) is the only correlation
//! a caller needs.

use crate::descriptor::TableDescriptor;

/// Precompiled SQL templates for one table.
#[derive(Debug, Clone)]
pub struct DmlTemplates {
    /// Table name, kept for notifications.
    pub table_name: String,
    /// `INSERT INTO t (cols) VALUES (?, ...)`; the primary-key column is
    /// excluded when it is auto-generated.
    pub insert: String,
    /// `UPDATE t SET col = ?, ... WHERE pk = ?`.
    pub update: String,
    /// `DELETE FROM t WHERE pk = ?`.
    pub delete_by_pk: String,
    /// `SELECT cols FROM t`.
    pub select_all: String,
    /// `SELECT cols FROM t WHERE pk = ?`.
    pub select_by_pk: String,
    /// `SELECT 1 FROM t WHERE pk = ? LIMIT 1`.
    pub exists: String,
    /// `SELECT COUNT(*) FROM t`.
    pub count: String,
    /// `DELETE FROM t`.
    pub clear: String,
    /// `DROP TABLE IF EXISTS t`.
    pub drop: String,
    /// Column indexes (into the descriptor's column list) bound by `insert`,
    /// in bind order.
    pub insert_columns: Vec<usize>,
    /// Column indexes bound by the SET clause of `update`, in bind order.
    /// The primary key binds last, after these.
    pub update_columns: Vec<usize>,
    /// Column index of the primary key.
    pub primary_key: usize,
}

impl DmlTemplates {
    /// Compiles the template set for a table.
    #[must_use]
    pub fn new(table: &TableDescriptor) -> Self {
        let columns = table.column_list();
        let pk = &table.primary_key_column().name;

        let insert_columns: Vec<usize> = (0..table.columns.len())
            .filter(|&i| i != table.primary_key || !table.auto_generate)
            .collect();
        let update_columns: Vec<usize> = (0..table.columns.len())
            .filter(|&i| i != table.primary_key)
            .collect();

        let insert_list = insert_columns
            .iter()
            .map(|&i| table.columns[i].name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; insert_columns.len()].join(", ");
        let set_clause = update_columns
            .iter()
            .map(|&i| format!("{} = ?", table.columns[i].name))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            table_name: table.table_name.clone(),
            insert: format!(
                "INSERT INTO {} ({insert_list}) VALUES ({placeholders})",
                table.table_name
            ),
            update: format!(
                "UPDATE {} SET {set_clause} WHERE {pk} = ?",
                table.table_name
            ),
            delete_by_pk: format!("DELETE FROM {} WHERE {pk} = ?", table.table_name),
            select_all: format!("SELECT {columns} FROM {}", table.table_name),
            select_by_pk: format!(
                "SELECT {columns} FROM {} WHERE {pk} = ?",
                table.table_name
            ),
            exists: format!("SELECT 1 FROM {} WHERE {pk} = ? LIMIT 1", table.table_name),
            count: format!("SELECT COUNT(*) FROM {}", table.table_name),
            clear: format!("DELETE FROM {}", table.table_name),
            drop: format!("DROP TABLE IF EXISTS {}", table.table_name),
            insert_columns,
            update_columns,
            primary_key: table.primary_key,
        }
    }

    /// Builds a filtered count from a caller-supplied WHERE fragment.
    ///
    /// The fragment is trusted SQL; its values must be parameter-bound by
    /// the caller. An empty/blank fragment yields the plain count.
    #[must_use]
    pub fn count_filtered(&self, where_clause: &str) -> String {
        let mut sql = self.count.clone();
        if !where_clause.trim().is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(where_clause);
        }
        sql
    }

    /// Builds a paged/filtered select from a caller-supplied WHERE fragment
    /// plus optional ordering and paging.
    #[must_use]
    pub fn select_page(
        &self,
        where_clause: &str,
        order_by: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> String {
        let mut sql = self.select_all.clone();
        if !where_clause.trim().is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(where_clause);
        }
        if let Some(order_by) = order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        sql
    }
}
