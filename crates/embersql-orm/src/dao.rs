//! The generic data-access object.
//!
//! One `Dao<E>` per entity type implements the full CRUD/batch/ops surface
//! against the driver contract, using the statement templates compiled from
//! the entity's descriptor. Write operations fan out through the driver's
//! change-notification registry after they commit: `insert`, `clear_table`
//! and `drop_table` always notify, `update`/`delete` only when a row was
//! actually affected, and batch operations notify exactly once for the
//! whole batch.

use std::marker::PhantomData;
use std::sync::Arc;

use embersql_core::{ddl, DmlTemplates, SqlValue, ToSqlValue};
use embersql_sqlite::{DriverError, SqlDriver, SqlStatement, WorkerPool};

use crate::entity::Entity;
use crate::error::Result;
use crate::query::QueryBuilder;

/// Type-safe data access for one entity type.
pub struct Dao<E: Entity> {
    driver: Arc<dyn SqlDriver>,
    templates: DmlTemplates,
    _marker: PhantomData<E>,
}

impl<E: Entity> Clone for Dao<E> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            templates: self.templates.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E: Entity> Dao<E> {
    /// Creates a DAO over an open driver, compiling the entity's statement
    /// templates once.
    #[must_use]
    pub fn new(driver: Arc<dyn SqlDriver>) -> Self {
        Self {
            driver,
            templates: DmlTemplates::new(E::descriptor()),
            _marker: PhantomData,
        }
    }

    /// The underlying driver.
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn SqlDriver> {
        &self.driver
    }

    /// Creates the table and its indexes on an arbitrary driver. Used by
    /// schema `create` callbacks, which receive the driver by reference.
    /// Idempotent.
    pub fn init_table_on(driver: &dyn SqlDriver) -> Result<()> {
        for sql in ddl::create_statements(E::descriptor()) {
            driver.execute(&sql)?;
        }
        Ok(())
    }

    /// Creates the table and its indexes. Idempotent.
    pub fn init_table(&self) -> Result<()> {
        Self::init_table_on(self.driver.as_ref())
    }

    /// Inserts one row and returns the generated rowid. Always notifies.
    pub fn insert(&self, entity: &E) -> Result<i64> {
        let values = entity.to_values();
        let mut stmt = self.driver.prepare(&self.templates.insert)?;
        for (position, &column) in self.templates.insert_columns.iter().enumerate() {
            stmt.bind_value(position + 1, &values[column])?;
        }
        stmt.step()?;
        let id = self.driver.last_insert_id()?;
        self.driver.notify_listeners(&self.templates.table_name);
        Ok(id)
    }

    /// Updates the row matching the entity's primary key. Returns whether a
    /// row was affected; notifies only then.
    pub fn update(&self, entity: &E) -> Result<bool> {
        let values = entity.to_values();
        let mut stmt = self.driver.prepare(&self.templates.update)?;
        let mut position = 0;
        for &column in &self.templates.update_columns {
            position += 1;
            stmt.bind_value(position, &values[column])?;
        }
        stmt.bind_value(position + 1, &values[self.templates.primary_key])?;
        stmt.step()?;
        self.finish_conditional_write()
    }

    /// Deletes the row matching the entity's primary key.
    pub fn delete(&self, entity: &E) -> Result<bool> {
        self.delete_by_id(entity.primary_key_value())
    }

    /// Deletes the row with the given primary key. Returns whether a row
    /// was affected; notifies only then.
    pub fn delete_by_id(&self, id: impl ToSqlValue) -> Result<bool> {
        let mut stmt = self.driver.prepare(&self.templates.delete_by_pk)?;
        stmt.bind_value(1, &id.to_sql_value())?;
        stmt.step()?;
        self.finish_conditional_write()
    }

    /// Reads every row, in storage order.
    pub fn select_all(&self) -> Result<Vec<E>> {
        let mut stmt = self.driver.prepare(&self.templates.select_all)?;
        let mut rows = Vec::new();
        while stmt.step()? {
            rows.push(E::from_row(stmt.as_ref())?);
        }
        Ok(rows)
    }

    /// Reads the row with the given primary key.
    pub fn select_by_id(&self, id: impl ToSqlValue) -> Result<Option<E>> {
        let mut stmt = self.driver.prepare(&self.templates.select_by_pk)?;
        stmt.bind_value(1, &id.to_sql_value())?;
        if stmt.step()? {
            Ok(Some(E::from_row(stmt.as_ref())?))
        } else {
            Ok(None)
        }
    }

    /// Inserts every entity inside one transaction: one prepared statement,
    /// bind+step+reset per row, one commit, one notification. Any per-row
    /// failure rolls the whole batch back and re-raises — no partial
    /// visibility.
    pub fn batch_insert(&self, entities: &[E]) -> Result<()> {
        self.batch(&self.templates.insert, entities, |stmt, values| {
            for (position, &column) in self.templates.insert_columns.iter().enumerate() {
                stmt.bind_value(position + 1, &values[column])?;
            }
            Ok(())
        })
    }

    /// Updates every entity inside one transaction, with the same atomicity
    /// and notification semantics as [`batch_insert`](Self::batch_insert).
    pub fn batch_update(&self, entities: &[E]) -> Result<()> {
        self.batch(&self.templates.update, entities, |stmt, values| {
            let mut position = 0;
            for &column in &self.templates.update_columns {
                position += 1;
                stmt.bind_value(position, &values[column])?;
            }
            stmt.bind_value(position + 1, &values[self.templates.primary_key])
        })
    }

    /// Deletes every entity inside one transaction, with the same atomicity
    /// and notification semantics as [`batch_insert`](Self::batch_insert).
    pub fn batch_delete(&self, entities: &[E]) -> Result<()> {
        self.batch(&self.templates.delete_by_pk, entities, |stmt, values| {
            stmt.bind_value(1, &values[self.templates.primary_key])
        })
    }

    /// Counts all rows.
    pub fn count(&self) -> Result<i64> {
        let mut stmt = self.driver.prepare(&self.templates.count)?;
        Ok(if stmt.step()? { stmt.column_long(0)? } else { 0 })
    }

    /// Counts rows matching a caller-trusted WHERE fragment with
    /// parameter-bound values. An empty fragment counts everything.
    pub fn count_where(&self, where_clause: &str, args: &[SqlValue]) -> Result<i64> {
        let sql = self.templates.count_filtered(where_clause);
        let mut stmt = self.driver.prepare(&sql)?;
        bind_positional(stmt.as_mut(), args)?;
        Ok(if stmt.step()? { stmt.column_long(0)? } else { 0 })
    }

    /// Whether a row with the given primary key exists.
    pub fn exists(&self, id: impl ToSqlValue) -> Result<bool> {
        let mut stmt = self.driver.prepare(&self.templates.exists)?;
        stmt.bind_value(1, &id.to_sql_value())?;
        Ok(stmt.step()?)
    }

    /// Deletes every row. Always notifies.
    pub fn clear_table(&self) -> Result<()> {
        self.driver.execute(&self.templates.clear)?;
        self.driver.notify_listeners(&self.templates.table_name);
        Ok(())
    }

    /// Drops the table. Always notifies.
    pub fn drop_table(&self) -> Result<()> {
        self.driver.execute(&self.templates.drop)?;
        self.driver.notify_listeners(&self.templates.table_name);
        Ok(())
    }

    /// Reads a filtered/ordered/paged slice of the table. The WHERE
    /// fragment is caller-trusted SQL; its values are always bound
    /// positionally.
    pub fn select_by_page(
        &self,
        where_clause: &str,
        args: &[SqlValue],
        order_by: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<E>> {
        let sql = self
            .templates
            .select_page(where_clause, order_by, limit, offset);
        let mut stmt = self.driver.prepare(&sql)?;
        bind_positional(stmt.as_mut(), args)?;
        let mut rows = Vec::new();
        while stmt.step()? {
            rows.push(E::from_row(stmt.as_ref())?);
        }
        Ok(rows)
    }

    /// Starts a query against this table.
    #[must_use]
    pub fn select(&self) -> QueryBuilder<'_, E> {
        QueryBuilder::new(self)
    }

    /// Runs [`insert`](Self::insert) on the shared worker pool and hands
    /// the result to `callback` on the pool thread.
    pub fn insert_async<C>(&self, entity: E, callback: C)
    where
        C: FnOnce(Result<i64>) + Send + 'static,
    {
        let dao = self.clone();
        WorkerPool::global().execute(move || dao.insert(&entity), callback);
    }

    /// Runs [`update`](Self::update) on the shared worker pool.
    pub fn update_async<C>(&self, entity: E, callback: C)
    where
        C: FnOnce(Result<bool>) + Send + 'static,
    {
        let dao = self.clone();
        WorkerPool::global().execute(move || dao.update(&entity), callback);
    }

    /// Runs [`delete`](Self::delete) on the shared worker pool.
    pub fn delete_async<C>(&self, entity: E, callback: C)
    where
        C: FnOnce(Result<bool>) + Send + 'static,
    {
        let dao = self.clone();
        WorkerPool::global().execute(move || dao.delete(&entity), callback);
    }

    /// Shared tail of `update`/`delete`: report and notify only when the
    /// write affected at least one row.
    fn finish_conditional_write(&self) -> Result<bool> {
        let changed = self.driver.changes()? > 0;
        if changed {
            self.driver.notify_listeners(&self.templates.table_name);
        }
        Ok(changed)
    }

    fn batch<F>(&self, sql: &str, entities: &[E], bind: F) -> Result<()>
    where
        F: Fn(&mut dyn SqlStatement, &[SqlValue]) -> std::result::Result<(), DriverError>,
    {
        if entities.is_empty() {
            return Ok(());
        }
        self.driver.begin_transaction()?;
        let outcome = (|| -> Result<()> {
            let mut stmt = self.driver.prepare(sql)?;
            for entity in entities {
                let values = entity.to_values();
                bind(stmt.as_mut(), &values)?;
                stmt.step()?;
                stmt.reset();
            }
            Ok(())
        })();
        match outcome {
            Ok(()) => {
                if let Err(e) = self.driver.end_transaction() {
                    self.driver.rollback_transaction();
                    return Err(e.into());
                }
                self.driver.notify_listeners(&self.templates.table_name);
                Ok(())
            }
            Err(e) => {
                self.driver.rollback_transaction();
                Err(e)
            }
        }
    }
}

fn bind_positional(
    stmt: &mut dyn SqlStatement,
    args: &[SqlValue],
) -> std::result::Result<(), DriverError> {
    for (i, value) in args.iter().enumerate() {
        stmt.bind_value(i + 1, value)?;
    }
    Ok(())
}
