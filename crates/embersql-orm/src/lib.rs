//! # embersql-orm
//!
//! Type-safe data access over the embersql driver contract.
//!
//! This crate provides:
//! - [`Entity`]: the statically described mapping between a Rust type and
//!   one table (descriptor + value conversions, no reflection)
//! - [`Dao`]: the generated-DAO surface — CRUD, batch operations with
//!   all-or-nothing transactions, counts/exists, paging, and fire-and-forget
//!   async variants
//! - [`QueryBuilder`]: the condition-tree DSL terminals
//! - [`DatabaseManager`]: the lazy, version-gated create/migrate lifecycle
//!
//! ## Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use embersql_orm::{Dao, DatabaseManager, SqlSchema};
//!
//! struct AppSchema;
//!
//! impl SqlSchema for AppSchema {
//!     fn version(&self) -> i32 { 1 }
//!
//!     fn create(&self, driver: &dyn embersql_sqlite::SqlDriver) -> embersql_orm::Result<()> {
//!         Dao::<User>::init_table_on(driver)
//!     }
//!
//!     fn migrate(&self, _: &dyn embersql_sqlite::SqlDriver, _: i32, _: i32) -> embersql_orm::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let manager = DatabaseManager::new("app.db", AppSchema);
//! let users: Dao<User> = Dao::new(manager.driver()?);
//!
//! let id = users.insert(&User { id: 0, name: "alice".into(), age: 30 })?;
//! let adults = users
//!     .select()
//!     .and_where(UserTable::AGE.ge(18))
//!     .order_by(UserTable::NAME, true)?
//!     .limit(20)?
//!     .find()?;
//! ```

pub mod dao;
pub mod entity;
mod error;
pub mod manager;
pub mod query;

pub use dao::Dao;
pub use entity::Entity;
pub use error::{DbError, Result};
pub use manager::{DatabaseCallback, DatabaseManager, SqlSchema};
pub use query::QueryBuilder;

// Re-export the types entity declarations and queries are written with.
pub use embersql_core::{
    extract, Column, ColumnType, CompositeIndexDef, Condition, EntityDef, FieldDef, QuerySpec,
    ScalarKind, SqlValue, TableDescriptor, ToSqlValue,
};
pub use embersql_sqlite::{
    read_column, ListenerId, SqlDriver, SqlDriverExt, SqlStatement, SqliteDriver, TableListener,
    WorkerPool,
};
