//! # embersql-core
//!
//! Driver-free foundation of the embersql data-access layer.
//!
//! This crate turns a statically described entity into everything the
//! runtime needs to talk SQL about it:
//!
//! - [`extract`]: entity declarations ([`EntityDef`]) are normalized into an
//!   immutable [`TableDescriptor`] — the single source of truth for column
//!   order, primary key, and indexes.
//! - [`value`]: the [`SqlValue`] sum type over the SQLite storage classes,
//!   plus host-type conversions ([`ToSqlValue`]) and storage-class inference
//!   ([`ScalarKind`]).
//! - [`ddl`] / [`dml`]: exact `CREATE TABLE`/`CREATE INDEX` text and the
//!   parameterized CRUD/batch/paged statement templates ([`DmlTemplates`]).
//! - [`condition`]: the runtime condition tree compiled into a `WHERE`
//!   fragment plus positional arguments ([`Condition`], [`QuerySpec`]).
//!
//! Nothing in here performs I/O; execution lives in `embersql-sqlite` and
//! `embersql-orm`.

pub mod condition;
pub mod ddl;
pub mod descriptor;
pub mod dml;
mod error;
pub mod extract;
pub mod value;

pub use condition::{Column, CompareOp, Condition, Logic, QuerySpec};
pub use descriptor::{ColumnDescriptor, IndexDescriptor, TableDescriptor};
pub use dml::DmlTemplates;
pub use error::{QueryError, SchemaError};
pub use extract::{extract, extract_all, CompositeIndexDef, EntityDef, FieldDef};
pub use value::{ColumnType, ScalarKind, SqlValue, ToSqlValue};
