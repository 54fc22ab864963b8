//! # embersql-sqlite
//!
//! The runtime side of embersql: a connection/prepared-statement contract
//! ([`SqlDriver`] / [`SqlStatement`]) that generated data-access code is
//! written against, its bundled-SQLite implementation ([`SqliteDriver`]),
//! the per-table change-notification registry, and the background worker
//! pool used by fire-and-forget operations.
//!
//! The contract mirrors the SQLite C API shape — 1-based parameter binding,
//! `step()` per row, 0-based column reads, `reset()` for reuse — while the
//! implementation stays in safe Rust: the single underlying connection is
//! lock-guarded, statements compile eagerly at [`SqlDriver::prepare`] and
//! execute through the connection's statement cache, and every statement is
//! released on every exit path via `Drop`.

pub mod connection;
pub mod driver;
mod error;
pub mod listener;
pub mod statement;
pub mod worker;

pub use connection::SqliteDriver;
pub use driver::{read_column, ListenerId, SqlDriver, SqlDriverExt, SqlStatement, TableListener};
pub use error::DriverError;
pub use listener::ListenerRegistry;
pub use worker::WorkerPool;
