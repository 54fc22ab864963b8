//! Versioned schema lifecycle.
//!
//! The manager owns the lazy connection: the first `driver()` call opens
//! the database, runs the version-gated create/migrate transition inside a
//! transaction, persists the new `user_version`, fires the lifecycle
//! callbacks, and memoizes the connection. Any failure during that sequence
//! closes the partially opened connection and leaves the manager in a
//! terminal failed state — later calls replay the same error instead of
//! retrying.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use embersql_sqlite::{SqlDriver, SqlDriverExt, SqliteDriver};

use crate::error::{DbError, Result};

/// Declares a schema: its target version, how to create it from scratch,
/// and how to migrate an older database up to it.
pub trait SqlSchema: Send + Sync {
    /// The declared target version. A fresh database persists this after
    /// `create`.
    fn version(&self) -> i32;

    /// Creates all tables/indexes. Runs inside one transaction on a
    /// version-0 database; typically calls `Dao::init_table_on` per entity.
    fn create(&self, driver: &dyn SqlDriver) -> Result<()>;

    /// Migrates from `old_version` up to `new_version`. Runs inside one
    /// transaction.
    fn migrate(&self, driver: &dyn SqlDriver, old_version: i32, new_version: i32) -> Result<()>;
}

/// Lifecycle hooks fired after the corresponding transition commits.
pub trait DatabaseCallback: Send + Sync {
    /// After a fresh database was created.
    fn on_create(&self, driver: &dyn SqlDriver) {
        let _ = driver;
    }

    /// After an older database was migrated.
    fn on_upgrade(&self, driver: &dyn SqlDriver, old_version: i32, new_version: i32) {
        let _ = (driver, old_version, new_version);
    }

    /// After every connection establishment, whatever the transition was.
    fn on_open(&self, driver: &dyn SqlDriver) {
        let _ = driver;
    }
}

enum ConnectionState {
    Unopened,
    Open(Arc<SqliteDriver>),
    Failed(DbError),
}

/// Owns the lazy, memoized, version-gated database connection.
pub struct DatabaseManager {
    path: PathBuf,
    schema: Box<dyn SqlSchema>,
    callback: Option<Box<dyn DatabaseCallback>>,
    state: Mutex<ConnectionState>,
}

impl DatabaseManager {
    /// Creates a manager for the database file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, schema: impl SqlSchema + 'static) -> Self {
        Self {
            path: path.into(),
            schema: Box::new(schema),
            callback: None,
            state: Mutex::new(ConnectionState::Unopened),
        }
    }

    /// Attaches lifecycle callbacks.
    #[must_use]
    pub fn with_callback(mut self, callback: impl DatabaseCallback + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Returns the open driver, running the full open→transition sequence
    /// exactly once on first access.
    ///
    /// # Errors
    ///
    /// Whatever the open sequence failed with — including
    /// [`DbError::DowngradeUnsupported`] — both on the failing call and on
    /// every call after it.
    pub fn driver(&self) -> Result<Arc<dyn SqlDriver>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            ConnectionState::Open(driver) => {
                let driver: Arc<dyn SqlDriver> = driver.clone();
                return Ok(driver);
            }
            ConnectionState::Failed(error) => return Err(error.clone()),
            ConnectionState::Unopened => {}
        }
        match self.open_and_init() {
            Ok(driver) => {
                *state = ConnectionState::Open(Arc::clone(&driver));
                let driver: Arc<dyn SqlDriver> = driver;
                Ok(driver)
            }
            Err(error) => {
                *state = ConnectionState::Failed(error.clone());
                Err(error)
            }
        }
    }

    /// Closes the connection if it was opened. Idempotent; an unopened or
    /// failed manager is left untouched.
    pub fn close(&self) {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let ConnectionState::Open(driver) = &*state {
            driver.close();
        }
    }

    fn open_and_init(&self) -> Result<Arc<SqliteDriver>> {
        let driver = Arc::new(SqliteDriver::open(&self.path)?);
        if let Err(error) = self.run_version_transition(driver.as_ref()) {
            tracing::error!(error = %error, "database initialization failed");
            driver.close();
            return Err(error);
        }
        Ok(driver)
    }

    fn run_version_transition(&self, driver: &SqliteDriver) -> Result<()> {
        let current = read_user_version(driver)?;
        let target = self.schema.version();
        tracing::info!(
            path = %self.path.display(),
            current,
            target,
            "initializing database"
        );

        if current == 0 {
            tracing::info!(target, "creating database");
            driver.transaction(|| {
                self.schema.create(driver)?;
                set_user_version(driver, target)
            })?;
            if let Some(callback) = &self.callback {
                callback.on_create(driver);
            }
        } else if current < target {
            tracing::info!(current, target, "upgrading database");
            driver.transaction(|| {
                self.schema.migrate(driver, current, target)?;
                set_user_version(driver, target)
            })?;
            if let Some(callback) = &self.callback {
                callback.on_upgrade(driver, current, target);
            }
        } else if current > target {
            return Err(DbError::DowngradeUnsupported { current, target });
        }

        if let Some(callback) = &self.callback {
            callback.on_open(driver);
        }
        Ok(())
    }
}

fn read_user_version(driver: &dyn SqlDriver) -> Result<i32> {
    let mut stmt = driver.prepare("PRAGMA user_version")?;
    Ok(if stmt.step()? {
        stmt.column_long(0)? as i32
    } else {
        0
    })
}

fn set_user_version(driver: &dyn SqlDriver, version: i32) -> Result<()> {
    driver.execute(&format!("PRAGMA user_version = {version}"))?;
    Ok(())
}
