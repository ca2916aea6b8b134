//! `SQLite` database connection and operations.
//!
//! The database is stored at `<root>/contentops.db` and contains tables for:
//! - Automation rules
//! - Content templates
//! - Generated social posts and newsletter campaigns
//!
//! The connection sits behind a mutex so repositories can be shared across
//! async tasks. The async repository impls run their queries on the blocking
//! pool; callers must not hold the guard across an `.await`.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::error::ContentOpsError;

use super::migrations;

/// Database connection wrapper.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at a specific path.
    ///
    /// Creates the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &std::path::Path) -> Result<Self, ContentOpsError> {
        let conn = Connection::open(path).map_err(|e| {
            ContentOpsError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;

        Self::init(conn)
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_in_memory() -> Result<Self, ContentOpsError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            ContentOpsError::Database(format!("Failed to open in-memory database: {e}"))
        })?;

        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, ContentOpsError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| ContentOpsError::Database(format!("Failed to enable foreign keys: {e}")))?;

        migrations::run(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, ContentOpsError> {
        migrations::get_version(&*self.connection()?)
    }

    /// Lock the underlying connection.
    ///
    /// # Errors
    ///
    /// Returns an error if a previous holder panicked while holding the lock.
    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>, ContentOpsError> {
        self.conn
            .lock()
            .map_err(|_| ContentOpsError::Database("Database connection lock poisoned".to_string()))
    }
}

/// Wrap a column decoding failure as a rusqlite error.
pub(crate) fn column_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

/// Decode an RFC 3339 timestamp column.
pub(crate) fn parse_timestamp(idx: usize, value: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| column_error(idx, e))
}
