//! Database layer for pharmafind.
//!
//! The record store keeps a single JSON document in SQLite. Callers go
//! through [`RecordStore`], which never fails: unreadable state loads as
//! empty and failed writes are logged.

mod schema;
mod state;

pub use schema::*;
pub use state::*;

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database layout version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: i64, supported: i64 },
}

pub type DbResult<T> = Result<T, DbError>;

/// SQLite connection holding the state document.
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Open the store file at `path`, creating it and its parent directory
    /// if needed. File stores run in WAL mode.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        db.initialize()?;
        tracing::debug!(path = %path.display(), "opened record store");
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        db.initialize()?;
        Ok(db)
    }

    /// Refuse files written by a newer layout, then apply the schema.
    fn initialize(&self) -> DbResult<()> {
        let found = self.schema_version()?;
        if found > SCHEMA_VERSION {
            return Err(DbError::UnsupportedVersion {
                found,
                supported: SCHEMA_VERSION,
            });
        }
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Layout version recorded in the file (0 for a fresh file).
    pub fn schema_version(&self) -> DbResult<i64> {
        Ok(self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?)
    }

    /// Backing file, or None for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
