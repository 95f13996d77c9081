//! SQLite-backed key-value storage.
//!
//! Runtime defaults follow the other on-disk databases:
//! - `journal_mode = WAL` so a reader never sees a half-applied write
//! - `busy_timeout = 5s` to ride out a concurrent `sluice` process

use super::{BackendError, Storage, StorageError};
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::{path::Path, time::Duration};

/// Busy timeout used for storage connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS kv (
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL,
  updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
);
";

#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the storage database and ensure the schema exists.
    ///
    /// # Errors
    ///
    /// Returns an error if opening or configuring the database fails.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create storage directory {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("open storage database {}", path.display()))?;
        configure_connection(&conn).context("configure sqlite pragmas")?;
        conn.execute_batch(SCHEMA).context("create kv table")?;

        Ok(Self { conn })
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory storage")?;
        conn.execute_batch(SCHEMA).context("create kv table")?;
        Ok(Self { conn })
    }
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|source| StorageError::Read {
                key: key.to_string(),
                source: BackendError::Sqlite(source),
            })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                r"
                INSERT INTO kv (key, value) VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = strftime('%Y-%m-%dT%H:%M:%fZ','now')
                ",
                params![key, value],
            )
            .map(|_| ())
            .map_err(|source| StorageError::Write {
                key: key.to_string(),
                source: BackendError::Sqlite(source),
            })
    }
}
