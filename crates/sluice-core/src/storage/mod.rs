//! Durable key-value storage backing the complaint store.
//!
//! The store only ever touches one key, so the contract is deliberately
//! tiny: read the text stored under a key (or learn it is absent) and
//! overwrite it. Each `set` replaces the whole value; readers never observe a
//! partially written payload.

pub mod file;
pub mod sqlite;

use crate::error::ErrorCode;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

pub use file::FileStorage;
pub use sqlite::SqliteStorage;

/// Errors raised by a storage backend, tagged with the direction that failed.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read key '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: BackendError,
    },

    #[error("failed to write key '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: BackendError,
    },
}

impl StorageError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::StorageReadFailed,
            Self::Write { .. } => ErrorCode::StorageWriteFailed,
        }
    }
}

/// The backend-specific cause of a [`StorageError`].
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// A simple text key-value store.
pub trait Storage {
    /// Return the text stored under `key`, or `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the text stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Process-local storage. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a key directly, bypassing any store.
    #[must_use]
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
