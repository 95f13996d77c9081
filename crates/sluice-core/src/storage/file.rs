//! One JSON file per key inside a data directory.

use super::{BackendError, Storage, StorageError};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File-backed storage rooted at a directory.
///
/// Writes go to `<key>.json.tmp` first and are renamed over `<key>.json`, so
/// a crash mid-write leaves the previous payload intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn write_atomic(&self, path: &Path, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, path)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                key: key.to_string(),
                source: BackendError::Io { path, source },
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        tracing::trace!(path = %path.display(), bytes = value.len(), "writing storage key");
        self.write_atomic(&path, value)
            .map_err(|source| StorageError::Write {
                key: key.to_string(),
                source: BackendError::Io { path, source },
            })
    }
}
