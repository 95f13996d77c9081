//! Everything a command needs before it can touch complaints: the data
//! directory, its config, the backing store and the notifier.

use crate::notify::HttpSmsNotifier;
use crate::output::{CliError, OutputMode, render_error};
use anyhow::Context as _;
use sluice_core::config::{self, SluiceConfig, StorageBackend};
use sluice_core::error::ErrorCode;
use sluice_core::notify::{LogNotifier, Notifier};
use sluice_core::storage::{FileStorage, SqliteStorage, Storage};
use sluice_core::store::{ComplaintStore, LoadOutcome};
use std::fmt;
use std::path::{Path, PathBuf};

/// SQLite database file name inside the data directory.
pub const DB_FILE: &str = "sluice.db";

/// Store type shared by all commands; the backend is picked from config.
pub type Store = ComplaintStore<Box<dyn Storage>>;

/// Marker for an error that has already been rendered to the user.
#[derive(Debug)]
pub struct Reported(pub String);

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Reported {}

/// Render `error` and return it as an already-reported failure.
pub fn fail(output: OutputMode, error: &CliError) -> anyhow::Error {
    render_error(output, error).ok();
    anyhow::Error::new(Reported(error.message.clone()))
}

#[derive(Debug)]
pub struct Workspace {
    data_dir: PathBuf,
    config: SluiceConfig,
    output: OutputMode,
}

impl Workspace {
    /// Resolve the data directory and load its config.
    pub fn open(data_dir_flag: Option<&Path>, output: OutputMode) -> anyhow::Result<Self> {
        let data_dir = config::resolve_data_dir(data_dir_flag);
        let config = config::load_config(&data_dir).map_err(|err| {
            fail(
                output,
                &CliError::coded(ErrorCode::ConfigParseError, format!("{err:#}")),
            )
        })?;
        tracing::debug!(data_dir = %data_dir.display(), backend = %config.storage.backend, "workspace opened");
        Ok(Self {
            data_dir,
            config,
            output,
        })
    }

    pub const fn config(&self) -> &SluiceConfig {
        &self.config
    }

    /// Open the complaint store on the configured backend.
    pub fn open_store(&self) -> anyhow::Result<Store> {
        std::fs::create_dir_all(&self.data_dir).map_err(|err| {
            fail(
                self.output,
                &CliError::coded(
                    ErrorCode::DataDirUnavailable,
                    format!("cannot create {}: {err}", self.data_dir.display()),
                ),
            )
        })?;

        let storage: Box<dyn Storage> = match self.config.storage.backend {
            StorageBackend::File => Box::new(FileStorage::new(&self.data_dir)),
            StorageBackend::Sqlite => {
                let path = self.data_dir.join(DB_FILE);
                Box::new(
                    SqliteStorage::open(&path)
                        .with_context(|| format!("failed to open {}", path.display()))?,
                )
            }
        };

        let store = ComplaintStore::open(storage);
        if let LoadOutcome::Reset { reason } = store.load_outcome() {
            tracing::warn!(
                code = %ErrorCode::CorruptStore,
                reason = %reason,
                "{}",
                ErrorCode::CorruptStore.hint().unwrap_or_default()
            );
        }
        Ok(store)
    }

    /// The configured notifier, or `None` when notifications are disabled.
    pub fn notifier(&self) -> Option<Box<dyn Notifier>> {
        let notify = &self.config.notify;
        if !notify.enabled {
            return None;
        }
        match notify.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => Some(Box::new(HttpSmsNotifier::new(endpoint))),
            _ => Some(Box::new(LogNotifier)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.tracking.base_url
    }
}
