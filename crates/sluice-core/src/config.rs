use crate::advancer::AdvanceDelays;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the config file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable that overrides the data directory.
pub const HOME_ENV: &str = "SLUICE_HOME";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SluiceConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub advance: AdvanceConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Sqlite,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Sqlite => "sqlite",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Origin prepended to `/alert/<id>` in tracking links.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// SMS gateway URL. Without one, notifications are only logged.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            endpoint: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceConfig {
    #[serde(default = "default_pending_secs")]
    pub pending_secs: u64,
    #[serde(default = "default_under_review_secs")]
    pub under_review_secs: u64,
    #[serde(default = "default_in_progress_secs")]
    pub in_progress_secs: u64,
}

impl Default for AdvanceConfig {
    fn default() -> Self {
        Self {
            pending_secs: default_pending_secs(),
            under_review_secs: default_under_review_secs(),
            in_progress_secs: default_in_progress_secs(),
        }
    }
}

impl AdvanceConfig {
    #[must_use]
    pub const fn to_delays(&self) -> AdvanceDelays {
        AdvanceDelays {
            pending: Duration::from_secs(self.pending_secs),
            under_review: Duration::from_secs(self.under_review_secs),
            in_progress: Duration::from_secs(self.in_progress_secs),
        }
    }
}

/// Load `config.toml` from `data_dir`, or defaults when it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(data_dir: &Path) -> Result<SluiceConfig> {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(SluiceConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<SluiceConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve the data directory.
///
/// Precedence: explicit flag, then `SLUICE_HOME`, then the platform data
/// directory, then `./.sluice`.
#[must_use]
pub fn resolve_data_dir(flag: Option<&Path>) -> PathBuf {
    let env_home = std::env::var_os(HOME_ENV).map(PathBuf::from);
    resolve_data_dir_inner(flag, env_home, dirs::data_dir())
}

fn resolve_data_dir_inner(
    flag: Option<&Path>,
    env_home: Option<PathBuf>,
    platform_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    if let Some(dir) = env_home.filter(|d| !d.as_os_str().is_empty()) {
        return dir;
    }
    platform_dir.map_or_else(|| PathBuf::from(".sluice"), |dir| dir.join("sluice"))
}

const fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "http://localhost:5173".to_string()
}

const fn default_pending_secs() -> u64 {
    10
}

const fn default_under_review_secs() -> u64 {
    15
}

const fn default_in_progress_secs() -> u64 {
    20
}
