use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use onepager_history::DEFAULT_MAX_HISTORY;
use onepager_storage::DEFAULT_QUOTA_BYTES;

pub const DEFAULT_CONFIG_NAME: &str = "onepager.config.json";

/// OnePager configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding the local store and the database
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Undo levels kept per project
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Size limit of the local store, in bytes
    #[serde(default = "default_sync_quota")]
    pub sync_quota_bytes: usize,

    /// Open the database backend when possible
    #[serde(default = "default_use_database")]
    pub use_database: bool,

    #[serde(default = "default_database_file")]
    pub database_file: String,

    #[serde(default = "default_local_store_file")]
    pub local_store_file: String,
}

fn default_data_dir() -> String {
    ".onepager".to_string()
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

fn default_sync_quota() -> usize {
    DEFAULT_QUOTA_BYTES
}

fn default_use_database() -> bool {
    true
}

fn default_database_file() -> String {
    "onepager.db".to_string()
}

fn default_local_store_file() -> String {
    "local-storage.json".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn data_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.data_dir)
    }

    pub fn database_path(&self, cwd: &Path) -> PathBuf {
        self.data_dir(cwd).join(&self.database_file)
    }

    pub fn local_store_path(&self, cwd: &Path) -> PathBuf {
        self.data_dir(cwd).join(&self.local_store_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_history: default_max_history(),
            sync_quota_bytes: default_sync_quota(),
            use_database: default_use_database(),
            database_file: default_database_file(),
            local_store_file: default_local_store_file(),
        }
    }
}
