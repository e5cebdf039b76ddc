use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use onepager_editor::{ProjectRegistry, Snapshot};
use onepager_history::{HistoryConfig, HistoryEngine};
use onepager_model::OnePagerData;
use onepager_storage::{
    FallbackStorage, FileStore, LocalBackend, SqliteBackend, StorageContext,
};
use tracing::{debug, warn};

use crate::config::Config;

pub type Storage = FallbackStorage<SqliteBackend, FileStore>;
pub type Registry = ProjectRegistry<OnePagerData, Storage>;

/// Everything one CLI invocation works with
pub struct Session {
    pub cwd: PathBuf,
    pub context: Arc<StorageContext<SqliteBackend, FileStore>>,
    pub registry: Registry,
}

impl Session {
    pub async fn open(cwd: &Path, config: &Config) -> Result<Self> {
        let store_path = config.local_store_path(cwd);
        let store = FileStore::open(&store_path, config.sync_quota_bytes)
            .with_context(|| format!("Failed to open local store {}", store_path.display()))?;

        let database = if config.use_database {
            let path = config.database_path(cwd);
            match SqliteBackend::open(&path).await {
                Ok(database) => Some(database),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Database unavailable, using local storage only");
                    None
                }
            }
        } else {
            debug!("Database disabled by configuration");
            None
        };

        let context = Arc::new(StorageContext::new(LocalBackend::new(store), database));
        let storage = FallbackStorage::new(Arc::clone(&context));
        let engine = HistoryEngine::new(HistoryConfig::with_max_history(config.max_history));

        Ok(Self {
            cwd: cwd.to_path_buf(),
            context,
            registry: ProjectRegistry::new(storage, engine),
        })
    }

    /// The active project, created on first run
    pub async fn active(&mut self) -> Result<Snapshot<OnePagerData>> {
        Ok(self.registry.load_active_or_create_default().await?)
    }

    pub async fn close(&self) {
        if let Some(database) = self.context.database() {
            database.close().await;
        }
    }
}
