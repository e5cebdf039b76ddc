use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::migration::{self, LegacyScan, MigrationReport};
use crate::{
    KeyValueStore, LocalBackend, Settings, StorageBackend, StorageError, StorageResult,
    USE_DATABASE_KEY,
};

/// Process-wide storage state: both backends, the cached settings and the
/// one-time migration.
///
/// Build one per process and share it (usually behind an `Arc`). Tests
/// build a fresh one per case.
pub struct StorageContext<A, S> {
    local: LocalBackend<S>,
    database: Option<A>,
    legacy_scan: LegacyScan,
    settings: Mutex<Option<Settings>>,
    migration: OnceCell<MigrationReport>,
}

impl<A, S> StorageContext<A, S>
where
    A: StorageBackend<Value>,
    S: KeyValueStore,
{
    pub fn new(local: LocalBackend<S>, database: Option<A>) -> Self {
        Self {
            local,
            database,
            legacy_scan: LegacyScan::default(),
            settings: Mutex::new(None),
            migration: OnceCell::new(),
        }
    }

    pub fn with_legacy_scan(mut self, scan: LegacyScan) -> Self {
        self.legacy_scan = scan;
        self
    }

    pub fn local(&self) -> &LocalBackend<S> {
        &self.local
    }

    pub fn database(&self) -> Option<&A> {
        self.database.as_ref()
    }

    pub fn legacy_scan(&self) -> &LegacyScan {
        &self.legacy_scan
    }

    fn cached_settings(&self) -> Option<Settings> {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current settings: the local mirror, with the database flag folded in
    /// when a database is attached. Loaded once, then served from cache.
    pub async fn settings(&self) -> Settings {
        if let Some(cached) = self.cached_settings() {
            return cached;
        }

        let mut settings = self.local.settings().unwrap_or_else(|err| {
            warn!(error = %err, "Cannot read local settings, using defaults");
            Settings::default()
        });

        if let Some(database) = &self.database {
            match database.get_setting(USE_DATABASE_KEY).await {
                Ok(Some(Value::Bool(true))) => settings.use_database = true,
                Ok(_) => {}
                Err(err) => warn!(error = %err, "Cannot read database settings"),
            }
        }

        debug!(use_database = settings.use_database, "Loaded settings");
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner) = Some(settings.clone());
        settings
    }

    /// Write a setting to the database (if any) and always to the local
    /// mirror. Succeeds when at least one write landed.
    pub async fn update_setting(&self, key: &str, value: Value) -> StorageResult<()> {
        let mut written = false;
        let mut failure = None;

        if let Some(database) = &self.database {
            match database.put_setting(key, &value).await {
                Ok(()) => written = true,
                Err(err) => {
                    warn!(key, error = %err, "Failed to write setting to database");
                    failure = Some(err);
                }
            }
        }

        match self.local.store_setting(key, &value) {
            Ok(()) => written = true,
            Err(err) => {
                warn!(key, error = %err, "Failed to write setting to local storage");
                failure = Some(err);
            }
        }

        if !written {
            return Err(failure
                .unwrap_or_else(|| StorageError::Unavailable("no backend accepted the setting".into())));
        }

        if let Some(settings) = self
            .settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            settings.set(key, value);
        }
        Ok(())
    }

    /// The database, when one is attached and settings say it is authoritative
    pub async fn authoritative_database(&self) -> Option<&A> {
        let database = self.database.as_ref()?;
        if self.settings().await.use_database {
            Some(database)
        } else {
            None
        }
    }

    /// Run the migration coordinator once; later and concurrent callers
    /// await the same outcome.
    pub async fn ensure_migrated(&self) -> &MigrationReport {
        self.migration
            .get_or_init(|| migration::run(self))
            .await
    }

    /// Report of the migration, if it already ran
    pub fn migration_report(&self) -> Option<&MigrationReport> {
        self.migration.get()
    }
}
