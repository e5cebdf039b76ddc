//! Asynchronous backend over a SQLite pool.

use std::path::Path;
use std::str::FromStr;

use onepager_history::{Document, HistoryState};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::Row;
use tracing::{debug, warn};

use crate::{Project, StorageBackend, StorageResult};

/// Settings row holding the active project id as a JSON string
pub const ACTIVE_PROJECT_SETTING: &str = "activeProjectId";

#[derive(Debug, Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Open (creating if needed) the database file and apply pending migrations
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let connect_opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_opts)
            .await?;

        debug!(path = %path.display(), "Opened database");
        Self::with_pool(pool).await
    }

    /// Private in-memory database. One connection that never expires, since
    /// every new connection to `sqlite::memory:` sees an empty database.
    pub async fn in_memory() -> StorageResult<Self> {
        let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_opts)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> StorageResult<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn record(&self, sql: &str, key: &str) -> StorageResult<Option<String>> {
        let row = sqlx::query(sql).bind(key).fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(Some(row.try_get("record")?)),
            None => Ok(None),
        }
    }
}

/// Parse a stored record; corrupt rows are reported as absent
fn decode<T: DeserializeOwned>(table: &str, key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(table, key, error = %err, "Skipping corrupt record");
            None
        }
    }
}

impl<D: Document> StorageBackend<D> for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn get_project(&self, id: &str) -> StorageResult<Option<Project<D>>> {
        let raw = self
            .record("SELECT record FROM projects WHERE id = ?", id)
            .await?;
        Ok(raw.and_then(|raw| decode("projects", id, &raw)))
    }

    async fn put_project_record(&self, project: &Project<D>) -> StorageResult<()> {
        let record = serde_json::to_string(project)?;
        let updated_at = project
            .updated_at
            .map(|at| at.timestamp_millis())
            .unwrap_or_default();

        sqlx::query(
            "INSERT INTO projects (id, name, updated_at, record) VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                updated_at = excluded.updated_at,
                record = excluded.record",
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(updated_at)
        .bind(record)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_project(&self, id: &str) -> StorageResult<()> {
        let active = serde_json::to_string(id)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM history WHERE project_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM settings WHERE key = ? AND value = ?")
            .bind(ACTIVE_PROJECT_SETTING)
            .bind(active)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_projects(&self) -> StorageResult<Vec<Project<D>>> {
        let rows = sqlx::query("SELECT id, record FROM projects ORDER BY updated_at DESC")
            .fetch_all(&self.pool)
            .await?;

        let mut projects = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id")?;
            let raw: String = row.try_get("record")?;
            if let Some(project) = decode("projects", &id, &raw) {
                projects.push(project);
            }
        }
        Ok(projects)
    }

    async fn get_history(&self, id: &str) -> StorageResult<Option<HistoryState<D>>> {
        let raw = self
            .record("SELECT record FROM history WHERE project_id = ?", id)
            .await?;
        Ok(raw.and_then(|raw| decode("history", id, &raw)))
    }

    async fn put_history(&self, id: &str, state: &HistoryState<D>) -> StorageResult<()> {
        let record = serde_json::to_string(state)?;
        sqlx::query(
            "INSERT INTO history (project_id, record) VALUES (?, ?)
             ON CONFLICT(project_id) DO UPDATE SET record = excluded.record",
        )
        .bind(id)
        .bind(record)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_history(&self, id: &str) -> StorageResult<()> {
        sqlx::query("DELETE FROM history WHERE project_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_setting(&self, key: &str) -> StorageResult<Option<Value>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let raw: String = row.try_get("value")?;
                Ok(decode("settings", key, &raw))
            }
            None => Ok(None),
        }
    }

    async fn put_setting(&self, key: &str, value: &Value) -> StorageResult<()> {
        let raw = serde_json::to_string(value)?;
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(raw)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_active_project_id(&self) -> StorageResult<Option<String>> {
        let value = StorageBackend::<D>::get_setting(self, ACTIVE_PROJECT_SETTING).await?;
        Ok(value
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|id| !id.is_empty()))
    }

    async fn set_active_project_id(&self, id: Option<&str>) -> StorageResult<()> {
        match id {
            Some(id) => {
                StorageBackend::<D>::put_setting(self, ACTIVE_PROJECT_SETTING, &Value::from(id))
                    .await
            }
            None => {
                sqlx::query("DELETE FROM settings WHERE key = ?")
                    .bind(ACTIVE_PROJECT_SETTING)
                    .execute(&self.pool)
                    .await?;
                Ok(())
            }
        }
    }
}
