use std::sync::Arc;

use onepager_history::{Document, HistoryState};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{KeyValueStore, Project, StorageBackend, StorageContext, StorageResult};

/// Storage entry point used by the editor.
///
/// Routes each operation to the database when it is attached and
/// authoritative, otherwise to local storage. A failed database operation
/// is logged and retried once on local storage; the next operation tries
/// the database again.
pub struct FallbackStorage<A, S> {
    context: Arc<StorageContext<A, S>>,
}

impl<A, S> Clone for FallbackStorage<A, S> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
        }
    }
}

impl<A, S> FallbackStorage<A, S>
where
    A: StorageBackend<Value>,
    S: KeyValueStore,
{
    pub fn new(context: Arc<StorageContext<A, S>>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &StorageContext<A, S> {
        &self.context
    }
}

macro_rules! routed {
    ($self:ident, $op:ident ( $($arg:expr),* )) => {{
        $self.context.ensure_migrated().await;
        if let Some(database) = $self.context.authoritative_database().await {
            match StorageBackend::<D>::$op(database, $($arg),*).await {
                Ok(value) => return Ok(value),
                Err(err) => warn!(
                    operation = stringify!($op),
                    error = %err,
                    "Database operation failed, falling back to local storage"
                ),
            }
        }
        debug!(operation = stringify!($op), "Using local storage");
        StorageBackend::<D>::$op($self.context.local(), $($arg),*).await
    }};
}

impl<D, A, S> StorageBackend<D> for FallbackStorage<A, S>
where
    D: Document,
    A: StorageBackend<D> + StorageBackend<Value>,
    S: KeyValueStore,
{
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn get_project(&self, id: &str) -> StorageResult<Option<Project<D>>> {
        routed!(self, get_project(id))
    }

    async fn put_project_record(&self, project: &Project<D>) -> StorageResult<()> {
        routed!(self, put_project_record(project))
    }

    async fn delete_project(&self, id: &str) -> StorageResult<()> {
        self.context.ensure_migrated().await;
        if let Some(database) = self.context.authoritative_database().await {
            match StorageBackend::<D>::delete_project(database, id).await {
                Ok(()) => {
                    // Drop the pre-migration copy too, so a later fallback
                    // read cannot bring the project back
                    if let Err(err) = self.context.local().remove_project(id) {
                        warn!(project_id = %id, error = %err, "Failed to remove local copy");
                    }
                    return Ok(());
                }
                Err(err) => warn!(
                    operation = "delete_project",
                    error = %err,
                    "Database operation failed, falling back to local storage"
                ),
            }
        }
        StorageBackend::<D>::delete_project(self.context.local(), id).await
    }

    async fn list_projects(&self) -> StorageResult<Vec<Project<D>>> {
        routed!(self, list_projects())
    }

    async fn get_history(&self, id: &str) -> StorageResult<Option<HistoryState<D>>> {
        routed!(self, get_history(id))
    }

    async fn put_history(&self, id: &str, state: &HistoryState<D>) -> StorageResult<()> {
        routed!(self, put_history(id, state))
    }

    async fn delete_history(&self, id: &str) -> StorageResult<()> {
        routed!(self, delete_history(id))
    }

    async fn get_setting(&self, key: &str) -> StorageResult<Option<Value>> {
        self.context.ensure_migrated().await;
        Ok(self.context.settings().await.get(key))
    }

    async fn put_setting(&self, key: &str, value: &Value) -> StorageResult<()> {
        self.context.ensure_migrated().await;
        self.context.update_setting(key, value.clone()).await
    }

    async fn get_active_project_id(&self) -> StorageResult<Option<String>> {
        routed!(self, get_active_project_id())
    }

    async fn set_active_project_id(&self, id: Option<&str>) -> StorageResult<()> {
        routed!(self, set_active_project_id(id))
    }
}
