use onepager_history::{Document, HistoryState};
use serde_json::Value;
use tracing::{info, warn};

use crate::{new_project_id, Project, StorageResult};

/// Durable storage for projects, per-project history and settings.
///
/// Implementors:
/// - [`crate::LocalBackend`] - synchronous key-value storage, size limited
/// - [`crate::SqliteBackend`] - asynchronous database storage
/// - [`crate::FallbackStorage`] - routes between the two
#[allow(async_fn_in_trait)]
pub trait StorageBackend<D: Document> {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn get_project(&self, id: &str) -> StorageResult<Option<Project<D>>>;

    /// Write a project exactly as given, timestamps included
    async fn put_project_record(&self, project: &Project<D>) -> StorageResult<()>;

    /// Insert or overwrite a project.
    ///
    /// Assigns an id when the project still has the empty sentinel, fills
    /// `created_at` if missing and always refreshes `updated_at`. A project
    /// that lost its id but kept `created_at` gets the id of the stored
    /// project created at the same instant.
    async fn put_project(&self, mut project: Project<D>) -> StorageResult<Project<D>> {
        if project.id.is_empty() {
            if let Some(created_at) = project.created_at {
                let existing = self.list_projects().await?;
                match existing.into_iter().find(|p| p.created_at == Some(created_at)) {
                    Some(found) => {
                        info!(project_id = %found.id, "Recovered missing project id");
                        project.id = found.id;
                    }
                    None => warn!(
                        name = %project.name,
                        "Project missing id and recovery failed, assigning a new one"
                    ),
                }
            }
        }

        project.stamp(new_project_id);
        self.put_project_record(&project).await?;
        Ok(project)
    }

    /// Remove a project, its history and the active pointer if it named this project
    async fn delete_project(&self, id: &str) -> StorageResult<()>;

    async fn list_projects(&self) -> StorageResult<Vec<Project<D>>>;

    async fn get_history(&self, id: &str) -> StorageResult<Option<HistoryState<D>>>;

    async fn put_history(&self, id: &str, state: &HistoryState<D>) -> StorageResult<()>;

    async fn delete_history(&self, id: &str) -> StorageResult<()>;

    async fn get_setting(&self, key: &str) -> StorageResult<Option<Value>>;

    async fn put_setting(&self, key: &str, value: &Value) -> StorageResult<()>;

    async fn get_active_project_id(&self) -> StorageResult<Option<String>>;

    /// `None` clears the pointer
    async fn set_active_project_id(&self, id: Option<&str>) -> StorageResult<()>;
}
