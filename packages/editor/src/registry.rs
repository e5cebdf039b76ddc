//! # Project Registry
//!
//! Maps project ids to documents and their undo history, and tracks the
//! active project.
//!
//! Every committed change goes through the history engine first and is
//! then written to storage. The registry keeps each loaded history in
//! memory, so when a write fails the edit is not lost: memory stays ahead
//! of storage and the next successful save catches storage up.

use std::collections::HashMap;

use chrono::Local;
use onepager_history::{Document, HistoryEngine, HistoryState};
use onepager_model::OnePagerData;
use onepager_storage::{Project, StorageBackend, StorageResult};
use tracing::{debug, info, warn};

use crate::{EditorError, EditorResult};

/// Name of the project synthesized on first run
pub const DEFAULT_PROJECT_NAME: &str = "My First Project";

/// Documents that can be synthesized for a brand-new project
pub trait NewDocument: Document {
    fn new_document(name: &str) -> Self;
}

impl NewDocument for OnePagerData {
    fn new_document(name: &str) -> Self {
        OnePagerData::new_default(name, Local::now().date_naive())
    }
}

/// A project together with its history. `project.data` is always
/// `history.present`.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<D> {
    pub project: Project<D>,
    pub history: HistoryState<D>,
}

impl<D: Document> Snapshot<D> {
    fn new(project: &Project<D>, history: HistoryState<D>) -> Self {
        let mut project = project.clone();
        project.data = history.present.clone();
        Self { project, history }
    }

    pub fn document(&self) -> &D {
        &self.history.present
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

#[derive(Debug, Clone)]
struct CachedHistory<D> {
    history: HistoryState<D>,
    /// Memory is ahead of storage after a failed save
    unsaved: bool,
}

pub struct ProjectRegistry<D, B> {
    storage: B,
    engine: HistoryEngine,
    histories: HashMap<String, CachedHistory<D>>,
    active: Option<String>,
}

impl<D, B> ProjectRegistry<D, B>
where
    D: Document,
    B: StorageBackend<D>,
{
    pub fn new(storage: B, engine: HistoryEngine) -> Self {
        Self {
            storage,
            engine,
            histories: HashMap::new(),
            active: None,
        }
    }

    pub fn storage(&self) -> &B {
        &self.storage
    }

    pub fn engine(&self) -> &HistoryEngine {
        &self.engine
    }

    pub fn active_project_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Open the active project, falling back to the first listed one, or
    /// create the default project when there are none.
    pub async fn load_active_or_create_default(&mut self) -> EditorResult<Snapshot<D>>
    where
        D: NewDocument,
    {
        let mut projects = self.storage.list_projects().await?;
        if projects.is_empty() {
            info!("No projects found, creating default project");
            let document = D::new_document(DEFAULT_PROJECT_NAME);
            return self.create_project(DEFAULT_PROJECT_NAME, document).await;
        }

        let active_id = self
            .storage
            .get_active_project_id()
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to read active project");
                None
            });

        let index = active_id
            .and_then(|id| projects.iter().position(|p| p.id == id))
            .unwrap_or(0);
        let project = projects.swap_remove(index);
        debug!(project_id = %project.id, "Loading active project");
        self.activate(project).await
    }

    pub async fn switch_project(&mut self, id: &str) -> EditorResult<Snapshot<D>> {
        let project = self.find(id).await?;
        info!(project_id = %id, name = %project.name, "Switched project");
        self.activate(project).await
    }

    /// Record `next` as the new document of `project` and persist it.
    ///
    /// Committing the unchanged document writes nothing, unless an earlier
    /// save of this project failed, in which case the save is retried.
    pub async fn commit_edit(&mut self, project: &Project<D>, next: D) -> EditorResult<Snapshot<D>> {
        if !project.is_saved() {
            return self.create_project(&project.name, next).await;
        }

        let cached = self.cached(project).await;
        let history = self.engine.push(cached.history.clone(), next);
        if history == cached.history && !cached.unsaved {
            debug!(project_id = %project.id, "Document unchanged, nothing to record");
            return Ok(Snapshot::new(project, history));
        }
        self.persist(project, history).await
    }

    pub async fn undo(&mut self, project: &Project<D>) -> EditorResult<Snapshot<D>> {
        let cached = self.cached(project).await;
        if !self.engine.can_undo(&cached.history) {
            return Ok(Snapshot::new(project, cached.history));
        }
        let history = self.engine.undo(cached.history);
        self.persist(project, history).await
    }

    pub async fn redo(&mut self, project: &Project<D>) -> EditorResult<Snapshot<D>> {
        let cached = self.cached(project).await;
        if !self.engine.can_redo(&cached.history) {
            return Ok(Snapshot::new(project, cached.history));
        }
        let history = self.engine.redo(cached.history);
        self.persist(project, history).await
    }

    /// Save a new project with a fresh history and make it active
    pub async fn create_project(&mut self, name: &str, data: D) -> EditorResult<Snapshot<D>> {
        let saved = self.storage.put_project(Project::draft(name, data)).await?;
        info!(project_id = %saved.id, name = %saved.name, "Created project");

        let history = self.engine.create(saved.data.clone());
        if let Err(err) = self.storage.put_history(&saved.id, &history).await {
            warn!(project_id = %saved.id, error = %err, "Failed to save initial history");
        }
        self.histories.insert(
            saved.id.clone(),
            CachedHistory {
                history: history.clone(),
                unsaved: false,
            },
        );
        self.set_active(&saved.id).await;
        Ok(Snapshot::new(&saved, history))
    }

    /// Copy the current document of `id` into a new, active project
    pub async fn duplicate_project(&mut self, id: &str, new_name: &str) -> EditorResult<Snapshot<D>> {
        let source = self.find(id).await?;
        let data = match self.histories.get(id) {
            Some(cached) => cached.history.present.clone(),
            None => source.data,
        };
        info!(source_id = %id, name = %new_name, "Duplicating project");
        self.create_project(new_name, data).await
    }

    pub async fn rename_project(&mut self, id: &str, name: &str) -> EditorResult<Project<D>> {
        let mut project = self.find(id).await?;
        project.name = name.to_string();
        let saved = self.storage.put_project(project).await?;
        info!(project_id = %id, name = %name, "Renamed project");
        Ok(saved)
    }

    /// Remove a project and its history; clears the active pointer if it
    /// named this project
    pub async fn delete_project(&mut self, id: &str) -> EditorResult<()> {
        self.storage.delete_project(id).await?;
        self.histories.remove(id);
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        info!(project_id = %id, "Deleted project");
        Ok(())
    }

    pub async fn list_projects(&self) -> EditorResult<Vec<Project<D>>> {
        Ok(self.storage.list_projects().await?)
    }

    /// Project `id` with its history, without changing the active project
    pub async fn current(&mut self, id: &str) -> EditorResult<Snapshot<D>> {
        let project = self.find(id).await?;
        let cached = self.cached(&project).await;
        Ok(Snapshot::new(&project, cached.history))
    }

    /// `false` for projects whose history is not loaded yet
    pub fn can_undo(&self, id: &str) -> bool {
        self.histories
            .get(id)
            .is_some_and(|cached| self.engine.can_undo(&cached.history))
    }

    pub fn can_redo(&self, id: &str) -> bool {
        self.histories
            .get(id)
            .is_some_and(|cached| self.engine.can_redo(&cached.history))
    }

    async fn find(&self, id: &str) -> EditorResult<Project<D>> {
        self.storage
            .get_project(id)
            .await?
            .ok_or_else(|| EditorError::ProjectNotFound(id.to_string()))
    }

    async fn activate(&mut self, project: Project<D>) -> EditorResult<Snapshot<D>> {
        self.set_active(&project.id).await;
        let cached = self.cached(&project).await;
        Ok(Snapshot::new(&project, cached.history))
    }

    async fn set_active(&mut self, id: &str) {
        if let Err(err) = self.storage.set_active_project_id(Some(id)).await {
            warn!(project_id = %id, error = %err, "Failed to save active project");
        }
        self.active = Some(id.to_string());
    }

    /// History of `project`: from memory, else from storage, else a fresh seed.
    ///
    /// A stored history whose present differs from the project document
    /// (an edit made outside this registry) gets that document pushed onto
    /// it, so the edit becomes one more undoable step.
    async fn cached(&mut self, project: &Project<D>) -> CachedHistory<D> {
        if let Some(cached) = self.histories.get(&project.id) {
            return cached.clone();
        }

        let stored = self
            .storage
            .get_history(&project.id)
            .await
            .unwrap_or_else(|err| {
                warn!(project_id = %project.id, error = %err, "Failed to load history, starting fresh");
                None
            });

        let history = match stored {
            Some(history) if history.present == project.data => history,
            Some(history) => {
                debug!(project_id = %project.id, "Stored history is behind the project document");
                self.engine.push(history, project.data.clone())
            }
            None => self.engine.create(project.data.clone()),
        };

        let cached = CachedHistory {
            history,
            unsaved: false,
        };
        self.histories.insert(project.id.clone(), cached.clone());
        cached
    }

    async fn persist(
        &mut self,
        project: &Project<D>,
        history: HistoryState<D>,
    ) -> EditorResult<Snapshot<D>> {
        // Memory first, so a failed write leaves it ahead of storage
        self.histories.insert(
            project.id.clone(),
            CachedHistory {
                history: history.clone(),
                unsaved: true,
            },
        );

        let snapshot = Snapshot::new(project, history);
        let saved = self
            .write(snapshot.project.clone(), &snapshot.history)
            .await
            .map_err(|source| {
                warn!(project_id = %project.id, error = %source, "Save failed, edit kept in memory");
                EditorError::Save {
                    project_id: project.id.clone(),
                    source,
                }
            })?;

        if let Some(cached) = self.histories.get_mut(&saved.id) {
            cached.unsaved = false;
        }
        Ok(Snapshot {
            project: saved,
            history: snapshot.history,
        })
    }

    async fn write(&self, project: Project<D>, history: &HistoryState<D>) -> StorageResult<Project<D>> {
        self.storage.put_history(&project.id, history).await?;
        self.storage.put_project(project).await
    }
}
