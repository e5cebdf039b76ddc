//! Integration tests for editor crate

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use onepager_editor::{EditorError, ProjectRegistry, DEFAULT_PROJECT_NAME};
use onepager_history::{Document, HistoryConfig, HistoryEngine, HistoryState};
use onepager_model::OnePagerData;
use onepager_storage::{
    history_key, FallbackStorage, FileStore, KeyValueStore, LocalBackend, MemoryStore, Project,
    SqliteBackend, StorageBackend, StorageContext, StorageError, StorageResult,
    DEFAULT_QUOTA_BYTES,
};
use serde_json::{json, Value};

/// Delegating backend whose writes can be switched off
#[derive(Clone)]
struct Flaky<B> {
    inner: B,
    failing: Arc<AtomicBool>,
}

impl<B> Flaky<B> {
    fn new(inner: B) -> Self {
        Self {
            inner,
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl<D: Document, B: StorageBackend<D>> StorageBackend<D> for Flaky<B> {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn get_project(&self, id: &str) -> StorageResult<Option<Project<D>>> {
        self.inner.get_project(id).await
    }

    async fn put_project_record(&self, project: &Project<D>) -> StorageResult<()> {
        self.check()?;
        self.inner.put_project_record(project).await
    }

    async fn delete_project(&self, id: &str) -> StorageResult<()> {
        self.check()?;
        self.inner.delete_project(id).await
    }

    async fn list_projects(&self) -> StorageResult<Vec<Project<D>>> {
        self.inner.list_projects().await
    }

    async fn get_history(&self, id: &str) -> StorageResult<Option<HistoryState<D>>> {
        self.inner.get_history(id).await
    }

    async fn put_history(&self, id: &str, state: &HistoryState<D>) -> StorageResult<()> {
        self.check()?;
        self.inner.put_history(id, state).await
    }

    async fn delete_history(&self, id: &str) -> StorageResult<()> {
        self.check()?;
        self.inner.delete_history(id).await
    }

    async fn get_setting(&self, key: &str) -> StorageResult<Option<Value>> {
        self.inner.get_setting(key).await
    }

    async fn put_setting(&self, key: &str, value: &Value) -> StorageResult<()> {
        self.check()?;
        self.inner.put_setting(key, value).await
    }

    async fn get_active_project_id(&self) -> StorageResult<Option<String>> {
        self.inner.get_active_project_id().await
    }

    async fn set_active_project_id(&self, id: Option<&str>) -> StorageResult<()> {
        self.check()?;
        self.inner.set_active_project_id(id).await
    }
}

fn engine() -> HistoryEngine {
    HistoryEngine::new(HistoryConfig::with_max_history(3))
}

#[tokio::test]
async fn test_failed_save_keeps_edit_in_memory() {
    let store = MemoryStore::new();
    let storage = Flaky::new(LocalBackend::new(store.clone()));
    let mut registry = ProjectRegistry::new(storage.clone(), engine());

    let created = registry
        .create_project("Apollo", json!({ "v": "A" }))
        .await
        .unwrap();
    let b = registry
        .commit_edit(&created.project, json!({ "v": "B" }))
        .await
        .unwrap();
    let id = b.project.id.clone();

    storage.fail_writes(true);
    let err = registry
        .commit_edit(&b.project, json!({ "v": "C" }))
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::Save { ref project_id, .. } if project_id == &id));

    // Memory is ahead, storage still has the last good save
    let current = registry.current(&id).await.unwrap();
    assert_eq!(current.document(), &json!({ "v": "C" }));
    let local = LocalBackend::new(store);
    let durable: Project<Value> = local.project(&id).unwrap().unwrap();
    assert_eq!(durable.data, json!({ "v": "B" }));

    // Committing the same document again retries the save
    storage.fail_writes(false);
    let saved = registry
        .commit_edit(&current.project, json!({ "v": "C" }))
        .await
        .unwrap();
    assert_eq!(saved.history.past.len(), 2);
    let durable: Project<Value> = local.project(&id).unwrap().unwrap();
    assert_eq!(durable.data, json!({ "v": "C" }));
    assert_eq!(
        local.history::<Value>(&id).unwrap().unwrap().present,
        json!({ "v": "C" })
    );
}

#[tokio::test]
async fn test_history_survives_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("local-storage.json");

    let id = {
        let store = FileStore::open(&path, DEFAULT_QUOTA_BYTES).unwrap();
        let mut registry: ProjectRegistry<OnePagerData, _> =
            ProjectRegistry::new(LocalBackend::new(store), engine());
        let loaded = registry.load_active_or_create_default().await.unwrap();

        let mut next = loaded.document().clone();
        next.goal = "Land on the moon".to_string();
        let edited = registry.commit_edit(&loaded.project, next).await.unwrap();
        edited.project.id
    };

    let store = FileStore::open(&path, DEFAULT_QUOTA_BYTES).unwrap();
    let mut registry: ProjectRegistry<OnePagerData, _> =
        ProjectRegistry::new(LocalBackend::new(store), engine());
    let reopened = registry.load_active_or_create_default().await.unwrap();

    assert_eq!(reopened.project.id, id);
    assert_eq!(reopened.project.name, DEFAULT_PROJECT_NAME);
    assert_eq!(reopened.document().goal, "Land on the moon");
    assert!(reopened.can_undo());

    // Dedup still holds after the round trip through storage
    let same = registry
        .commit_edit(&reopened.project, reopened.document().clone())
        .await
        .unwrap();
    assert_eq!(same.history, reopened.history);

    let undone = registry.undo(&reopened.project).await.unwrap();
    assert_ne!(undone.document().goal, "Land on the moon");
}

#[tokio::test]
async fn test_unchanged_commit_after_reload_records_nothing() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("local-storage.json");

    let mut document = OnePagerData::default();
    document.year_gantt.now_frac = 7.0 / 31.0;
    document.quarter_gantt.now_frac = 0.22580645161290322;

    let id = {
        let store = FileStore::open(&path, DEFAULT_QUOTA_BYTES).unwrap();
        let mut registry = ProjectRegistry::new(LocalBackend::new(store), engine());
        let created = registry.create_project("Apollo", document.clone()).await.unwrap();
        created.project.id
    };

    let store = FileStore::open(&path, DEFAULT_QUOTA_BYTES).unwrap();
    let mut registry: ProjectRegistry<OnePagerData, _> =
        ProjectRegistry::new(LocalBackend::new(store), engine());
    let reloaded = registry.switch_project(&id).await.unwrap();
    assert_eq!(reloaded.document(), &document);

    let same = registry.commit_edit(&reloaded.project, document).await.unwrap();
    assert!(same.history.past.is_empty());
    assert!(!registry.can_undo(&id));
}

#[tokio::test]
async fn test_corrupt_history_falls_back_to_fresh_seed() {
    let store = MemoryStore::new();
    let local = LocalBackend::new(store.clone());
    let mut project = Project::draft("Apollo", json!({ "v": "A" }));
    project.stamp(|| "p1".to_string());
    local.store_project(&project).unwrap();
    store.set_item(&history_key("p1"), "{\"past\": [").unwrap();

    let mut registry = ProjectRegistry::new(local, engine());
    let snapshot = registry.switch_project("p1").await.unwrap();

    assert_eq!(snapshot.history, HistoryState::new(json!({ "v": "A" })));
    assert!(!snapshot.can_undo());
}

#[tokio::test]
async fn test_external_edit_becomes_undo_step() {
    let local = LocalBackend::new(MemoryStore::new());
    let mut project = Project::draft("Apollo", json!({ "v": "external" }));
    project.stamp(|| "p1".to_string());
    local.store_project(&project).unwrap();
    local
        .store_history("p1", &HistoryState::new(json!({ "v": "A" })))
        .unwrap();

    let mut registry: ProjectRegistry<Value, _> = ProjectRegistry::new(local, engine());
    let snapshot = registry.switch_project("p1").await.unwrap();

    assert_eq!(snapshot.document(), &json!({ "v": "external" }));
    let undone = registry.undo(&snapshot.project).await.unwrap();
    assert_eq!(undone.document(), &json!({ "v": "A" }));
}

#[tokio::test]
async fn test_manage_projects_over_database() {
    let database = SqliteBackend::in_memory().await.unwrap();
    let context = StorageContext::new(LocalBackend::new(MemoryStore::new()), Some(database));
    let storage = FallbackStorage::new(Arc::new(context));
    let mut registry: ProjectRegistry<OnePagerData, _> = ProjectRegistry::new(storage, engine());

    let first = registry.load_active_or_create_default().await.unwrap();
    let mut edited = first.document().clone();
    edited.comments = "Duplicated with this".to_string();
    let first = registry.commit_edit(&first.project, edited).await.unwrap();

    let copy = registry
        .duplicate_project(&first.project.id, "Apollo (Copy)")
        .await
        .unwrap();
    assert_ne!(copy.project.id, first.project.id);
    assert_eq!(copy.document().comments, "Duplicated with this");
    assert!(!copy.can_undo());
    assert_eq!(registry.active_project_id(), Some(copy.project.id.as_str()));

    let renamed = registry
        .rename_project(&copy.project.id, "Apollo 11")
        .await
        .unwrap();
    assert_eq!(renamed.name, "Apollo 11");
    assert_eq!(renamed.created_at, copy.project.created_at);

    registry.delete_project(&copy.project.id).await.unwrap();
    assert_eq!(registry.active_project_id(), None);
    let remaining = registry.list_projects().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, first.project.id);

    // With the active project gone, loading falls back to the remaining one
    let loaded = registry.load_active_or_create_default().await.unwrap();
    assert_eq!(loaded.project.id, first.project.id);
    assert!(loaded.can_undo());

    let missing = registry.switch_project(&copy.project.id).await.unwrap_err();
    assert!(matches!(missing, EditorError::ProjectNotFound(_)));
}

#[tokio::test]
async fn test_partial_legacy_document_opens_as_project() {
    let store = MemoryStore::new();
    store
        .set_item(
            "onepager-data",
            r#"{"projectName":"Legacy","kpis":[{"label":"Budget"}],"risks":[{"risk":"Scope"}]}"#,
        )
        .unwrap();
    let context = StorageContext::new(LocalBackend::new(store), None::<SqliteBackend>);
    let storage = FallbackStorage::new(Arc::new(context));
    let mut registry: ProjectRegistry<OnePagerData, _> = ProjectRegistry::new(storage, engine());

    let loaded = registry.load_active_or_create_default().await.unwrap();
    assert_eq!(loaded.project.name, "Legacy");
    assert_eq!(loaded.document().kpis[0].label, "Budget");
    assert_eq!(loaded.document().kpis[0].value, "");
    assert_eq!(loaded.document().risks[0].mitigation, "");
    assert_eq!(registry.list_projects().await.unwrap().len(), 1);
}
