//! Legacy recovery and local-to-database migration, end to end.

use std::sync::Arc;

use onepager_history::{HistoryConfig, HistoryEngine};
use onepager_storage::{
    FallbackStorage, KeyValueStore, LocalBackend, MemoryStore, Project, SqliteBackend,
    StorageBackend, StorageContext, MIGRATED_KEY, USE_DATABASE_KEY,
};
use serde_json::{json, Value};

fn local_only(store: &MemoryStore) -> FallbackStorage<SqliteBackend, MemoryStore> {
    let context = StorageContext::new(LocalBackend::new(store.clone()), None);
    FallbackStorage::new(Arc::new(context))
}

fn seed_local_projects(store: &MemoryStore, count: usize) -> Vec<Project<Value>> {
    let local = LocalBackend::new(store.clone());
    let engine = HistoryEngine::new(HistoryConfig::default());
    let mut projects = Vec::new();

    for n in 0..count {
        let name = format!("Project {}", n);
        let mut project = Project::draft(&name, json!({ "projectName": name }));
        project.stamp(|| format!("p{}", n));
        local.store_project(&project).unwrap();

        let history = engine.create(json!({ "projectName": "draft" }));
        let history = engine.push(history, project.data.clone());
        local.store_history(&project.id, &history).unwrap();
        projects.push(project);
    }

    local.set_active_project_id(Some("p1")).unwrap();
    local.mark_legacy_scan_done().unwrap();
    projects
}

#[tokio::test]
async fn test_legacy_recovery_is_idempotent() {
    let store = MemoryStore::new();
    store
        .set_item(
            "old-project-data",
            r#"{"projectName":"Legacy Project","yearGantt":{"labels":[]},"kpis":[]}"#,
        )
        .unwrap();

    let first = local_only(&store);
    let report = first.context().ensure_migrated().await.clone();
    assert_eq!(report.recovered_from.as_deref(), Some("old-project-data"));

    let projects = StorageBackend::<Value>::list_projects(&first).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "Legacy Project");
    assert_eq!(projects[0].data["projectName"], "Legacy Project");
    assert_eq!(
        StorageBackend::<Value>::get_active_project_id(&first)
            .await
            .unwrap(),
        Some(projects[0].id.clone())
    );

    // A second process over the same store finds the flag and does nothing
    let second = local_only(&store);
    let report = second.context().ensure_migrated().await.clone();
    assert_eq!(report.recovered_from, None);
    let again = StorageBackend::<Value>::list_projects(&second).await.unwrap();
    assert_eq!(again, projects);
    assert_eq!(store.get_item(MIGRATED_KEY).unwrap(), Some("true".to_string()));
}

#[tokio::test]
async fn test_backend_migration_copies_everything() {
    let store = MemoryStore::new();
    let seeded = seed_local_projects(&store, 3);
    let database = SqliteBackend::in_memory().await.unwrap();

    let context = StorageContext::new(LocalBackend::new(store.clone()), Some(database.clone()));
    let report = context.ensure_migrated().await.clone();

    assert_eq!(report.copied_projects, 3);
    assert_eq!(report.failed_copies, 0);
    assert!(report.database_authoritative);

    for project in &seeded {
        let copied = StorageBackend::<Value>::get_project(&database, &project.id)
            .await
            .unwrap();
        assert_eq!(copied.as_ref(), Some(project));

        let local_history = LocalBackend::new(store.clone())
            .history::<Value>(&project.id)
            .unwrap();
        let copied_history = StorageBackend::<Value>::get_history(&database, &project.id)
            .await
            .unwrap();
        assert_eq!(copied_history, local_history);
    }

    assert_eq!(
        StorageBackend::<Value>::get_active_project_id(&database)
            .await
            .unwrap(),
        Some("p1".to_string())
    );
    assert_eq!(
        StorageBackend::<Value>::get_setting(&database, USE_DATABASE_KEY)
            .await
            .unwrap(),
        Some(json!(true))
    );
    let local = LocalBackend::new(store);
    assert!(local.settings().unwrap().use_database);
    // Copy, not move
    assert_eq!(local.project_ids().unwrap().len(), 3);
}

#[tokio::test]
async fn test_incomplete_migration_is_retried() {
    let store = MemoryStore::new();
    let seeded = seed_local_projects(&store, 2);

    let broken = SqliteBackend::in_memory().await.unwrap();
    broken.close().await;
    let context = StorageContext::new(LocalBackend::new(store.clone()), Some(broken));
    let report = context.ensure_migrated().await.clone();

    assert!(!report.database_authoritative);
    assert_eq!(report.copied_projects, 0);
    assert!(!LocalBackend::new(store.clone()).settings().unwrap().use_database);

    // The next process has a working database and finishes the job
    let database = SqliteBackend::in_memory().await.unwrap();
    let context = StorageContext::new(LocalBackend::new(store), Some(database.clone()));
    let report = context.ensure_migrated().await.clone();

    assert!(report.database_authoritative);
    assert_eq!(report.copied_projects, seeded.len());
    let listed = StorageBackend::<Value>::list_projects(&database).await.unwrap();
    assert_eq!(listed.len(), seeded.len());
}

#[tokio::test]
async fn test_authoritative_database_is_not_migrated_again() {
    let store = MemoryStore::new();
    seed_local_projects(&store, 1);
    let database = SqliteBackend::in_memory().await.unwrap();
    StorageBackend::<Value>::put_setting(&database, USE_DATABASE_KEY, &json!(true))
        .await
        .unwrap();

    let context = StorageContext::new(LocalBackend::new(store), Some(database.clone()));
    let report = context.ensure_migrated().await.clone();

    assert!(report.database_authoritative);
    assert_eq!(report.copied_projects, 0);
    assert!(StorageBackend::<Value>::list_projects(&database)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_concurrent_first_calls_share_one_migration() {
    let store = MemoryStore::new();
    store
        .set_item("old-project-data", r#"{"projectName":"Legacy Project","kpis":[]}"#)
        .unwrap();
    let first = local_only(&store);
    let second = first.clone();

    let (a, b) = tokio::join!(
        StorageBackend::<Value>::list_projects(&first),
        StorageBackend::<Value>::list_projects(&second),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
    assert_eq!(a[0].id, b[0].id);
    assert_eq!(LocalBackend::new(store).project_ids().unwrap(), vec![a[0].id.clone()]);
    assert_eq!(
        first.context().migration_report().and_then(|r| r.recovered_from.as_deref()),
        Some("old-project-data")
    );
}
