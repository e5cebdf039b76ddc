//! Synchronous backend over a [`KeyValueStore`].
//!
//! Layout:
//!
//! ```text
//! mars-onepager-projects   ["<id>", ...]          projects index, in creation order
//! mars-project-<id>        {id, name, data, ...}  one record per project
//! mars-history-<id>        {past, present, future}
//! mars-onepager-settings   {"useIndexedDB": bool, ...}
//! mars-onepager-active     <id>                   plain string
//! mars-migrated            "true"                 legacy recovery done
//! ```

use onepager_history::{Document, HistoryState};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::{KeyValueStore, Project, Settings, StorageBackend, StorageResult};

pub const PROJECTS_INDEX_KEY: &str = "mars-onepager-projects";
pub const PROJECT_KEY_PREFIX: &str = "mars-project-";
pub const HISTORY_KEY_PREFIX: &str = "mars-history-";
pub const SETTINGS_KEY: &str = "mars-onepager-settings";
pub const ACTIVE_PROJECT_KEY: &str = "mars-onepager-active";
pub const MIGRATED_KEY: &str = "mars-migrated";

pub fn project_key(id: &str) -> String {
    format!("{}{}", PROJECT_KEY_PREFIX, id)
}

pub fn history_key(id: &str) -> String {
    format!("{}{}", HISTORY_KEY_PREFIX, id)
}

#[derive(Debug, Clone)]
pub struct LocalBackend<S> {
    store: S,
}

impl<S: KeyValueStore> LocalBackend<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Parse the JSON value under `key`; a missing key is `Ok(None)`
    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.store.get_item(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn write_json<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set_item(key, &raw)
    }

    /// Read a record, treating an unparseable one as absent
    fn read_record<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.read_json(key) {
            Ok(found) => Ok(found),
            Err(crate::StorageError::Serialization(err)) => {
                warn!(key, error = %err, "Skipping corrupt record");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub fn project_ids(&self) -> StorageResult<Vec<String>> {
        Ok(self
            .read_record::<Vec<String>>(PROJECTS_INDEX_KEY)?
            .unwrap_or_default())
    }

    pub fn set_project_ids(&self, ids: &[String]) -> StorageResult<()> {
        self.write_json(PROJECTS_INDEX_KEY, &ids)
    }

    pub fn project<D: Document>(&self, id: &str) -> StorageResult<Option<Project<D>>> {
        self.read_record(&project_key(id))
    }

    /// Projects in index order; missing or corrupt records are skipped
    pub fn projects<D: Document>(&self) -> StorageResult<Vec<Project<D>>> {
        let mut projects = Vec::new();
        for id in self.project_ids()? {
            match self.project(&id)? {
                Some(project) => projects.push(project),
                None => warn!(project_id = %id, "Project listed in index has no readable record"),
            }
        }
        Ok(projects)
    }

    /// Write the record first, then add it to the index, so a rejected
    /// write never leaves a dangling index entry
    pub fn store_project<D: Document>(&self, project: &Project<D>) -> StorageResult<()> {
        self.write_json(&project_key(&project.id), project)?;

        let mut ids = self.project_ids()?;
        if !ids.iter().any(|id| id == &project.id) {
            ids.push(project.id.clone());
            self.set_project_ids(&ids)?;
        }
        Ok(())
    }

    pub fn remove_project(&self, id: &str) -> StorageResult<()> {
        let mut ids = self.project_ids()?;
        let before = ids.len();
        ids.retain(|existing| existing != id);
        if ids.len() != before {
            self.set_project_ids(&ids)?;
        }

        self.store.remove_item(&project_key(id))?;
        self.store.remove_item(&history_key(id))?;

        if self.active_project_id()?.as_deref() == Some(id) {
            self.set_active_project_id(None)?;
        }
        Ok(())
    }

    pub fn history<D: Document>(&self, id: &str) -> StorageResult<Option<HistoryState<D>>> {
        self.read_record(&history_key(id))
    }

    pub fn store_history<D: Document>(&self, id: &str, state: &HistoryState<D>) -> StorageResult<()> {
        self.write_json(&history_key(id), state)
    }

    pub fn remove_history(&self, id: &str) -> StorageResult<()> {
        self.store.remove_item(&history_key(id))
    }

    pub fn settings(&self) -> StorageResult<Settings> {
        Ok(self.read_record(SETTINGS_KEY)?.unwrap_or_default())
    }

    pub fn store_settings(&self, settings: &Settings) -> StorageResult<()> {
        self.write_json(SETTINGS_KEY, settings)
    }

    pub fn setting(&self, key: &str) -> StorageResult<Option<Value>> {
        Ok(self.settings()?.get(key))
    }

    pub fn store_setting(&self, key: &str, value: &Value) -> StorageResult<()> {
        let mut settings = self.settings()?;
        settings.set(key, value.clone());
        self.store_settings(&settings)
    }

    pub fn active_project_id(&self) -> StorageResult<Option<String>> {
        Ok(self
            .store
            .get_item(ACTIVE_PROJECT_KEY)?
            .filter(|id| !id.is_empty()))
    }

    pub fn set_active_project_id(&self, id: Option<&str>) -> StorageResult<()> {
        match id {
            Some(id) => self.store.set_item(ACTIVE_PROJECT_KEY, id),
            None => self.store.remove_item(ACTIVE_PROJECT_KEY),
        }
    }

    pub fn is_legacy_scan_done(&self) -> StorageResult<bool> {
        Ok(self.store.get_item(MIGRATED_KEY)?.is_some())
    }

    pub fn mark_legacy_scan_done(&self) -> StorageResult<()> {
        self.store.set_item(MIGRATED_KEY, "true")
    }
}

impl<D: Document, S: KeyValueStore> StorageBackend<D> for LocalBackend<S> {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn get_project(&self, id: &str) -> StorageResult<Option<Project<D>>> {
        self.project(id)
    }

    async fn put_project_record(&self, project: &Project<D>) -> StorageResult<()> {
        self.store_project(project)
    }

    async fn delete_project(&self, id: &str) -> StorageResult<()> {
        self.remove_project(id)
    }

    async fn list_projects(&self) -> StorageResult<Vec<Project<D>>> {
        self.projects()
    }

    async fn get_history(&self, id: &str) -> StorageResult<Option<HistoryState<D>>> {
        self.history(id)
    }

    async fn put_history(&self, id: &str, state: &HistoryState<D>) -> StorageResult<()> {
        self.store_history(id, state)
    }

    async fn delete_history(&self, id: &str) -> StorageResult<()> {
        self.remove_history(id)
    }

    async fn get_setting(&self, key: &str) -> StorageResult<Option<Value>> {
        self.setting(key)
    }

    async fn put_setting(&self, key: &str, value: &Value) -> StorageResult<()> {
        self.store_setting(key, value)
    }

    async fn get_active_project_id(&self) -> StorageResult<Option<String>> {
        self.active_project_id()
    }

    async fn set_active_project_id(&self, id: Option<&str>) -> StorageResult<()> {
        LocalBackend::set_active_project_id(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, StorageError};
    use serde_json::json;

    fn backend() -> LocalBackend<MemoryStore> {
        LocalBackend::new(MemoryStore::new())
    }

    fn saved(id: &str, name: &str) -> Project<Value> {
        let mut project = Project::draft(name, json!({ "projectName": name }));
        project.stamp(|| id.to_string());
        project
    }

    #[test]
    fn test_store_project_updates_index_once() {
        let local = backend();
        local.store_project(&saved("p1", "One")).unwrap();
        local.store_project(&saved("p2", "Two")).unwrap();
        local.store_project(&saved("p1", "One again")).unwrap();

        assert_eq!(local.project_ids().unwrap(), vec!["p1", "p2"]);
        let projects: Vec<Project<Value>> = local.projects().unwrap();
        assert_eq!(projects[0].name, "One again");
    }

    #[test]
    fn test_remove_project_clears_history_and_active() {
        let local = backend();
        local.store_project(&saved("p1", "One")).unwrap();
        local
            .store_history("p1", &HistoryState::new(json!({ "projectName": "One" })))
            .unwrap();
        local.set_active_project_id(Some("p1")).unwrap();

        local.remove_project("p1").unwrap();

        assert!(local.project_ids().unwrap().is_empty());
        assert!(local.history::<Value>("p1").unwrap().is_none());
        assert_eq!(local.active_project_id().unwrap(), None);
    }

    #[test]
    fn test_remove_project_keeps_unrelated_active_pointer() {
        let local = backend();
        local.store_project(&saved("p1", "One")).unwrap();
        local.store_project(&saved("p2", "Two")).unwrap();
        local.set_active_project_id(Some("p2")).unwrap();

        local.remove_project("p1").unwrap();
        assert_eq!(local.active_project_id().unwrap(), Some("p2".to_string()));
    }

    #[test]
    fn test_corrupt_records_are_skipped() {
        let local = backend();
        local.store_project(&saved("p1", "One")).unwrap();
        local.store_project(&saved("p2", "Two")).unwrap();
        local.store().set_item(&project_key("p1"), "{not json").unwrap();
        local.store().set_item(&history_key("p2"), "[1, 2").unwrap();

        let projects: Vec<Project<Value>> = local.projects().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, "p2");
        assert_eq!(local.project_ids().unwrap(), vec!["p1", "p2"]);
        assert!(local.history::<Value>("p2").unwrap().is_none());
    }

    #[test]
    fn test_rejected_record_leaves_index_untouched() {
        let local = LocalBackend::new(MemoryStore::with_quota(64));
        let mut big = saved("p1", "One");
        big.data = json!({ "comments": "x".repeat(200) });

        let err = local.store_project(&big).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert!(local.project_ids().unwrap().is_empty());
    }

    #[test]
    fn test_settings_round_trip() {
        let local = backend();
        assert_eq!(local.setting(crate::USE_DATABASE_KEY).unwrap(), Some(json!(false)));
        local.store_setting(crate::USE_DATABASE_KEY, &json!(true)).unwrap();
        local.store_setting("theme", &json!("dark")).unwrap();

        let raw = local.store().get_item(SETTINGS_KEY).unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, json!({ "useIndexedDB": true, "theme": "dark" }));
    }

    #[test]
    fn test_legacy_scan_flag() {
        let local = backend();
        assert!(!local.is_legacy_scan_done().unwrap());
        local.mark_legacy_scan_done().unwrap();
        assert!(local.is_legacy_scan_done().unwrap());
    }
}
