//! One-time migration run before the first storage operation of a process.
//!
//! Two passes, in order:
//!
//! 1. Legacy recovery: scan the local store for a pre-projects document and
//!    turn the first recognizable one into a project.
//! 2. Backend migration: copy every local project, its history and the
//!    active pointer into the database, then mark the database authoritative.
//!
//! Both passes copy and never delete local data. Failures are logged and
//! skipped; nothing here propagates an error to storage callers.

use onepager_history::HistoryState;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    new_project_id, KeyValueStore, LocalBackend, Project, StorageBackend, StorageContext,
    StorageResult, ACTIVE_PROJECT_KEY, HISTORY_KEY_PREFIX, MIGRATED_KEY, PROJECTS_INDEX_KEY,
    PROJECT_KEY_PREFIX, SETTINGS_KEY, USE_DATABASE_KEY,
};

/// Name given to a recovered document without a `projectName`
pub const DEFAULT_MIGRATED_NAME: &str = "Migrated Project";

/// Heuristics for spotting a legacy document among unrelated keys.
///
/// Recovery is lossy: only the first match is kept and any other legacy
/// documents stay where they are.
#[derive(Debug, Clone)]
pub struct LegacyScan {
    /// Case-insensitive substrings that make a key a candidate
    pub key_hints: Vec<String>,
    pub excluded_prefixes: Vec<String>,
    pub denylist: Vec<String>,
    /// A candidate needs at least one of these top-level fields
    pub recognized_fields: Vec<String>,
    pub default_name: String,
}

impl Default for LegacyScan {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            key_hints: owned(&["project", "onepager", "data"]),
            excluded_prefixes: owned(&[HISTORY_KEY_PREFIX, PROJECT_KEY_PREFIX, "pref."]),
            denylist: owned(&[
                PROJECTS_INDEX_KEY,
                ACTIVE_PROJECT_KEY,
                SETTINGS_KEY,
                MIGRATED_KEY,
                "tp",
                "comments",
                "theme",
            ]),
            recognized_fields: owned(&["projectName", "yearGantt", "quarterGantt", "kpis"]),
            default_name: DEFAULT_MIGRATED_NAME.to_string(),
        }
    }
}

impl LegacyScan {
    pub fn is_candidate(&self, key: &str) -> bool {
        if self.denylist.iter().any(|denied| denied == key) {
            return false;
        }
        if self.excluded_prefixes.iter().any(|prefix| key.starts_with(prefix.as_str())) {
            return false;
        }
        let lowered = key.to_lowercase();
        self.key_hints.iter().any(|hint| lowered.contains(hint.as_str()))
    }

    pub fn recognizes(&self, value: &Value) -> bool {
        match value.as_object() {
            Some(fields) => self
                .recognized_fields
                .iter()
                .any(|field| fields.contains_key(field)),
            None => false,
        }
    }

    fn project_name(&self, value: &Value) -> String {
        value
            .get("projectName")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.default_name.clone())
    }
}

/// What the coordinator did in this process
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    /// Legacy key the recovered project came from
    pub recovered_from: Option<String>,
    pub recovered_project_id: Option<String>,
    /// Projects copied into the database
    pub copied_projects: usize,
    pub failed_copies: usize,
    /// The database is the source of truth after this run
    pub database_authoritative: bool,
}

/// Look for a legacy document and promote it to the only project.
///
/// Runs only when the flag is absent and there is no project index yet, and
/// sets the flag whatever the outcome.
pub fn recover_legacy<S: KeyValueStore>(
    local: &LocalBackend<S>,
    scan: &LegacyScan,
) -> StorageResult<Option<(String, Project<Value>)>> {
    if local.is_legacy_scan_done()? {
        debug!("Legacy scan already done");
        return Ok(None);
    }
    if !local.project_ids()?.is_empty() {
        local.mark_legacy_scan_done()?;
        return Ok(None);
    }

    let mut recovered = None;
    for key in local.store().keys()? {
        if !scan.is_candidate(&key) {
            continue;
        }
        let raw = match local.store().get_item(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(err) => {
                warn!(key = %key, error = %err, "Cannot read legacy candidate");
                continue;
            }
        };
        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(key = %key, error = %err, "Skipping unparseable legacy candidate");
                continue;
            }
        };
        if !scan.recognizes(&value) {
            continue;
        }

        info!("Found valid project data in key: {}", key);
        let mut project = Project::draft(scan.project_name(&value), value);
        project.stamp(new_project_id);

        match persist_recovered(local, &project) {
            Ok(()) => {
                info!(project_id = %project.id, "Successfully migrated from {}", key);
                recovered = Some((key, project));
                break;
            }
            Err(err) => warn!(key = %key, error = %err, "Failed to store recovered project"),
        }
    }

    local.mark_legacy_scan_done()?;
    Ok(recovered)
}

fn persist_recovered<S: KeyValueStore>(
    local: &LocalBackend<S>,
    project: &Project<Value>,
) -> StorageResult<()> {
    local.store_project(project)?;
    local.set_project_ids(std::slice::from_ref(&project.id))?;
    // Indexed means recovered; the active pointer is optional
    if let Err(err) = local.set_active_project_id(Some(&project.id)) {
        warn!(project_id = %project.id, error = %err, "Cannot mark recovered project active");
    }
    Ok(())
}

/// Copy local projects into the database unless it is already authoritative
async fn migrate_backend<A, S>(context: &StorageContext<A, S>, report: &mut MigrationReport)
where
    A: StorageBackend<Value>,
    S: KeyValueStore,
{
    let Some(database) = context.database() else {
        debug!("No database backend, staying on local storage");
        return;
    };

    let settings = context.settings().await;
    if settings.use_database {
        report.database_authoritative = true;
        return;
    }

    let local = context.local();
    let projects: Vec<Project<Value>> = match local.projects() {
        Ok(projects) => projects,
        Err(err) => {
            warn!(error = %err, "Cannot read local projects, skipping backend migration");
            return;
        }
    };
    let active = local.active_project_id().unwrap_or_else(|err| {
        warn!(error = %err, "Cannot read local active project");
        None
    });

    if projects.is_empty() && active.is_none() {
        info!("Nothing to migrate, switching to database storage");
    } else {
        info!(projects = projects.len(), "Migrating local projects to database");
    }

    for project in &projects {
        match copy_project(local, database, project).await {
            Ok(()) => report.copied_projects += 1,
            Err(err) => {
                report.failed_copies += 1;
                warn!(project_id = %project.id, error = %err, "Failed to copy project to database");
            }
        }
    }

    if let Some(id) = active.as_deref() {
        if let Err(err) = database.set_active_project_id(Some(id)).await {
            report.failed_copies += 1;
            warn!(error = %err, "Failed to copy active project to database");
        }
    }

    if report.failed_copies > 0 {
        warn!(
            failed = report.failed_copies,
            "Backend migration incomplete, will retry on next start"
        );
        return;
    }

    match context
        .update_setting(USE_DATABASE_KEY, Value::Bool(true))
        .await
    {
        Ok(()) => {
            report.database_authoritative = true;
            info!(copied = report.copied_projects, "Migration to database complete");
        }
        Err(err) => warn!(error = %err, "Failed to mark database authoritative"),
    }
}

async fn copy_project<A, S>(
    local: &LocalBackend<S>,
    database: &A,
    project: &Project<Value>,
) -> StorageResult<()>
where
    A: StorageBackend<Value>,
    S: KeyValueStore,
{
    database.put_project_record(project).await?;
    let history: Option<HistoryState<Value>> = local.history(&project.id)?;
    if let Some(history) = history {
        database.put_history(&project.id, &history).await?;
    }
    Ok(())
}

/// Run both passes; called once per context through its once-cell
pub(crate) async fn run<A, S>(context: &StorageContext<A, S>) -> MigrationReport
where
    A: StorageBackend<Value>,
    S: KeyValueStore,
{
    info!("Migration check starting");
    let mut report = MigrationReport::default();

    match recover_legacy(context.local(), context.legacy_scan()) {
        Ok(Some((key, project))) => {
            report.recovered_from = Some(key);
            report.recovered_project_id = Some(project.id);
        }
        Ok(None) => {}
        Err(err) => warn!(error = %err, "Legacy recovery failed"),
    }

    migrate_backend(context, &mut report).await;
    report
}
