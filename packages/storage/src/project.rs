use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named document with its lifecycle timestamps.
///
/// A project starts out with an empty `id`. The first successful save
/// assigns the real id, which never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project<D> {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub data: D,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl<D> Project<D> {
    /// An unsaved project; storage assigns the id and timestamps
    pub fn draft(name: impl Into<String>, data: D) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            data,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_saved(&self) -> bool {
        !self.id.is_empty()
    }

    /// Stamp the id (if still the empty sentinel) and timestamps before a write.
    ///
    /// `created_at` is only filled when missing; `updated_at` always moves.
    pub fn stamp(&mut self, fallback_id: impl FnOnce() -> String) {
        let now = Utc::now();
        if self.id.is_empty() {
            self.id = fallback_id();
        }
        self.created_at.get_or_insert(now);
        self.updated_at = Some(now);
    }
}

/// Fresh project id: creation time in milliseconds plus a random suffix
pub fn new_project_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &suffix[..9])
}
