//! # OnePager Storage
//!
//! Durable storage for projects, their undo history and app settings.
//!
//! ```text
//!                 ┌──────────────────┐
//!   editor ──────▶│ FallbackStorage  │
//!                 └────────┬─────────┘
//!                          │ ensure_migrated() once per process
//!                 ┌────────▼─────────┐
//!                 │ StorageContext   │── settings cache
//!                 └───┬──────────┬───┘
//!        authoritative│          │otherwise / on failure
//!                ┌────▼────┐ ┌───▼──────────┐
//!                │ SQLite  │ │ LocalBackend │── KeyValueStore (quota)
//!                └─────────┘ └──────────────┘
//! ```
//!
//! Both backends implement [`StorageBackend`] and are generic over the
//! stored document type.

pub mod backend;
pub mod context;
pub mod error;
pub mod fallback;
pub mod kv;
pub mod local;
pub mod migration;
pub mod project;
pub mod settings;
pub mod sqlite;

pub use backend::StorageBackend;
pub use context::StorageContext;
pub use error::{StorageError, StorageResult};
pub use fallback::FallbackStorage;
pub use kv::{FileStore, KeyValueStore, MemoryStore, DEFAULT_QUOTA_BYTES};
pub use local::{
    history_key, project_key, LocalBackend, ACTIVE_PROJECT_KEY, HISTORY_KEY_PREFIX, MIGRATED_KEY,
    PROJECTS_INDEX_KEY, PROJECT_KEY_PREFIX, SETTINGS_KEY,
};
pub use migration::{LegacyScan, MigrationReport, DEFAULT_MIGRATED_NAME};
pub use project::{new_project_id, Project};
pub use settings::{Settings, USE_DATABASE_KEY};
pub use sqlite::{SqliteBackend, ACTIVE_PROJECT_SETTING};
