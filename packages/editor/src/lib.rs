//! # OnePager Editor
//!
//! The interface an editor surface drives: open and switch projects,
//! commit edits, undo and redo, manage projects, export and import JSON.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ editor surface (CLI, UI)                    │
//! └─────────────────────────────────────────────┘
//!                     ↓ commit_edit / undo / redo
//! ┌─────────────────────────────────────────────┐
//! │ registry: project ids → document + history  │
//! │  - push/undo/redo through the history engine│
//! │  - in-memory history ahead of storage       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ storage: fallback over SQLite / local store │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use onepager_editor::ProjectRegistry;
//!
//! let mut registry = ProjectRegistry::new(storage, engine);
//! let snapshot = registry.load_active_or_create_default().await?;
//!
//! let mut next = snapshot.document().clone();
//! next.goal = "Ship it".to_string();
//! let snapshot = registry.commit_edit(&snapshot.project, next).await?;
//!
//! let snapshot = registry.undo(&snapshot.project).await?;
//! ```

mod errors;
mod export;
mod registry;

pub use errors::{EditorError, EditorResult};
pub use export::{export_document, export_file_name, import_document};
pub use registry::{NewDocument, ProjectRegistry, Snapshot, DEFAULT_PROJECT_NAME};
