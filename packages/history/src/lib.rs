//! # OnePager History
//!
//! Undo/redo over whole-document snapshots.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ editor surface: produces a new document     │
//! └─────────────────────────────────────────────┘
//!                     ↓ push
//! ┌─────────────────────────────────────────────┐
//! │ history: past ← present → future            │
//! │  - dedup of unchanged documents             │
//! │  - FIFO eviction beyond max_history         │
//! │  - new edits drop redo information          │
//! └─────────────────────────────────────────────┘
//!                     ↓ persisted by project id
//! ┌─────────────────────────────────────────────┐
//! │ storage: one history record per project     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Every operation is a total function from one [`HistoryState`] to the
//! next. Nothing here fails or suspends.
//!
//! ## Usage
//!
//! ```rust
//! use onepager_history::{HistoryConfig, HistoryEngine};
//!
//! let engine = HistoryEngine::new(HistoryConfig::with_max_history(3));
//! let history = engine.create("A".to_string());
//! let history = engine.push(history, "B".to_string());
//! assert!(history.can_undo());
//!
//! let history = engine.undo(history);
//! assert_eq!(history.present, "A");
//! ```

mod config;
mod document;
mod history;

pub use config::{HistoryConfig, DEFAULT_MAX_HISTORY};
pub use document::Document;
pub use history::{HistoryEngine, HistoryState};
