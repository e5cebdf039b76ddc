//! # Undo/Redo History
//!
//! Tracks whole-document snapshots and enables undo/redo.
//!
//! ## Design
//!
//! - `past` holds earlier presents, oldest first
//! - `future` holds undone presents, nearest first
//! - Undo moves the newest `past` entry into `present`
//! - Redo moves the nearest `future` entry into `present`
//! - Pushing a new document clears `future`
//! - Pushing a document equal to `present` changes nothing
//! - `past` never grows beyond the configured bound; the oldest entry goes first

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{Document, HistoryConfig};

/// The persisted past/present/future triple for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryState<D> {
    /// Earlier documents, oldest first
    pub past: VecDeque<D>,

    /// The current document
    pub present: D,

    /// Undone documents, nearest first
    pub future: VecDeque<D>,
}

impl<D: Document> HistoryState<D> {
    /// Seed a history with no undo or redo information
    pub fn new(initial: D) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial,
            future: VecDeque::new(),
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.past.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.future.len()
    }

    /// Step back one document. Returns `self` unchanged when there is nothing to undo.
    pub fn undo(mut self) -> Self {
        if let Some(previous) = self.past.pop_back() {
            let current = std::mem::replace(&mut self.present, previous);
            self.future.push_front(current);
        }
        self
    }

    /// Step forward one document. Returns `self` unchanged when there is nothing to redo.
    pub fn redo(mut self) -> Self {
        if let Some(next) = self.future.pop_front() {
            let current = std::mem::replace(&mut self.present, next);
            self.past.push_back(current);
        }
        self
    }

    /// Record `next` as the new present.
    ///
    /// A document equal to the present is ignored so that repeated saves of
    /// an unchanged document do not fill the history. Otherwise the old
    /// present joins `past`, the oldest entries are evicted until `past`
    /// fits in `max_history` and `future` is cleared.
    pub fn push(mut self, next: D, max_history: usize) -> Self {
        if next == self.present {
            return self;
        }

        let previous = std::mem::replace(&mut self.present, next);
        self.past.push_back(previous);

        // Also restores the bound on records that arrived oversized
        while self.past.len() > max_history {
            self.past.pop_front();
        }

        self.future.clear();
        self
    }
}

/// History operations bound to one [`HistoryConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryEngine {
    config: HistoryConfig,
}

impl HistoryEngine {
    pub fn new(config: HistoryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> HistoryConfig {
        self.config
    }

    pub fn max_history(&self) -> usize {
        self.config.max_history
    }

    pub fn create<D: Document>(&self, initial: D) -> HistoryState<D> {
        HistoryState::new(initial)
    }

    pub fn can_undo<D: Document>(&self, history: &HistoryState<D>) -> bool {
        history.can_undo()
    }

    pub fn can_redo<D: Document>(&self, history: &HistoryState<D>) -> bool {
        history.can_redo()
    }

    pub fn undo<D: Document>(&self, history: HistoryState<D>) -> HistoryState<D> {
        history.undo()
    }

    pub fn redo<D: Document>(&self, history: HistoryState<D>) -> HistoryState<D> {
        history.redo()
    }

    pub fn push<D: Document>(&self, history: HistoryState<D>, next: D) -> HistoryState<D> {
        history.push(next, self.config.max_history)
    }
}
