//! Bounded snapshot-based undo/redo.
//!
//! Each snapshot is the whole buffer record (content, line index, cursor,
//! selection, search terms, coloring) taken immediately before a mutation.
//! The store and coloring are structurally shared, so a snapshot costs O(1)
//! in content size. The stacks themselves are never part of a snapshot:
//! after a restore, undo/redo bookkeeping reflects the push that the restore
//! performed, not whatever the snapshot saw historically.

use std::collections::VecDeque;

use crate::buffer::Coloring;
use crate::cursor::Location;
use crate::line_index::LineIndex;
use crate::search::SearchState;
use crate::selection::Selection;
use crate::text_store::TextStore;

/// Maximum entries per stack; pushing past this evicts the oldest entry.
pub const HISTORY_CAP: usize = 50;

/// An immutable pre-mutation copy of the buffer record
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub store: TextStore,
    pub lines: LineIndex,
    pub cursor: Location,
    pub selection: Selection,
    pub search: SearchState,
    pub coloring: Coloring,
}

/// The undo and redo stacks, both bounded at [`HISTORY_CAP`]
#[derive(Debug, Default)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: VecDeque<Snapshot>,
}

fn push_bounded(stack: &mut VecDeque<Snapshot>, snap: Snapshot) {
    if stack.len() == HISTORY_CAP {
        stack.pop_front();
    }
    stack.push_back(snap);
}

impl History {
    /// Record the pre-mutation state of the buffer. Clears redo: a new edit
    /// invalidates any previously undone future.
    pub fn record(&mut self, snap: Snapshot) {
        push_bounded(&mut self.undo, snap);
        self.redo.clear();
    }

    /// Pop the most recent undo entry, pushing `current` onto redo.
    /// Returns `None` (and discards nothing) when there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let restored = self.undo.pop_back()?;
        push_bounded(&mut self.redo, current);
        Some(restored)
    }

    /// Pop the most recent redo entry, pushing `current` onto undo
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let restored = self.redo.pop_back()?;
        push_bounded(&mut self.undo, current);
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn snap(content: &str) -> Snapshot {
        let store = TextStore::from_str(content);
        let lines = LineIndex::from_store(&store);
        Snapshot {
            store,
            lines,
            cursor: Location::default(),
            selection: Selection::default(),
            search: SearchState::default(),
            coloring: Arc::new(Vec::new()),
        }
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = History::default();
        history.record(snap("a\n"));
        history.undo(snap("b\n")).unwrap();
        assert!(history.can_redo());
        history.record(snap("c\n"));
        assert!(!history.can_redo());
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_undo_on_empty_stack() {
        let mut history = History::default();
        assert!(history.undo(snap("a\n")).is_none());
        assert!(!history.can_redo(), "failed undo must not touch redo");
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut history = History::default();
        for i in 0..=HISTORY_CAP {
            history.record(snap(&format!("{i}\n")));
        }
        assert_eq!(history.undo_depth(), HISTORY_CAP);
        // Unwind everything: the deepest reachable state is edit 1, not edit 0
        let mut deepest = None;
        while history.can_undo() {
            deepest = history.undo(snap("current\n"));
        }
        assert_eq!(deepest.unwrap().store.to_string(), "1\n");
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut history = History::default();
        history.record(snap("old\n"));
        let restored = history.undo(snap("new\n")).unwrap();
        assert_eq!(restored.store.to_string(), "old\n");
        let replayed = history.redo(snap("old\n")).unwrap();
        assert_eq!(replayed.store.to_string(), "new\n");
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.redo_depth(), 0);
    }
}
