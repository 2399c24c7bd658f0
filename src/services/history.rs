//! History store — the canonical stroke timeline plus its redo buffer.
//!
//! DESIGN
//! ======
//! One global linear timeline shared by every participant. Undo pops the
//! newest stroke regardless of who drew it; redo restores the most recently
//! undone one. Accepting a new stroke discards the redo buffer.
//!
//! Every accepted stroke lives in exactly one of `history` or `redo`, or was
//! discarded with the redo buffer. `ids` mirrors the union of both so a
//! resubmitted stroke cannot appear twice. Pure data; no I/O, no locking.

use std::collections::HashSet;

use crate::state::{StrokeAction, ValidationError};

/// Outcome of `undo` / `redo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Changed,
    NoOp,
}

#[derive(Debug)]
pub struct HistoryStore {
    history: Vec<StrokeAction>,
    redo: Vec<StrokeAction>,
    ids: HashSet<String>,
    max_points: usize,
}

impl HistoryStore {
    #[must_use]
    pub fn new(max_points: usize) -> Self {
        Self { history: Vec::new(), redo: Vec::new(), ids: HashSet::new(), max_points }
    }

    /// Accept a completed stroke at the tail and discard the redo buffer.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` and leaves the store untouched if the
    /// stroke is degenerate or its id was already accepted.
    pub fn append(&mut self, action: StrokeAction) -> Result<(), ValidationError> {
        action.validate(self.max_points)?;
        if self.ids.contains(&action.id) && !self.redo.iter().any(|a| a.id == action.id) {
            return Err(ValidationError::DuplicateId(action.id));
        }

        for discarded in self.redo.drain(..) {
            self.ids.remove(&discarded.id);
        }
        self.ids.insert(action.id.clone());
        self.history.push(action);
        Ok(())
    }

    pub fn undo(&mut self) -> Change {
        let Some(action) = self.history.pop() else {
            return Change::NoOp;
        };
        self.redo.push(action);
        Change::Changed
    }

    /// Restore the most recently undone stroke. Leaves the rest of the redo
    /// buffer in place.
    pub fn redo(&mut self) -> Change {
        let Some(action) = self.redo.pop() else {
            return Change::NoOp;
        };
        self.history.push(action);
        Change::Changed
    }

    /// Current timeline in draw order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<StrokeAction> {
        self.history.clone()
    }

    /// Drop everything. Reset tooling only; not reachable from the live protocol.
    pub fn clear(&mut self) {
        self.history.clear();
        self.redo.clear();
        self.ids.clear();
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
