/// Linear undo/redo log of full snapshots.
///
/// Entries form a gap-free sequence and the cursor points at the entry that matches the live
/// state. Recording after an undo discards the redo branch.
#[derive(Clone, Debug)]
pub struct History<S> {
    entries: Vec<S>,
    cursor: Option<usize>,
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
        }
    }
}

impl<S: Clone> History<S> {
    /// Empty log; the cursor sits before any entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a copy of `state` after the cursor, dropping anything beyond it.
    pub fn record(&mut self, state: &S) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push(state.clone());
        self.cursor = Some(keep);
        tracing::debug!(cursor = keep, entries = self.entries.len(), "history recorded");
    }

    /// Step back one entry. Returns the state to restore, or `None` at the start.
    pub fn undo(&mut self) -> Option<S> {
        let c = self.cursor.filter(|&c| c > 0)?;
        self.cursor = Some(c - 1);
        self.entries.get(c - 1).cloned()
    }

    /// Step forward one entry. Returns the state to restore, or `None` at the end.
    pub fn redo(&mut self) -> Option<S> {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next >= self.entries.len() || self.cursor.is_none() {
            return None;
        }
        self.cursor = Some(next);
        self.entries.get(next).cloned()
    }

    /// Whether [`History::undo`] would move.
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    /// Whether [`History::redo`] would move.
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// Index of the current entry; `None` before the first record.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry under the cursor.
    pub fn current(&self) -> Option<&S> {
        self.cursor.and_then(|c| self.entries.get(c))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/history.rs"]
mod tests;
