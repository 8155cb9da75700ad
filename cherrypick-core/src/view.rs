//! The navigable view layered over the commit store.
//!
//! A view is the ordered list of backing indices currently visible: the
//! search filter applied first, then the optional hide-applied filter. The
//! cursor always indexes into the view, never into the backing sequence.

use crate::search;
use crate::store::CommitStore;
use crate::types::CommitRecord;

/// Maps a position to its mirror after the sequence is reversed.
///
/// `len` must be non-zero and `index < len`.
pub fn remap_index(index: usize, len: usize) -> usize {
    len - 1 - index
}

#[derive(Debug, Default)]
pub struct ViewState {
    cursor: usize,
    query: String,
    hide_applied: bool,
    indices: Vec<usize>,
}

impl ViewState {
    /// Builds the unfiltered view over `commits` with the cursor on the first row.
    pub fn new(commits: &[CommitRecord]) -> Self {
        let mut view = Self::default();
        view.recompute(commits);
        view
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn hide_applied(&self) -> bool {
        self.hide_applied
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Backing indices in view order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Backing index of view row `row`.
    pub fn backing_index(&self, row: usize) -> Option<usize> {
        self.indices.get(row).copied()
    }

    /// Backing index under the cursor, `None` when the view is empty.
    pub fn current(&self) -> Option<usize> {
        self.backing_index(self.cursor)
    }

    /// View row showing backing index `backing`, if visible.
    pub fn row_of(&self, backing: usize) -> Option<usize> {
        self.indices.iter().position(|&i| i == backing)
    }

    /// Re-derives the visible indices from the current filters and clamps the cursor.
    pub fn recompute(&mut self, commits: &[CommitRecord]) {
        let mut indices = search::filter_indices(commits, &self.query);
        if self.hide_applied {
            indices.retain(|&i| !commits[i].already_applied);
        }
        self.indices = indices;
        self.clamp();
    }

    /// Replaces the search query and puts the cursor on the first match.
    pub fn set_query(&mut self, commits: &[CommitRecord], query: &str) {
        self.query = query.to_owned();
        self.recompute(commits);
        self.cursor = 0;
    }

    /// Drops the search filter, restoring every row and clamping the cursor.
    pub fn clear_query(&mut self, commits: &[CommitRecord]) {
        self.query.clear();
        self.recompute(commits);
    }

    /// Turns the hide-applied filter on or off, keeping the focused commit if it stays visible.
    pub fn set_hide_applied(&mut self, commits: &[CommitRecord], hide: bool) {
        let focused = self.current();
        self.hide_applied = hide;
        self.recompute(commits);
        if let Some(row) = focused.and_then(|b| self.row_of(b)) {
            self.cursor = row;
        }
    }

    /// Reverses the backing sequence and re-aims the cursor at the same commit.
    ///
    /// Both filters preserve backing order, so the reversed view is the old
    /// view mirrored and the cursor maps through [`remap_index`].
    pub fn reverse(&mut self, store: &mut CommitStore) {
        store.reverse();
        self.recompute(store.commits());
        if !self.indices.is_empty() {
            self.cursor = remap_index(self.cursor, self.indices.len());
        }
    }

    /// Resets to the unfiltered view of a freshly loaded sequence.
    pub fn reset(&mut self, commits: &[CommitRecord]) {
        self.query.clear();
        self.cursor = 0;
        self.recompute(commits);
    }

    pub fn move_up(&mut self, rows: usize) {
        self.cursor = self.cursor.saturating_sub(rows);
    }

    pub fn move_down(&mut self, rows: usize) {
        self.cursor = self.cursor.saturating_add(rows);
        self.clamp();
    }

    pub fn set_cursor(&mut self, row: usize) {
        self.cursor = row;
        self.clamp();
    }

    fn clamp(&mut self) {
        self.cursor = self.cursor.min(self.indices.len().saturating_sub(1));
    }
}
