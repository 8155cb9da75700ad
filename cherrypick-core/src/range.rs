//! Anchor/cursor interval over view rows, committed to the selection on close.

use crate::store::CommitStore;
use crate::view::remap_index;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RangeSelector {
    // (anchor, floating end) while open
    bounds: Option<(usize, usize)>,
}

impl RangeSelector {
    pub fn is_open(&self) -> bool {
        self.bounds.is_some()
    }

    /// Starts a fresh range with both ends on `cursor`.
    pub fn open(&mut self, cursor: usize) {
        self.bounds = Some((cursor, cursor));
    }

    /// Moves the floating end. No-op while closed.
    pub fn update(&mut self, cursor: usize) {
        if let Some((_, end)) = self.bounds.as_mut() {
            *end = cursor;
        }
    }

    /// Inclusive `(min, max)` over view rows, or `None` while closed.
    pub fn span(&self) -> Option<(usize, usize)> {
        self.bounds.map(|(a, b)| (a.min(b), a.max(b)))
    }

    pub fn is_in_range(&self, row: usize) -> bool {
        self.span().is_some_and(|(lo, hi)| (lo..=hi).contains(&row))
    }

    /// Closes the range, marking every non-applied commit inside it.
    ///
    /// `view` maps view rows to backing indices. Returns how many were marked.
    pub fn close(&mut self, store: &mut CommitStore, view: &[usize]) -> usize {
        let Some((lo, hi)) = self.span() else {
            return 0;
        };
        self.bounds = None;
        store.mark_all((lo..=hi).filter_map(|row| view.get(row).copied()))
    }

    /// Closes without touching the selection.
    pub fn cancel(&mut self) {
        self.bounds = None;
    }

    /// Mirrors both ends after the view of length `len` was reversed.
    pub fn remap(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        if let Some((a, b)) = self.bounds {
            let (a, b) = (remap_index(a.min(len - 1), len), remap_index(b.min(len - 1), len));
            self.bounds = Some((a.min(b), a.max(b)));
        }
    }

    /// Pulls both ends inside a view that shrank to `len` rows.
    pub fn clamp(&mut self, len: usize) {
        let last = len.saturating_sub(1);
        if let Some((a, b)) = self.bounds.as_mut() {
            *a = (*a).min(last);
            *b = (*b).min(last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommitRecord, RawCommit};

    fn store(applied: &[bool]) -> CommitStore {
        CommitStore::new(
            applied
                .iter()
                .enumerate()
                .map(|(i, &a)| {
                    CommitRecord::from_raw(
                        RawCommit { id: format!("c{i}"), timestamp: 50 - i as i64, ..RawCommit::default() },
                        a,
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn closing_marks_the_inclusive_interval() {
        let mut s = store(&[false, false, false, false]);
        let view: Vec<usize> = (0..4).collect();
        let mut range = RangeSelector::default();
        range.open(0);
        range.update(2);
        assert_eq!(range.close(&mut s, &view), 3);
        assert_eq!(s.selected_ids(), vec!["c0", "c1", "c2"]);
        assert!(!range.is_open());
    }

    #[test]
    fn interval_is_order_independent_and_skips_applied() {
        let mut s = store(&[false, true, false, false]);
        let view: Vec<usize> = (0..4).collect();
        let mut range = RangeSelector::default();
        range.open(3);
        range.update(0);
        assert!(range.is_in_range(1));
        range.close(&mut s, &view);
        assert!(!s.is_selected("c1"));
        assert_eq!(s.selected_count(), 3);
    }

    #[test]
    fn close_uses_view_rows_not_backing_indices() {
        let mut s = store(&[false, false, false, false]);
        let view = vec![1, 3];
        let mut range = RangeSelector::default();
        range.open(0);
        range.update(1);
        range.close(&mut s, &view);
        assert_eq!(s.selected_ids(), vec!["c1", "c3"]);
    }

    #[test]
    fn nothing_is_in_range_while_closed() {
        let mut range = RangeSelector::default();
        assert!(!range.is_in_range(0));
        range.open(2);
        range.cancel();
        assert!(!range.is_in_range(2));
    }

    #[test]
    fn reopening_starts_a_fresh_anchor() {
        let mut s = store(&[false, false, false]);
        let view: Vec<usize> = (0..3).collect();
        let mut range = RangeSelector::default();
        range.open(0);
        range.update(1);
        range.close(&mut s, &view);
        range.open(2);
        assert_eq!(range.span(), Some((2, 2)));
    }

    #[test]
    fn remap_mirrors_and_normalises() {
        let mut range = RangeSelector::default();
        range.open(0);
        range.update(1);
        range.remap(4);
        assert_eq!(range.span(), Some((2, 3)));
    }
}
