//! Commit record store and selection set.
//!
//! The store owns the backing sequence of [`CommitRecord`]s and the
//! id → marked mapping. It knows nothing about views or cursors; callers pass
//! backing indices in. The one invariant it enforces is that an
//! already-applied commit can never be marked.

use std::collections::HashMap;

use crate::types::CommitRecord;

#[derive(Debug, Default)]
pub struct CommitStore {
    commits: Vec<CommitRecord>,
    selected: HashMap<String, bool>,
    // Collaborators list newest-first; flipped by every `reverse`.
    oldest_first: bool,
}

impl CommitStore {
    pub fn new(commits: Vec<CommitRecord>) -> Self {
        Self { commits, selected: HashMap::new(), oldest_first: false }
    }

    /// Discards the current generation and clears every mark.
    ///
    /// `commits` must be newest-first, as the collaborator lists them.
    pub fn replace(&mut self, commits: Vec<CommitRecord>) {
        self.commits = commits;
        self.selected.clear();
        self.oldest_first = false;
    }

    pub fn commits(&self) -> &[CommitRecord] {
        &self.commits
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CommitRecord> {
        self.commits.get(index)
    }

    /// Reverses the backing sequence in place. Marks are keyed by id and survive.
    pub fn reverse(&mut self) {
        self.commits.reverse();
        self.oldest_first = !self.oldest_first;
    }

    pub fn is_oldest_first(&self) -> bool {
        self.oldest_first
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.get(id).copied().unwrap_or(false)
    }

    /// Flips the mark on the commit at `index`.
    ///
    /// Returns `false` without touching anything when the index is out of range
    /// or the commit is already applied.
    pub fn toggle(&mut self, index: usize) -> bool {
        let Some(commit) = self.commits.get(index) else {
            return false;
        };
        if commit.already_applied {
            return false;
        }
        let entry = self.selected.entry(commit.id.clone()).or_insert(false);
        *entry = !*entry;
        true
    }

    /// Marks the commit at `index` unless it is already applied.
    pub fn mark(&mut self, index: usize) -> bool {
        match self.commits.get(index) {
            Some(commit) if !commit.already_applied => {
                self.selected.insert(commit.id.clone(), true);
                true
            }
            _ => false,
        }
    }

    /// Marks every non-applied commit among `indices`; returns how many were marked.
    pub fn mark_all<I>(&mut self, indices: I) -> usize
    where
        I: IntoIterator<Item = usize>,
    {
        indices.into_iter().filter(|&i| self.mark(i)).count()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selected_count(&self) -> usize {
        self.selected.values().filter(|&&v| v).count()
    }

    pub fn has_selection(&self) -> bool {
        self.selected.values().any(|&v| v)
    }

    /// Selected commits in backing order.
    pub fn selected_commits(&self) -> impl Iterator<Item = &CommitRecord> {
        self.commits.iter().filter(|c| self.is_selected(&c.id))
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selected_commits().map(|c| c.id.clone()).collect()
    }

    /// Selected ids ordered oldest-first, the order a replay must apply them in.
    pub fn selected_ids_oldest_first(&self) -> Vec<String> {
        let mut picked: Vec<(usize, &CommitRecord)> =
            self.commits.iter().enumerate().filter(|(_, c)| self.is_selected(&c.id)).collect();
        // Equal timestamps keep git's order, which lists newer commits first.
        let oldest_first = self.oldest_first;
        let rank = |pos: usize| if oldest_first { pos } else { usize::MAX - pos };
        picked.sort_by_key(|&(pos, c)| (c.timestamp, rank(pos)));
        picked.into_iter().map(|(_, c)| c.id.clone()).collect()
    }

    /// The oldest selected commit, where an interactive rebase must start.
    pub fn oldest_selected(&self) -> Option<String> {
        self.selected_ids_oldest_first().into_iter().next()
    }

    pub fn merge_count(&self) -> usize {
        self.commits.iter().filter(|c| c.is_merge).count()
    }

    pub fn applied_count(&self) -> usize {
        self.commits.iter().filter(|c| c.already_applied).count()
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.commits.iter().position(|c| c.id == id)
    }
}
