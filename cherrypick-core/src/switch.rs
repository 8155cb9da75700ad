//! Branch and author switch sessions.
//!
//! A session lists candidate values, filters them incrementally, and on
//! confirm yields the value the scope field `kind` should take. The caller
//! applies it and reloads; the session itself has no side effects.

use crate::search::filter_candidates;
use crate::types::SwitchKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchSession {
    kind: SwitchKind,
    /// `None` while the candidate load is in flight.
    candidates: Option<Vec<String>>,
    error: Option<String>,
    query: String,
    filtered: Vec<usize>,
    cursor: usize,
    searching: bool,
    current: String,
}

impl SwitchSession {
    /// Opens a session in the loading state. `current` is the field's present value.
    pub fn open(kind: SwitchKind, current: impl Into<String>) -> Self {
        Self {
            kind,
            candidates: None,
            error: None,
            query: String::new(),
            filtered: Vec::new(),
            cursor: 0,
            searching: false,
            current: current.into(),
        }
    }

    pub fn kind(&self) -> SwitchKind {
        self.kind
    }

    pub fn is_loading(&self) -> bool {
        self.candidates.is_none() && self.error.is_none()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Filtered candidates in display order.
    pub fn visible(&self) -> impl Iterator<Item = &str> {
        let all = self.candidates.as_deref().unwrap_or_default();
        self.filtered.iter().filter_map(move |&i| all.get(i).map(String::as_str))
    }

    pub fn visible_len(&self) -> usize {
        self.filtered.len()
    }

    /// Installs loaded candidates, aiming the cursor at the current value when present.
    pub fn apply_candidates(&mut self, result: Result<Vec<String>, String>) {
        match result {
            Ok(list) => {
                self.error = None;
                self.candidates = Some(list);
                self.refilter();
                let pos = self.visible().position(|c| c == self.current).unwrap_or(0);
                self.cursor = pos;
            }
            Err(msg) => {
                self.candidates = Some(Vec::new());
                self.filtered.clear();
                self.cursor = 0;
                self.error = Some(msg);
            }
        }
    }

    /// Forgets loaded candidates so a refresh shows the loading state again.
    pub fn begin_reload(&mut self) {
        self.candidates = None;
        self.error = None;
        self.filtered.clear();
        self.cursor = 0;
    }

    pub fn start_search(&mut self) {
        self.searching = true;
    }

    /// Leaves search input; `keep` retains the filter, otherwise it is cleared.
    pub fn end_search(&mut self, keep: bool) {
        self.searching = false;
        if !keep {
            self.set_query("");
        }
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_owned();
        self.refilter();
        self.cursor = 0;
    }

    pub fn push_char(&mut self, c: char) {
        let mut q = std::mem::take(&mut self.query);
        q.push(c);
        self.set_query(&q);
    }

    pub fn pop_char(&mut self) {
        let mut q = std::mem::take(&mut self.query);
        q.pop();
        self.set_query(&q);
    }

    pub fn move_up(&mut self, rows: usize) {
        self.cursor = self.cursor.saturating_sub(rows);
    }

    pub fn move_down(&mut self, rows: usize) {
        self.cursor = (self.cursor + rows).min(self.filtered.len().saturating_sub(1));
    }

    /// The candidate to apply, or `None` while loading or when nothing is under the cursor.
    pub fn confirm(&self) -> Option<String> {
        let all = self.candidates.as_ref()?;
        self.filtered.get(self.cursor).and_then(|&i| all.get(i)).cloned()
    }

    fn refilter(&mut self) {
        self.filtered = match &self.candidates {
            Some(all) => filter_candidates(all, &self.query),
            None => Vec::new(),
        };
    }
}
