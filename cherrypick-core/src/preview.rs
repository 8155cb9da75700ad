//! Diff and stat cache for the preview pane.
//!
//! The cache is keyed by the commit under the cursor. Diff and stats load
//! independently, so one may fail while the other succeeds; failures are
//! kept as display text rather than propagated.

use crate::vcs::DiffSource;

/// Lines of diff shown before the "more lines" marker.
pub const PREVIEW_LINE_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewSlot {
    #[default]
    Loading,
    Ready(String),
    Failed(String),
}

impl PreviewSlot {
    fn from_result(result: Result<String, String>) -> Self {
        match result {
            Ok(text) => PreviewSlot::Ready(text),
            Err(msg) => PreviewSlot::Failed(msg),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PreviewSlot::Loading)
    }

    /// The text to render: content when ready, the error message when failed.
    pub fn text(&self) -> Option<&str> {
        match self {
            PreviewSlot::Loading => None,
            PreviewSlot::Ready(text) | PreviewSlot::Failed(text) => Some(text),
        }
    }
}

/// Both halves of a preview, fetched off the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewContent {
    pub commit_id: String,
    pub diff: Result<String, String>,
    pub stats: Result<String, String>,
}

impl PreviewContent {
    pub fn fetch<S: DiffSource + ?Sized>(source: &S, commit_id: &str) -> Self {
        let diff = source.fetch_diff(commit_id).map_err(|e| format!("Error loading diff: {e}"));
        let stats = source.fetch_stats(commit_id).map_err(|e| format!("Error loading stats: {e}"));
        Self { commit_id: commit_id.to_owned(), diff, stats }
    }
}

#[derive(Debug, Default)]
pub struct PreviewCache {
    commit_id: Option<String>,
    diff: PreviewSlot,
    stats: PreviewSlot,
}

impl PreviewCache {
    pub fn commit_id(&self) -> Option<&str> {
        self.commit_id.as_deref()
    }

    pub fn diff(&self) -> &PreviewSlot {
        &self.diff
    }

    pub fn stats(&self) -> &PreviewSlot {
        &self.stats
    }

    pub fn is_stale(&self, target: Option<&str>) -> bool {
        self.commit_id.as_deref() != target
    }

    /// Re-targets the cache at `target` if it points elsewhere.
    ///
    /// Returns the id a load must be requested for, or `None` when the cache is
    /// already current (or there is no target).
    pub fn invalidate_if_stale(&mut self, target: Option<&str>) -> Option<String> {
        if !self.is_stale(target) {
            return None;
        }
        match target {
            Some(id) => {
                self.begin(id);
                Some(id.to_owned())
            }
            None => {
                self.clear();
                None
            }
        }
    }

    /// Marks both halves loading for `commit_id`.
    pub fn begin(&mut self, commit_id: &str) {
        self.commit_id = Some(commit_id.to_owned());
        self.diff = PreviewSlot::Loading;
        self.stats = PreviewSlot::Loading;
    }

    /// Stores a finished load. Results for a commit the cursor already left are dropped.
    pub fn fill(&mut self, content: PreviewContent) -> bool {
        if self.commit_id.as_deref() != Some(content.commit_id.as_str()) {
            return false;
        }
        self.diff = PreviewSlot::from_result(content.diff);
        self.stats = PreviewSlot::from_result(content.stats);
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Cuts `text` to `limit` lines, appending `... (N more lines) ...` when anything was dropped.
pub fn truncate(text: &str, limit: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= limit {
        return lines.join("\n");
    }
    let mut out = lines[..limit].join("\n");
    out.push_str(&format!("\n... ({} more lines) ...", lines.len() - limit));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VcsError;

    struct Source {
        diff_fails: bool,
    }

    impl DiffSource for Source {
        fn fetch_diff(&self, id: &str) -> Result<String, VcsError> {
            if self.diff_fails {
                Err(VcsError::RefNotFound { name: id.into() })
            } else {
                Ok(format!("diff of {id}"))
            }
        }

        fn fetch_stats(&self, id: &str) -> Result<String, VcsError> {
            Ok(format!("stats of {id}"))
        }
    }

    #[test]
    fn halves_load_independently() {
        let content = PreviewContent::fetch(&Source { diff_fails: true }, "abc");
        let mut cache = PreviewCache::default();
        cache.begin("abc");
        assert!(cache.fill(content));
        assert!(matches!(cache.diff(), PreviewSlot::Failed(msg) if msg.contains("abc")));
        assert_eq!(cache.stats(), &PreviewSlot::Ready("stats of abc".into()));
    }

    #[test]
    fn late_results_for_another_commit_are_dropped() {
        let mut cache = PreviewCache::default();
        cache.begin("new");
        let stale = PreviewContent::fetch(&Source { diff_fails: false }, "old");
        assert!(!cache.fill(stale));
        assert!(cache.diff().is_loading());
    }

    #[test]
    fn invalidate_only_reloads_on_change() {
        let mut cache = PreviewCache::default();
        assert_eq!(cache.invalidate_if_stale(Some("a")).as_deref(), Some("a"));
        assert_eq!(cache.invalidate_if_stale(Some("a")), None);
        assert_eq!(cache.invalidate_if_stale(Some("b")).as_deref(), Some("b"));
        assert_eq!(cache.invalidate_if_stale(None), None);
        assert_eq!(cache.commit_id(), None);
    }

    #[test]
    fn truncate_appends_marker() {
        let text: String = (0..25).map(|i| format!("line {i}\n")).collect();
        let out = truncate(&text, PREVIEW_LINE_LIMIT);
        assert_eq!(out.lines().count(), 21);
        assert!(out.ends_with("... (5 more lines) ..."));
        assert_eq!(truncate("a\nb", 20), "a\nb");
    }
}
