//! Capability traits the core consumes the version-control tool through.
//!
//! Each trait covers one concern so tests can reason about exactly which
//! calls a handler makes. [`Vcs`] is the umbrella bound used by the loader and
//! the background worker; it is blanket-implemented for anything providing
//! all five capabilities.
//!
//! Every method is blocking. Callers on the UI side never invoke these
//! directly; requests go through the worker thread.

use crate::error::VcsError;
use crate::types::{ConflictedFile, EditorOption, RawCommit, ReplayOutcome};

/// Which commits to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    /// Tip to walk from, usually `"HEAD"`.
    pub include: String,
    /// Commits reachable from this ref are left out.
    pub exclude: Option<String>,
    /// Fixed-string author filter; `None` lists every author.
    pub author: Option<String>,
}

/// Commit discovery and the already-applied check.
pub trait CommitLister {
    /// Lists commits newest-first, with changed paths and line counts filled in.
    fn list_commits(&self, query: &LogQuery) -> Result<Vec<RawCommit>, VcsError>;

    /// True when `id` is reachable from `target` or an equivalent patch exists there.
    ///
    /// Best-effort: any lookup failure answers `false`.
    fn is_already_applied(&self, id: &str, target: &str) -> bool;
}

/// Diff and stat text for the preview pane.
pub trait DiffSource {
    fn fetch_diff(&self, id: &str) -> Result<String, VcsError>;
    fn fetch_stats(&self, id: &str) -> Result<String, VcsError>;
}

/// Inspection of a paused replay.
pub trait ConflictInspector {
    /// Unmerged paths in index order, each with its marker-scan result.
    fn list_conflicted_files(&self) -> Result<Vec<ConflictedFile>, VcsError>;

    /// Id of the commit a paused replay stopped on, if any.
    fn replay_in_progress(&self) -> Option<String>;

    /// Editors and merge tools available on this machine.
    fn available_editors(&self) -> Vec<EditorOption>;
}

/// Operations that change the working tree.
pub trait ReplayExecutor {
    fn replay_commits(&self, ids: &[String]) -> Result<ReplayOutcome, VcsError>;
    /// Stages `paths` and resumes the paused replay.
    fn continue_replay(&self, paths: &[String]) -> Result<(), VcsError>;
    fn skip_replay(&self) -> Result<(), VcsError>;
    fn abort_replay(&self) -> Result<(), VcsError>;
    /// Hands the terminal to `git rebase -i` starting at the parent of `oldest_id`.
    fn start_interactive_rebase(&self, oldest_id: &str) -> Result<(), VcsError>;
    fn checkout(&self, branch: &str) -> Result<(), VcsError>;
    fn fetch(&self, remote: &str) -> Result<(), VcsError>;
    fn pull(&self, remote: &str, branch: &str) -> Result<(), VcsError>;
    fn push(&self, remote: &str, branch: &str) -> Result<(), VcsError>;
}

/// Refs, remotes, and identity.
pub trait RefLister {
    fn list_branches(&self) -> Result<Vec<String>, VcsError>;
    /// Distinct author names reachable from `rev`, sorted.
    fn list_authors(&self, rev: &str) -> Result<Vec<String>, VcsError>;
    fn ref_exists(&self, name: &str) -> bool;
    fn has_remote(&self, name: &str) -> bool;
    /// `None` on a detached or unborn HEAD.
    fn current_branch(&self) -> Option<String>;
    fn user_name(&self) -> Option<String>;
}

/// Everything the loader and worker need.
pub trait Vcs: CommitLister + DiffSource + ConflictInspector + ReplayExecutor + RefLister {}

impl<T> Vcs for T where T: CommitLister + DiffSource + ConflictInspector + ReplayExecutor + RefLister {}
