//! Scripted in-memory collaborator for tests.
//!
//! Fields are public so each test sets up exactly the repository it needs.
//! Every trait call is appended to `calls` as a short string, letting tests
//! assert which collaborator operations a handler issued and in what order.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::error::VcsError;
use crate::types::{ConflictedFile, EditorOption, RawCommit, ReplayOutcome};
use crate::vcs::{CommitLister, ConflictInspector, DiffSource, LogQuery, RefLister, ReplayExecutor};

#[derive(Debug, Default)]
pub struct FakeVcs {
    /// Newest-first, as `git log` would list them.
    pub commits: Vec<RawCommit>,
    pub refs: HashSet<String>,
    pub remotes: HashSet<String>,
    /// target ref -> ids already applied there
    pub applied: HashMap<String, HashSet<String>>,
    pub branches: Vec<String>,
    pub authors: Vec<String>,
    pub current_branch: Option<String>,
    pub user_name: Option<String>,
    pub editors: Vec<EditorOption>,
    pub conflicted: RefCell<Vec<ConflictedFile>>,
    /// Replay stops with a conflict on this id.
    pub conflict_on: Option<String>,
    pub in_progress: RefCell<Option<String>>,
    pub fail_diff: bool,
    pub fail_fetch: bool,
    pub fail_list: bool,
    pub fail_continue: Option<String>,
    pub calls: RefCell<Vec<String>>,
    pub last_query: RefCell<Option<LogQuery>>,
}

impl FakeVcs {
    /// A repository on `feature` with identity `Ada` and refs for the default branches.
    pub fn new() -> Self {
        Self {
            current_branch: Some("feature".to_owned()),
            user_name: Some("Ada".to_owned()),
            ..Self::default()
        }
    }

    pub fn with_commit(mut self, id: &str, summary: &str, timestamp: i64) -> Self {
        self.commits.push(raw_commit(id, summary, timestamp));
        self
    }

    pub fn with_ref(mut self, name: &str) -> Self {
        self.refs.insert(name.to_owned());
        self
    }

    pub fn with_applied(mut self, target: &str, id: &str) -> Self {
        self.applied.entry(target.to_owned()).or_default().insert(id.to_owned());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// How many recorded calls start with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn failure(command: &str) -> VcsError {
        VcsError::CommandFailed { command: command.to_owned(), message: "scripted failure".to_owned() }
    }
}

/// A minimal raw row with one changed path named after the id.
pub fn raw_commit(id: &str, summary: &str, timestamp: i64) -> RawCommit {
    RawCommit {
        id: id.to_owned(),
        short_id: id.chars().take(7).collect(),
        summary: summary.to_owned(),
        full_message: summary.to_owned(),
        timestamp,
        date: String::new(),
        author: "Ada".to_owned(),
        parent_count: 1,
        changed_paths: vec![format!("src/{id}.rs")],
        insertions: 1,
        deletions: 0,
    }
}

pub fn conflicted_file(path: &str, has_markers: bool) -> ConflictedFile {
    ConflictedFile {
        path: path.to_owned(),
        status_code: "UU".to_owned(),
        description: "both modified".to_owned(),
        has_markers,
    }
}

impl CommitLister for FakeVcs {
    fn list_commits(&self, query: &LogQuery) -> Result<Vec<RawCommit>, VcsError> {
        self.record("list_commits");
        *self.last_query.borrow_mut() = Some(query.clone());
        if self.fail_list {
            return Err(VcsError::RefNotFound { name: query.include.clone() });
        }
        Ok(self
            .commits
            .iter()
            .filter(|c| query.author.as_ref().is_none_or(|a| c.author.contains(a.as_str())))
            .cloned()
            .collect())
    }

    fn is_already_applied(&self, id: &str, target: &str) -> bool {
        self.applied.get(target).is_some_and(|ids| ids.contains(id))
    }
}

impl DiffSource for FakeVcs {
    fn fetch_diff(&self, id: &str) -> Result<String, VcsError> {
        self.record(format!("fetch_diff {id}"));
        if self.fail_diff {
            return Err(Self::failure("show"));
        }
        Ok(format!("diff --git a/src/{id}.rs b/src/{id}.rs\n+added line\n"))
    }

    fn fetch_stats(&self, id: &str) -> Result<String, VcsError> {
        self.record(format!("fetch_stats {id}"));
        Ok(format!(" src/{id}.rs | 1 +\n 1 file changed, 1 insertion(+)\n"))
    }
}

impl ConflictInspector for FakeVcs {
    fn list_conflicted_files(&self) -> Result<Vec<ConflictedFile>, VcsError> {
        self.record("list_conflicted_files");
        Ok(self.conflicted.borrow().clone())
    }

    fn replay_in_progress(&self) -> Option<String> {
        self.in_progress.borrow().clone()
    }

    fn available_editors(&self) -> Vec<EditorOption> {
        self.record("available_editors");
        self.editors.clone()
    }
}

impl ReplayExecutor for FakeVcs {
    fn replay_commits(&self, ids: &[String]) -> Result<ReplayOutcome, VcsError> {
        for (i, id) in ids.iter().enumerate() {
            self.record(format!("replay {id}"));
            if self.conflict_on.as_deref() == Some(id.as_str()) {
                *self.in_progress.borrow_mut() = Some(id.clone());
                return Ok(ReplayOutcome::ConflictAt { id: id.clone(), remaining: ids[i + 1..].to_vec() });
            }
        }
        Ok(ReplayOutcome::Applied)
    }

    fn continue_replay(&self, paths: &[String]) -> Result<(), VcsError> {
        self.record(format!("continue {}", paths.join(",")));
        if let Some(msg) = &self.fail_continue {
            return Err(VcsError::CommandFailed { command: "cherry-pick --continue".to_owned(), message: msg.clone() });
        }
        self.conflicted.borrow_mut().clear();
        *self.in_progress.borrow_mut() = None;
        Ok(())
    }

    fn skip_replay(&self) -> Result<(), VcsError> {
        self.record("skip");
        self.conflicted.borrow_mut().clear();
        *self.in_progress.borrow_mut() = None;
        Ok(())
    }

    fn abort_replay(&self) -> Result<(), VcsError> {
        self.record("abort");
        self.conflicted.borrow_mut().clear();
        *self.in_progress.borrow_mut() = None;
        Ok(())
    }

    fn start_interactive_rebase(&self, oldest_id: &str) -> Result<(), VcsError> {
        self.record(format!("rebase {oldest_id}"));
        Ok(())
    }

    fn checkout(&self, branch: &str) -> Result<(), VcsError> {
        self.record(format!("checkout {branch}"));
        Ok(())
    }

    fn fetch(&self, remote: &str) -> Result<(), VcsError> {
        self.record(format!("fetch {remote}"));
        if self.fail_fetch {
            return Err(Self::failure("fetch"));
        }
        Ok(())
    }

    fn pull(&self, remote: &str, branch: &str) -> Result<(), VcsError> {
        self.record(format!("pull {remote} {branch}"));
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str) -> Result<(), VcsError> {
        self.record(format!("push {remote} {branch}"));
        Ok(())
    }
}

impl RefLister for FakeVcs {
    fn list_branches(&self) -> Result<Vec<String>, VcsError> {
        self.record("list_branches");
        Ok(self.branches.clone())
    }

    fn list_authors(&self, rev: &str) -> Result<Vec<String>, VcsError> {
        self.record(format!("list_authors {rev}"));
        Ok(self.authors.clone())
    }

    fn ref_exists(&self, name: &str) -> bool {
        self.refs.contains(name)
    }

    fn has_remote(&self, name: &str) -> bool {
        self.remotes.contains(name)
    }

    fn current_branch(&self) -> Option<String> {
        self.current_branch.clone()
    }

    fn user_name(&self) -> Option<String> {
        self.user_name.clone()
    }
}
