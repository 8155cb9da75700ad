//! Background thread that owns the git collaborator for its lifetime.
//!
//! `GitCli` keeps a `git2::Repository` and a `RefCell` cache, so it is opened
//! inside the thread rather than shared. All communication is via channels:
//! `GitRequest` in, `AppEvent::GitResult` out. Requests are served strictly
//! one at a time. The main thread runs its own git commands only between
//! picker sessions, after a `Barrier` round trip has emptied this queue.

use std::path::PathBuf;

use cherrypick_core::conflict::attempt_continue;
use cherrypick_core::git::GitCli;
use cherrypick_core::loader::load_commits;
use cherrypick_core::preview::{PreviewContent, PREVIEW_LINE_LIMIT};
use cherrypick_core::types::SwitchKind;
use cherrypick_core::vcs::Vcs;
use crossbeam_channel::Receiver;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error};

use crate::event::AppEvent;
use crate::git::highlight::{highlight_diff, PS, TS};
use crate::git::types::{GitRequest, GitResultPayload};

/// Entry point for the worker thread.
///
/// Opens the repository at `path` and serves requests until the request
/// channel closes or the UI side stops listening.
pub fn git_worker_loop(path: PathBuf, rx: Receiver<GitRequest>, event_tx: UnboundedSender<AppEvent>) {
    // Load syntect's sets up front instead of on the first preview.
    let _ = &*PS;
    let _ = &*TS;

    let git = match GitCli::discover(&path) {
        Ok(git) => git,
        Err(e) => {
            error!(error = %e, path = %path.display(), "git worker could not open repository");
            return;
        }
    };

    for request in rx {
        let payload = handle_request(&git, request);
        if event_tx.send(AppEvent::GitResult(Box::new(payload))).is_err() {
            break;
        }
    }
    debug!("git worker exiting");
}

/// Runs one request against `vcs` and packages the result for the UI.
///
/// Collaborator errors become display strings; nothing here is fatal.
pub fn handle_request<V: Vcs + ?Sized>(vcs: &V, request: GitRequest) -> GitResultPayload {
    debug!(?request, "git request");
    match request {
        GitRequest::LoadCommits(scope) => {
            GitResultPayload::Commits(load_commits(vcs, &scope).map_err(|e| e.to_string()))
        }
        GitRequest::LoadPreview(id) => {
            let content = PreviewContent::fetch(vcs, &id);
            let lines = match &content.diff {
                Ok(diff) => highlight_diff(diff, PREVIEW_LINE_LIMIT),
                Err(_) => Vec::new(),
            };
            GitResultPayload::Preview { content, lines }
        }
        GitRequest::ListCandidates { kind, rev } => {
            let result = match kind {
                SwitchKind::SourceBranch | SwitchKind::TargetBranch => vcs.list_branches(),
                SwitchKind::Author => vcs.list_authors(&rev),
            };
            GitResultPayload::Candidates { kind, result: result.map_err(|e| e.to_string()) }
        }
        GitRequest::ListConflicts => {
            GitResultPayload::Conflicts(vcs.list_conflicted_files().map_err(|e| e.to_string()))
        }
        GitRequest::ContinueReplay => GitResultPayload::Continued(attempt_continue(vcs)),
        GitRequest::SkipReplay => GitResultPayload::Skipped(vcs.skip_replay().map_err(|e| e.to_string())),
        GitRequest::AbortReplay => GitResultPayload::Aborted(vcs.abort_replay().map_err(|e| e.to_string())),
        GitRequest::ListEditors => GitResultPayload::Editors(vcs.available_editors()),
        GitRequest::Barrier => GitResultPayload::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cherrypick_core::fake::{conflicted_file, FakeVcs};
    use cherrypick_core::types::Scope;

    fn scope() -> Scope {
        Scope {
            source_branch: "dev".into(),
            target_branch: "staging".into(),
            author: "Ada".into(),
            remote: "origin".into(),
        }
    }

    #[test]
    fn load_commits_marks_applied_against_target() {
        let vcs = FakeVcs::new()
            .with_commit("c2", "second", 2)
            .with_commit("c1", "first", 1)
            .with_ref("staging")
            .with_applied("staging", "c1");
        let GitResultPayload::Commits(Ok(commits)) = handle_request(&vcs, GitRequest::LoadCommits(scope())) else {
            panic!("expected commits");
        };
        assert_eq!(commits.len(), 2);
        assert!(!commits[0].already_applied);
        assert!(commits[1].already_applied);
    }

    #[test]
    fn preview_failure_carries_message_and_no_lines() {
        let vcs = FakeVcs { fail_diff: true, ..FakeVcs::new() };
        let GitResultPayload::Preview { content, lines } = handle_request(&vcs, GitRequest::LoadPreview("c1".into()))
        else {
            panic!("expected preview");
        };
        assert!(content.diff.unwrap_err().starts_with("Error loading diff"));
        assert!(content.stats.is_ok());
        assert!(lines.is_empty());
    }

    #[test]
    fn author_candidates_walk_the_given_rev() {
        let vcs = FakeVcs { authors: vec!["Ada".into(), "Grace".into()], ..FakeVcs::new() };
        let payload =
            handle_request(&vcs, GitRequest::ListCandidates { kind: SwitchKind::Author, rev: "HEAD".into() });
        assert!(matches!(payload, GitResultPayload::Candidates { kind: SwitchKind::Author, result: Ok(ref a) } if a.len() == 2));
        assert_eq!(vcs.calls(), vec!["list_authors HEAD"]);
    }

    #[test]
    fn continue_with_markers_never_reaches_the_collaborator() {
        let vcs = FakeVcs::new();
        vcs.conflicted.borrow_mut().push(conflicted_file("src/lib.rs", true));
        let payload = handle_request(&vcs, GitRequest::ContinueReplay);
        assert!(matches!(payload, GitResultPayload::Continued(_)));
        assert_eq!(vcs.count("continue"), 0);
    }

    #[test]
    fn barrier_is_answered_without_running_git() {
        let vcs = FakeVcs::new();
        assert!(matches!(handle_request(&vcs, GitRequest::Barrier), GitResultPayload::Idle));
        assert!(vcs.calls().is_empty());
    }
}
