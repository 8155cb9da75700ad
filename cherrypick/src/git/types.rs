//! Messages exchanged with the git worker thread.
//!
//! Everything here is fully owned and `Send`: requests cross from the UI
//! thread over a crossbeam channel, results come back inside
//! `AppEvent::GitResult`.

use cherrypick_core::conflict::ContinueOutcome;
use cherrypick_core::preview::PreviewContent;
use cherrypick_core::types::{CommitRecord, ConflictedFile, EditorOption, Scope, SwitchKind};

/// Commands sent from the UI thread to the git worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitRequest {
    /// Reload the commit list for a scope.
    LoadCommits(Scope),
    /// Fetch diff and stat text for the preview pane.
    LoadPreview(String),
    /// List branch or author candidates for a switch session.
    ///
    /// `rev` bounds the author walk and is ignored for branch kinds.
    ListCandidates { kind: SwitchKind, rev: String },
    ListConflicts,
    /// Check for leftover markers, stage, and resume the paused replay.
    ContinueReplay,
    SkipReplay,
    AbortReplay,
    ListEditors,
    /// Answered with `Idle` once every earlier request has been served.
    Barrier,
}

/// Result payload sent from the worker back to the UI thread.
///
/// Boxed inside `AppEvent::GitResult` since the commit list and the
/// highlighted preview lines can be large. Collaborator errors travel as
/// display strings; the UI only ever renders them.
#[derive(Debug)]
pub enum GitResultPayload {
    Commits(Result<Vec<CommitRecord>, String>),
    Preview {
        content: PreviewContent,
        /// Truncated, highlighted diff ready for the preview pane.
        ///
        /// Built with owned span content so the lines can live in `AppState`.
        lines: Vec<ratatui::text::Line<'static>>,
    },
    Candidates { kind: SwitchKind, result: Result<Vec<String>, String> },
    Conflicts(Result<Vec<ConflictedFile>, String>),
    Continued(ContinueOutcome),
    Skipped(Result<(), String>),
    Aborted(Result<(), String>),
    Editors(Vec<EditorOption>),
    Idle,
}
