//! Conflict session: the state of a replay paused on a conflicting commit.
//!
//! The session only tracks which files the collaborator still reports as
//! conflicted and whether they carry marker text. Resolution itself happens
//! outside: in the operator's editor, a merge tool, or by hand.

use tracing::{debug, warn};

use crate::types::{ConflictedFile, EditorOption};
use crate::vcs::{ConflictInspector, ReplayExecutor};

/// How a conflict session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictExit {
    /// Continue succeeded; the replay resumed past the conflicting commit.
    Resolved,
    /// The replay was aborted and the branch restored.
    Aborted,
    /// The conflicting commit was dropped from the replay.
    Skipped,
    /// The operator left the session; the replay is still paused.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictPhase {
    Open,
    /// Picking an editor or merge tool to resolve with.
    EditorChoice { options: Vec<EditorOption>, cursor: usize },
}

/// Result of a continue request, computed off the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContinueOutcome {
    Resolved,
    /// Marker text remains; the collaborator was never asked to continue.
    StillConflicted(Vec<ConflictedFile>),
    /// The collaborator refused to continue.
    Failed { files: Vec<ConflictedFile>, error: String },
}

/// Checks for leftover markers and, when none remain, stages the files and resumes.
pub fn attempt_continue<V>(vcs: &V) -> ContinueOutcome
where
    V: ConflictInspector + ReplayExecutor + ?Sized,
{
    let files = match vcs.list_conflicted_files() {
        Ok(files) => files,
        Err(e) => return ContinueOutcome::Failed { files: Vec::new(), error: e.to_string() },
    };
    if files.iter().any(|f| f.has_markers) {
        debug!(remaining = files.len(), "continue refused, conflict markers remain");
        return ContinueOutcome::StillConflicted(files);
    }
    let paths: Vec<String> = files.iter().map(|f| f.path.clone()).collect();
    match vcs.continue_replay(&paths) {
        Ok(()) => ContinueOutcome::Resolved,
        Err(e) => {
            warn!(error = %e, "continue failed");
            let files = vcs.list_conflicted_files().unwrap_or(files);
            ContinueOutcome::Failed { files, error: e.to_string() }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictSession {
    commit_id: String,
    files: Vec<ConflictedFile>,
    phase: ConflictPhase,
    /// A collaborator call for this session is in flight.
    pub busy: bool,
    /// Last status line shown under the file list.
    pub message: Option<String>,
}

impl ConflictSession {
    pub fn new(commit_id: impl Into<String>) -> Self {
        Self {
            commit_id: commit_id.into(),
            files: Vec::new(),
            phase: ConflictPhase::Open,
            busy: false,
            message: None,
        }
    }

    pub fn commit_id(&self) -> &str {
        &self.commit_id
    }

    pub fn files(&self) -> &[ConflictedFile] {
        &self.files
    }

    pub fn phase(&self) -> &ConflictPhase {
        &self.phase
    }

    pub fn set_files(&mut self, files: Vec<ConflictedFile>) {
        self.files = files;
    }

    /// Files that still contain marker text.
    pub fn unresolved_count(&self) -> usize {
        self.files.iter().filter(|f| f.has_markers).count()
    }

    /// Paths to hand an editor: marker-bearing files, or every conflicted file if none have markers.
    pub fn paths_to_edit(&self) -> Vec<String> {
        let marked: Vec<String> =
            self.files.iter().filter(|f| f.has_markers).map(|f| f.path.clone()).collect();
        if marked.is_empty() {
            self.files.iter().map(|f| f.path.clone()).collect()
        } else {
            marked
        }
    }

    /// Folds a continue result into the session; `Some` means the session is over.
    pub fn apply_continue(&mut self, outcome: ContinueOutcome) -> Option<ConflictExit> {
        self.busy = false;
        match outcome {
            ContinueOutcome::Resolved => Some(ConflictExit::Resolved),
            ContinueOutcome::StillConflicted(files) => {
                let n = files.iter().filter(|f| f.has_markers).count();
                self.files = files;
                self.message = Some(format!("{n} file(s) still contain conflict markers"));
                None
            }
            ContinueOutcome::Failed { files, error } => {
                self.files = files;
                self.message = Some(format!("Continue failed: {error}"));
                None
            }
        }
    }

    pub fn is_choosing_editor(&self) -> bool {
        matches!(self.phase, ConflictPhase::EditorChoice { .. })
    }

    pub fn open_editor_choice(&mut self, options: Vec<EditorOption>) {
        self.phase = ConflictPhase::EditorChoice { options, cursor: 0 };
    }

    pub fn close_editor_choice(&mut self) {
        self.phase = ConflictPhase::Open;
    }

    pub fn editor_up(&mut self) {
        if let ConflictPhase::EditorChoice { cursor, .. } = &mut self.phase {
            *cursor = cursor.saturating_sub(1);
        }
    }

    pub fn editor_down(&mut self) {
        if let ConflictPhase::EditorChoice { options, cursor } = &mut self.phase {
            if *cursor + 1 < options.len() {
                *cursor += 1;
            }
        }
    }

    /// Picks the option at `index` (or under the cursor) and returns to `Open`.
    pub fn choose_editor(&mut self, index: Option<usize>) -> Option<EditorOption> {
        let ConflictPhase::EditorChoice { options, cursor } = &self.phase else {
            return None;
        };
        let chosen = options.get(index.unwrap_or(*cursor)).cloned()?;
        self.phase = ConflictPhase::Open;
        Some(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, markers: bool) -> ConflictedFile {
        ConflictedFile {
            path: path.into(),
            status_code: "UU".into(),
            description: "both modified".into(),
            has_markers: markers,
        }
    }

    fn editor(cmd: &str) -> EditorOption {
        EditorOption { command: cmd.into(), description: cmd.into(), terminal: true }
    }

    #[test]
    fn still_conflicted_keeps_the_session_open() {
        let mut s = ConflictSession::new("abc");
        let exit = s.apply_continue(ContinueOutcome::StillConflicted(vec![file("a.rs", true)]));
        assert_eq!(exit, None);
        assert_eq!(s.unresolved_count(), 1);
        assert!(s.message.as_deref().is_some_and(|m| m.contains("1 file")));
    }

    #[test]
    fn resolved_ends_the_session() {
        let mut s = ConflictSession::new("abc");
        s.busy = true;
        assert_eq!(s.apply_continue(ContinueOutcome::Resolved), Some(ConflictExit::Resolved));
        assert!(!s.busy);
    }

    #[test]
    fn editor_choice_round_trip() {
        let mut s = ConflictSession::new("abc");
        s.open_editor_choice(vec![editor("vim"), editor("nano")]);
        assert!(s.is_choosing_editor());
        s.editor_down();
        s.editor_down();
        assert_eq!(s.choose_editor(None).map(|e| e.command), Some("nano".into()));
        assert!(!s.is_choosing_editor());
    }

    #[test]
    fn choosing_out_of_range_is_rejected() {
        let mut s = ConflictSession::new("abc");
        s.open_editor_choice(vec![editor("vim")]);
        assert_eq!(s.choose_editor(Some(4)), None);
        assert!(s.is_choosing_editor());
    }

    #[test]
    fn paths_to_edit_prefers_marked_files() {
        let mut s = ConflictSession::new("abc");
        s.set_files(vec![file("a.rs", false), file("b.rs", true)]);
        assert_eq!(s.paths_to_edit(), vec!["b.rs"]);
        s.set_files(vec![file("a.rs", false)]);
        assert_eq!(s.paths_to_edit(), vec!["a.rs"]);
    }
}
