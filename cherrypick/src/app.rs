//! Central application state for cherrypick.
//!
//! `AppState` is the single owned value threaded through the event loop: the
//! key dispatcher mutates it, the renderer reads it, and worker results are
//! folded into it by [`AppState::apply_git_result`]. No ratatui drawing lives
//! here.
//!
//! # Modal state
//!
//! At most one [`Overlay`] is open at a time, and an open overlay receives
//! every key. Below the overlay sit independent flags: `searching`,
//! `show_preview`, `detail`, the view's hide-applied filter, and the range
//! selector. Any combination of those is legal, for instance a range open in
//! reversed order with the preview pane showing and a filter active.

use std::mem;

use cherrypick_core::config::UiConfig;
use cherrypick_core::conflict::{ConflictExit, ConflictSession};
use cherrypick_core::preview::PreviewCache;
use cherrypick_core::range::RangeSelector;
use cherrypick_core::store::CommitStore;
use cherrypick_core::switch::SwitchSession;
use cherrypick_core::types::{CommitRecord, EditorOption, Scope, SwitchKind};
use cherrypick_core::view::ViewState;
use crossbeam_channel::Sender;
use ratatui::text::Line;
use tracing::{debug, info, warn};

use crate::git::types::{GitRequest, GitResultPayload};

/// Rows moved by page up/down in the commit list.
pub const PAGE_ROWS: usize = 25;
/// Rows moved by page up/down in a switch session.
pub const SWITCH_PAGE_ROWS: usize = 10;

/// The modal layer above the commit list.
#[derive(Debug)]
pub enum Overlay {
    Switch(SwitchSession),
    Conflict(ConflictSession),
    Help,
}

/// Why the picker handed control back to `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    /// Replay these ids, oldest first, onto the target branch.
    Replay(Vec<String>),
    /// Start an interactive rebase at this commit.
    Rebase(String),
    /// A conflict was resolved or skipped; replay the rest of the queue.
    ResumeReplay(Vec<String>),
    /// A conflict was resolved or skipped and nothing was left queued.
    ReplayCompleted,
    ReplayAborted,
}

/// An editor or merge tool to run with the terminal suspended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorLaunch {
    pub option: EditorOption,
    pub paths: Vec<String>,
}

/// Row decoration switches taken from `[ui]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOptions {
    pub show_date: bool,
    pub show_author: bool,
    pub max_message_len: usize,
}

impl From<&UiConfig> for DisplayOptions {
    fn from(ui: &UiConfig) -> Self {
        Self {
            show_date: ui.show_commit_date,
            show_author: ui.show_commit_author,
            max_message_len: ui.max_commit_message_length,
        }
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self::from(&UiConfig::default())
    }
}

pub struct AppState {
    pub store: CommitStore,
    pub view: ViewState,
    pub range: RangeSelector,
    pub preview: PreviewCache,
    /// Highlighted diff for `preview`'s commit, built by the worker.
    pub preview_lines: Vec<Line<'static>>,
    pub overlay: Option<Overlay>,

    pub searching: bool,
    pub show_preview: bool,
    pub detail: bool,
    /// A commit reload is in flight; only quit is accepted until it lands.
    pub loading: bool,
    /// Present the list oldest-first. Survives reloads.
    pub oldest_first: bool,

    pub scope: Scope,
    pub current_branch: String,
    pub options: DisplayOptions,

    /// One-line notice for the status bar; cleared by the next reload.
    pub status: Option<String>,
    pub cursor_blink: bool,
    pub list_offset: usize,
    pub help_scroll: u16,

    /// The open conflict came from a replay this process started.
    pub replay_run: bool,
    /// Commits still to replay once the current conflict is settled.
    pub pending_replay: Vec<String>,

    git_tx: Option<Sender<GitRequest>>,
}

impl AppState {
    pub fn new(scope: Scope, current_branch: impl Into<String>, options: DisplayOptions) -> Self {
        Self {
            store: CommitStore::default(),
            view: ViewState::default(),
            range: RangeSelector::default(),
            preview: PreviewCache::default(),
            preview_lines: Vec::new(),
            overlay: None,
            searching: false,
            show_preview: false,
            detail: false,
            loading: false,
            oldest_first: false,
            scope,
            current_branch: current_branch.into(),
            options,
            status: None,
            cursor_blink: true,
            list_offset: 0,
            help_scroll: 0,
            replay_run: false,
            pending_replay: Vec::new(),
            git_tx: None,
        }
    }

    pub fn set_git_tx(&mut self, tx: Sender<GitRequest>) {
        self.git_tx = Some(tx);
    }

    /// Queues a barrier behind every request sent so far.
    ///
    /// Returns `false` when no worker will answer it.
    pub fn request_barrier(&self) -> bool {
        self.git_tx.as_ref().is_some_and(|tx| tx.send(GitRequest::Barrier).is_ok())
    }

    fn request(&self, request: GitRequest) {
        match &self.git_tx {
            Some(tx) => {
                if tx.send(request).is_err() {
                    warn!("git worker is gone, request dropped");
                }
            }
            None => debug!(?request, "no git worker attached"),
        }
    }

    /// The commit under the cursor.
    pub fn current_commit(&self) -> Option<&CommitRecord> {
        self.view.current().and_then(|i| self.store.get(i))
    }

    pub fn on_tick(&mut self) {
        self.cursor_blink = !self.cursor_blink;
    }

    // -----------------------------------------------------------------------
    // Reload
    // -----------------------------------------------------------------------

    /// Asks the worker for a fresh commit list for the current scope.
    pub fn begin_reload(&mut self) {
        self.loading = true;
        self.status = None;
        self.request(GitRequest::LoadCommits(self.scope.clone()));
    }

    /// Installs a new generation of commits and resets everything derived from the old one.
    fn apply_commits(&mut self, commits: Vec<CommitRecord>) {
        self.store.replace(commits);
        if self.oldest_first {
            self.store.reverse();
        }
        self.view.reset(self.store.commits());
        self.range.cancel();
        self.searching = false;
        self.show_preview = false;
        self.preview.clear();
        self.preview_lines.clear();
        self.list_offset = 0;
        debug!(count = self.store.len(), "commit list replaced");
    }

    // -----------------------------------------------------------------------
    // Cursor and selection
    // -----------------------------------------------------------------------

    /// Follows a cursor change: drags the range end along and re-aims the preview.
    fn after_cursor_move(&mut self) {
        self.range.update(self.view.cursor());
        self.refresh_preview();
    }

    fn refresh_preview(&mut self) {
        if !self.show_preview {
            return;
        }
        let target = self.current_commit().map(|c| c.id.clone());
        if let Some(id) = self.preview.invalidate_if_stale(target.as_deref()) {
            self.preview_lines.clear();
            self.request(GitRequest::LoadPreview(id));
        } else if target.is_none() {
            self.preview_lines.clear();
        }
    }

    pub fn move_up(&mut self, rows: usize) {
        self.view.move_up(rows);
        self.after_cursor_move();
    }

    pub fn move_down(&mut self, rows: usize) {
        self.view.move_down(rows);
        self.after_cursor_move();
    }

    pub fn toggle_current(&mut self) {
        if let Some(i) = self.view.current() {
            self.store.toggle(i);
        }
    }

    /// Marks every non-applied commit in the current view.
    pub fn select_all_visible(&mut self) {
        let marked = self.store.mark_all(self.view.indices().iter().copied());
        debug!(marked, "select all visible");
    }

    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
    }

    /// Opens a range at the cursor, or closes the open one into the selection.
    pub fn toggle_range(&mut self) {
        if self.range.is_open() {
            let marked = self.range.close(&mut self.store, self.view.indices());
            self.status = Some(format!("Marked {marked} commit(s) from range"));
        } else {
            self.range.open(self.view.cursor());
        }
    }

    pub fn cancel_range(&mut self) {
        self.range.cancel();
    }

    /// Flips list orientation, keeping the cursor and range on the same commits.
    pub fn toggle_order(&mut self) {
        self.view.reverse(&mut self.store);
        self.range.remap(self.view.len());
        self.oldest_first = self.store.is_oldest_first();
    }

    pub fn toggle_hide_applied(&mut self) {
        let hide = !self.view.hide_applied();
        self.view.set_hide_applied(self.store.commits(), hide);
        self.range.clamp(self.view.len());
        self.after_cursor_move();
    }

    pub fn toggle_detail(&mut self) {
        self.detail = !self.detail;
    }

    pub fn toggle_preview(&mut self) {
        self.show_preview = !self.show_preview;
        if self.show_preview {
            self.refresh_preview();
        } else {
            self.preview.clear();
            self.preview_lines.clear();
        }
    }

    /// The replay request, if anything is selected.
    pub fn replay_request(&self) -> Option<ExitReason> {
        self.store.has_selection().then(|| ExitReason::Replay(self.store.selected_ids_oldest_first()))
    }

    pub fn rebase_request(&self) -> Option<ExitReason> {
        self.store.oldest_selected().map(ExitReason::Rebase)
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    pub fn start_search(&mut self) {
        self.searching = true;
    }

    fn set_query(&mut self, query: &str) {
        self.view.set_query(self.store.commits(), query);
        self.range.clamp(self.view.len());
        self.after_cursor_move();
    }

    pub fn push_search_char(&mut self, c: char) {
        let mut q = self.view.query().to_owned();
        q.push(c);
        self.set_query(&q);
    }

    pub fn pop_search_char(&mut self) {
        let mut q = self.view.query().to_owned();
        if q.pop().is_some() {
            self.set_query(&q);
        }
    }

    /// Leaves search input. Keeping an empty result set is pointless, so it is discarded too.
    pub fn end_search(&mut self, keep: bool) {
        self.searching = false;
        if !keep || self.view.is_empty() {
            self.view.clear_query(self.store.commits());
            self.range.clamp(self.view.len());
            self.after_cursor_move();
        }
    }

    // -----------------------------------------------------------------------
    // Overlays
    // -----------------------------------------------------------------------

    pub fn open_help(&mut self) {
        self.help_scroll = 0;
        self.overlay = Some(Overlay::Help);
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    /// Opens a switch session and asks for its candidates.
    pub fn open_switch(&mut self, kind: SwitchKind) {
        self.overlay = Some(Overlay::Switch(SwitchSession::open(kind, self.scope.get(kind))));
        self.request_candidates(kind);
    }

    fn request_candidates(&self, kind: SwitchKind) {
        self.request(GitRequest::ListCandidates { kind, rev: "HEAD".to_owned() });
    }

    pub fn switch_session(&mut self) -> Option<&mut SwitchSession> {
        match &mut self.overlay {
            Some(Overlay::Switch(session)) => Some(session),
            _ => None,
        }
    }

    pub fn refresh_switch(&mut self) {
        if let Some(session) = self.switch_session() {
            session.begin_reload();
            let kind = session.kind();
            self.request_candidates(kind);
        }
    }

    /// Applies the candidate under the cursor to the scope and reloads.
    ///
    /// Ignored while candidates are loading or when the filter matches nothing.
    pub fn confirm_switch(&mut self) {
        let Some(session) = self.switch_session() else {
            return;
        };
        let kind = session.kind();
        let Some(value) = session.confirm() else {
            return;
        };
        info!(field = kind.label(), %value, "scope switched");
        self.overlay = None;
        self.scope.set(kind, value);
        self.begin_reload();
    }

    pub fn conflict_session(&mut self) -> Option<&mut ConflictSession> {
        match &mut self.overlay {
            Some(Overlay::Conflict(session)) => Some(session),
            _ => None,
        }
    }

    /// Opens a conflict session for `commit_id` with `remaining` queued behind it.
    pub fn enter_conflict(&mut self, commit_id: &str, remaining: Vec<String>, replay_run: bool) {
        let mut session = ConflictSession::new(commit_id);
        session.busy = true;
        self.overlay = Some(Overlay::Conflict(session));
        self.pending_replay = remaining;
        self.replay_run = replay_run;
        self.request(GitRequest::ListConflicts);
    }

    /// Sends a conflict-session request unless one is already in flight.
    pub fn conflict_request(&mut self, request: GitRequest) {
        let Some(session) = self.conflict_session() else {
            return;
        };
        if session.busy {
            return;
        }
        session.busy = true;
        session.message = None;
        self.request(request);
    }

    /// True while a continue, skip, abort or listing is running for the
    /// conflict session. Also tells the operator to wait.
    pub fn conflict_in_flight(&mut self) -> bool {
        match self.conflict_session() {
            Some(session) if session.busy => {
                session.message = Some("Waiting for git to finish...".to_owned());
                true
            }
            _ => false,
        }
    }

    /// Leaves the conflict session without touching the paused replay.
    ///
    /// Refused while a request is in flight: its result decides the queue.
    pub fn cancel_conflict(&mut self) -> Option<ExitReason> {
        if self.conflict_in_flight() {
            return None;
        }
        self.finish_conflict(ConflictExit::Cancelled)
    }

    /// Picks an editor and returns what to launch with the terminal suspended.
    pub fn choose_editor(&mut self, index: Option<usize>) -> Option<EditorLaunch> {
        let session = self.conflict_session()?;
        let option = session.choose_editor(index)?;
        Some(EditorLaunch { option, paths: session.paths_to_edit() })
    }

    /// Records how an editor run went and refreshes the conflict list.
    pub fn after_editor(&mut self, result: Result<(), String>) {
        let Some(session) = self.conflict_session() else {
            return;
        };
        session.message = result.err().map(|e| format!("Editor failed: {e}"));
        session.busy = true;
        self.request(GitRequest::ListConflicts);
    }

    fn finish_conflict(&mut self, exit: ConflictExit) -> Option<ExitReason> {
        let Some(Overlay::Conflict(session)) = self.overlay.take() else {
            return None;
        };
        info!(commit = session.commit_id(), ?exit, "conflict session finished");
        if self.replay_run {
            return match exit {
                ConflictExit::Resolved | ConflictExit::Skipped => {
                    self.replay_run = false;
                    let rest = mem::take(&mut self.pending_replay);
                    Some(if rest.is_empty() { ExitReason::ReplayCompleted } else { ExitReason::ResumeReplay(rest) })
                }
                ConflictExit::Aborted => {
                    self.replay_run = false;
                    self.pending_replay.clear();
                    Some(ExitReason::ReplayAborted)
                }
                // The replay stays paused; main reports it on the way out.
                ConflictExit::Cancelled => Some(ExitReason::Quit),
            };
        }
        let short: String = session.commit_id().chars().take(8).collect();
        let note = match exit {
            ConflictExit::Resolved => format!("Cherry-pick of {short} continued"),
            ConflictExit::Skipped => format!("Skipped {short}"),
            ConflictExit::Aborted => "Cherry-pick aborted".to_owned(),
            ConflictExit::Cancelled => format!("Cherry-pick of {short} is still paused"),
        };
        self.begin_reload();
        self.status = Some(note);
        None
    }

    // -----------------------------------------------------------------------
    // Worker results
    // -----------------------------------------------------------------------

    /// Folds a worker result into the state.
    ///
    /// Results that no longer match what is on screen (a preview for a commit
    /// the cursor left, candidates for a session that was cancelled) are
    /// dropped. `Some` asks the event loop to exit.
    pub fn apply_git_result(&mut self, payload: GitResultPayload) -> Option<ExitReason> {
        match payload {
            GitResultPayload::Commits(Ok(commits)) => {
                self.loading = false;
                self.apply_commits(commits);
            }
            GitResultPayload::Commits(Err(e)) => {
                self.loading = false;
                warn!(error = %e, "commit reload failed");
                self.status = Some(format!("Failed to load commits: {e}"));
            }
            GitResultPayload::Preview { content, lines } => {
                if self.preview.fill(content) {
                    self.preview_lines = lines;
                }
            }
            GitResultPayload::Candidates { kind, result } => {
                if let Some(session) = self.switch_session() {
                    if session.kind() == kind && session.is_loading() {
                        session.apply_candidates(result);
                    }
                }
            }
            GitResultPayload::Conflicts(result) => {
                if let Some(session) = self.conflict_session() {
                    session.busy = false;
                    match result {
                        Ok(files) => session.set_files(files),
                        Err(e) => session.message = Some(format!("Could not list conflicts: {e}")),
                    }
                }
            }
            GitResultPayload::Continued(outcome) => {
                let exit = self.conflict_session().and_then(|s| s.apply_continue(outcome));
                if let Some(exit) = exit {
                    return self.finish_conflict(exit);
                }
            }
            GitResultPayload::Skipped(result) => return self.settle(result, ConflictExit::Skipped, "Skip"),
            GitResultPayload::Aborted(result) => return self.settle(result, ConflictExit::Aborted, "Abort"),
            GitResultPayload::Editors(options) => {
                if let Some(session) = self.conflict_session() {
                    session.busy = false;
                    session.open_editor_choice(options);
                }
            }
            GitResultPayload::Idle => {}
        }
        None
    }

    fn settle(&mut self, result: Result<(), String>, exit: ConflictExit, verb: &str) -> Option<ExitReason> {
        match result {
            Ok(()) => self.finish_conflict(exit),
            Err(e) => {
                if let Some(session) = self.conflict_session() {
                    session.busy = false;
                    session.message = Some(format!("{verb} failed: {e}"));
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cherrypick_core::fake::{conflicted_file, FakeVcs};
    use crossbeam_channel::Receiver;

    use crate::git::worker::handle_request;

    fn scope() -> Scope {
        Scope {
            source_branch: "dev".into(),
            target_branch: "staging".into(),
            author: "Ada".into(),
            remote: "origin".into(),
        }
    }

    fn repo() -> FakeVcs {
        FakeVcs::new()
            .with_commit("c3", "fixup typo", 3)
            .with_commit("c2", "add feature", 2)
            .with_commit("c1", "fix bug", 1)
            .with_ref("staging")
            .with_applied("staging", "c2")
    }

    fn state() -> (AppState, Receiver<GitRequest>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut state = AppState::new(scope(), "feature", DisplayOptions::default());
        state.set_git_tx(tx);
        (state, rx)
    }

    /// Serves every queued request against `vcs`, returning any exit the state asked for.
    fn pump(state: &mut AppState, rx: &Receiver<GitRequest>, vcs: &FakeVcs) -> Option<ExitReason> {
        let mut exit = None;
        while let Ok(request) = rx.try_recv() {
            if let Some(reason) = state.apply_git_result(handle_request(vcs, request)) {
                exit = Some(reason);
            }
        }
        exit
    }

    fn loaded(vcs: &FakeVcs) -> (AppState, Receiver<GitRequest>) {
        let (mut state, rx) = state();
        state.begin_reload();
        assert!(state.loading);
        pump(&mut state, &rx, vcs);
        assert!(!state.loading);
        (state, rx)
    }

    #[test]
    fn reload_populates_and_marks_applied() {
        let vcs = repo();
        let (state, _rx) = loaded(&vcs);
        assert_eq!(state.store.len(), 3);
        assert!(state.store.get(1).unwrap().already_applied);
        assert_eq!(state.view.cursor(), 0);
    }

    #[test]
    fn reload_keeps_requested_orientation() {
        let vcs = repo();
        let (mut state, rx) = state();
        state.oldest_first = true;
        state.begin_reload();
        pump(&mut state, &rx, &vcs);
        assert_eq!(state.current_commit().unwrap().id, "c1");
    }

    #[test]
    fn preview_follows_the_cursor_and_drops_stale_results() {
        let vcs = repo();
        let (mut state, rx) = loaded(&vcs);
        state.toggle_preview();
        state.move_down(1);
        // Two loads were requested; only the one for c2 may land.
        pump(&mut state, &rx, &vcs);
        assert_eq!(state.preview.commit_id(), Some("c2"));
        assert!(state.preview.diff().text().unwrap().contains("src/c2.rs"));
        assert!(!state.preview_lines.is_empty());
        assert_eq!(vcs.count("fetch_diff"), 2);
    }

    #[test]
    fn preview_off_never_requests() {
        let vcs = repo();
        let (mut state, rx) = loaded(&vcs);
        state.move_down(2);
        pump(&mut state, &rx, &vcs);
        assert_eq!(vcs.count("fetch_diff"), 0);
    }

    #[test]
    fn search_confirm_with_no_matches_restores_full_view() {
        let vcs = repo();
        let (mut state, _rx) = loaded(&vcs);
        state.start_search();
        for c in "zzz".chars() {
            state.push_search_char(c);
        }
        assert!(state.view.is_empty());
        state.end_search(true);
        assert!(!state.searching);
        assert_eq!(state.view.len(), 3);
    }

    #[test]
    fn search_confirm_keeps_a_matching_filter() {
        let vcs = repo();
        let (mut state, _rx) = loaded(&vcs);
        state.start_search();
        for c in "fix".chars() {
            state.push_search_char(c);
        }
        state.end_search(true);
        assert_eq!(state.view.indices(), &[0, 2]);
    }

    #[test]
    fn range_survives_reverse_on_the_same_commits() {
        let vcs = repo();
        let (mut state, _rx) = loaded(&vcs);
        state.toggle_range();
        state.move_down(2);
        state.toggle_order();
        assert_eq!(state.range.span(), Some((0, 2)));
        state.toggle_range();
        let mut picked = state.store.selected_ids();
        picked.sort();
        assert_eq!(picked, vec!["c1", "c3"]);
    }

    #[test]
    fn replay_request_needs_a_selection_and_is_oldest_first() {
        let vcs = repo();
        let (mut state, _rx) = loaded(&vcs);
        assert_eq!(state.replay_request(), None);
        assert_eq!(state.rebase_request(), None);
        state.select_all_visible();
        assert_eq!(state.replay_request(), Some(ExitReason::Replay(vec!["c1".into(), "c3".into()])));
        assert_eq!(state.rebase_request(), Some(ExitReason::Rebase("c1".into())));
    }

    #[test]
    fn switch_confirm_rewrites_scope_and_reloads() {
        let vcs = FakeVcs { branches: vec!["dev".into(), "release".into(), "staging".into()], ..repo() };
        let (mut state, rx) = loaded(&vcs);
        state.store.toggle(0);
        state.open_switch(SwitchKind::TargetBranch);
        state.confirm_switch();
        assert!(state.switch_session().is_some(), "confirm while loading is ignored");
        pump(&mut state, &rx, &vcs);
        assert_eq!(state.switch_session().unwrap().cursor(), 2);
        state.switch_session().unwrap().move_up(1);
        state.confirm_switch();
        assert!(state.overlay.is_none());
        assert_eq!(state.scope.target_branch, "release");
        assert!(state.loading);
        pump(&mut state, &rx, &vcs);
        assert!(!state.store.has_selection());
        assert!(!state.store.get(1).unwrap().already_applied);
    }

    #[test]
    fn cancelled_switch_ignores_late_candidates() {
        let vcs = FakeVcs { authors: vec!["Ada".into()], ..repo() };
        let (mut state, rx) = loaded(&vcs);
        state.open_switch(SwitchKind::Author);
        state.close_overlay();
        pump(&mut state, &rx, &vcs);
        assert!(state.overlay.is_none());
        assert_eq!(state.scope.author, "Ada");
    }

    #[test]
    fn continue_with_markers_keeps_the_session_open() {
        let vcs = repo();
        vcs.conflicted.borrow_mut().push(conflicted_file("src/lib.rs", true));
        let (mut state, rx) = loaded(&vcs);
        state.enter_conflict("c1", vec!["c3".into()], true);
        pump(&mut state, &rx, &vcs);
        state.conflict_request(GitRequest::ContinueReplay);
        assert_eq!(pump(&mut state, &rx, &vcs), None);
        let session = state.conflict_session().unwrap();
        assert_eq!(session.unresolved_count(), 1);
        assert!(session.message.as_deref().unwrap().contains("still contain"));
        assert_eq!(vcs.count("continue"), 0);
    }

    #[test]
    fn resolved_conflict_resumes_the_queue() {
        let vcs = repo();
        vcs.conflicted.borrow_mut().push(conflicted_file("src/lib.rs", false));
        let (mut state, rx) = loaded(&vcs);
        state.enter_conflict("c1", vec!["c3".into()], true);
        pump(&mut state, &rx, &vcs);
        state.conflict_request(GitRequest::ContinueReplay);
        assert_eq!(pump(&mut state, &rx, &vcs), Some(ExitReason::ResumeReplay(vec!["c3".into()])));
        assert!(state.overlay.is_none());
        assert_eq!(vcs.calls().last().unwrap(), "continue src/lib.rs");
    }

    #[test]
    fn skip_with_empty_queue_completes_the_run() {
        let vcs = repo();
        let (mut state, rx) = loaded(&vcs);
        state.enter_conflict("c1", Vec::new(), true);
        pump(&mut state, &rx, &vcs);
        state.conflict_request(GitRequest::SkipReplay);
        assert_eq!(pump(&mut state, &rx, &vcs), Some(ExitReason::ReplayCompleted));
    }

    #[test]
    fn abort_outside_a_run_reloads_instead_of_exiting() {
        let vcs = repo();
        let (mut state, rx) = state();
        state.enter_conflict("c1", Vec::new(), false);
        pump(&mut state, &rx, &vcs);
        state.conflict_request(GitRequest::AbortReplay);
        assert_eq!(pump(&mut state, &rx, &vcs), None);
        assert!(state.overlay.is_none());
        assert_eq!(state.store.len(), 3);
        assert_eq!(state.status.as_deref(), Some("Cherry-pick aborted"));
    }

    #[test]
    fn busy_session_refuses_a_second_request() {
        let vcs = repo();
        let (mut state, rx) = state();
        state.enter_conflict("c1", Vec::new(), false);
        state.conflict_request(GitRequest::SkipReplay);
        pump(&mut state, &rx, &vcs);
        assert_eq!(vcs.count("skip"), 0);
    }

    #[test]
    fn cancel_waits_for_an_in_flight_continue() {
        let vcs = repo();
        let (mut state, rx) = loaded(&vcs);
        state.enter_conflict("c1", vec!["c3".into()], true);
        pump(&mut state, &rx, &vcs);
        state.conflict_request(GitRequest::ContinueReplay);
        assert_eq!(state.cancel_conflict(), None);
        assert!(matches!(state.overlay, Some(Overlay::Conflict(_))));
        assert_eq!(state.pending_replay, vec!["c3".to_owned()]);
        assert_eq!(pump(&mut state, &rx, &vcs), Some(ExitReason::ResumeReplay(vec!["c3".into()])));
        assert_eq!(vcs.count("continue"), 1);
    }

    #[test]
    fn barrier_comes_back_idle_after_earlier_requests() {
        let vcs = repo();
        let (mut state, rx) = state();
        state.begin_reload();
        assert!(state.request_barrier());
        let served: Vec<GitRequest> = rx.try_iter().collect();
        assert_eq!(served.last(), Some(&GitRequest::Barrier));
        for request in served {
            assert_eq!(state.apply_git_result(handle_request(&vcs, request)), None);
        }
        assert_eq!(state.store.len(), 3);
    }

    #[test]
    fn barrier_without_a_worker_reports_false() {
        let state = AppState::new(scope(), "feature", DisplayOptions::default());
        assert!(!state.request_barrier());
    }

    #[test]
    fn editor_choice_yields_launch_for_marked_files() {
        let vcs = FakeVcs {
            editors: vec![EditorOption { command: "vim".into(), description: "Vim".into(), terminal: true }],
            ..repo()
        };
        vcs.conflicted.borrow_mut().push(conflicted_file("a.rs", true));
        vcs.conflicted.borrow_mut().push(conflicted_file("b.rs", false));
        let (mut state, rx) = state();
        state.enter_conflict("c1", Vec::new(), true);
        pump(&mut state, &rx, &vcs);
        state.conflict_request(GitRequest::ListEditors);
        pump(&mut state, &rx, &vcs);
        let launch = state.choose_editor(None).unwrap();
        assert_eq!(launch.option.command, "vim");
        assert_eq!(launch.paths, vec!["a.rs"]);
        state.after_editor(Err("exit status 1".into()));
        pump(&mut state, &rx, &vcs);
        let session = state.conflict_session().unwrap();
        assert!(!session.is_choosing_editor());
        assert_eq!(session.message.as_deref(), Some("Editor failed: exit status 1"));
    }
}
