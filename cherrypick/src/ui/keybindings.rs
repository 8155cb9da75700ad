//! Keybinding dispatcher for cherrypick.
//!
//! Translates crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` telling the event loop what to do next. Routing is a strict
//! priority order so no key is ever seen by two handlers:
//!
//! 1. `Ctrl-C` quits from anywhere.
//! 2. While a commit reload is in flight, only `q` is accepted.
//! 3. An open overlay (switch session, conflict session, help) takes the key.
//!    The conflict handler checks its editor-choice sub-mode first.
//! 4. Search input, when the search flag is set.
//! 5. Normal navigation.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use cherrypick_core::types::SwitchKind;

use crate::app::{AppState, EditorLaunch, ExitReason, Overlay, PAGE_ROWS, SWITCH_PAGE_ROWS};
use crate::git::types::GitRequest;

/// Control-flow signal returned from the key dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Stay in the event loop.
    Continue,
    /// Leave the event loop and let `main` act on the reason.
    Exit(ExitReason),
    /// Suspend the terminal, run an editor, then resume.
    Suspend(EditorLaunch),
}

/// Dispatches one key event.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Exit(ExitReason::Quit);
    }
    if state.loading {
        return match key.code {
            KeyCode::Char('q') => KeyAction::Exit(ExitReason::Quit),
            _ => KeyAction::Continue,
        };
    }
    let choosing_editor = matches!(&state.overlay, Some(Overlay::Conflict(s)) if s.is_choosing_editor());
    match state.overlay {
        Some(Overlay::Switch(_)) => handle_switch(key, state),
        Some(Overlay::Conflict(_)) if choosing_editor => handle_editor_choice(key, state),
        Some(Overlay::Conflict(_)) => handle_conflict(key, state),
        Some(Overlay::Help) => handle_help(key, state),
        None if state.searching => handle_search(key, state),
        None => handle_normal(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_scroll_key(key, state) {
        return action;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Continue;
    }

    match key.code {
        KeyCode::Char('q') => return KeyAction::Exit(ExitReason::Quit),
        KeyCode::Enter | KeyCode::Char(' ') => state.toggle_current(),
        KeyCode::Char('/') | KeyCode::Char('f') => state.start_search(),
        KeyCode::Char('p') | KeyCode::Tab => state.toggle_preview(),
        KeyCode::Char('b') => state.open_switch(SwitchKind::TargetBranch),
        KeyCode::Char('B') => state.open_switch(SwitchKind::SourceBranch),
        KeyCode::Char('A') => state.open_switch(SwitchKind::Author),
        KeyCode::Char('r') => state.toggle_range(),
        KeyCode::Esc => state.cancel_range(),
        KeyCode::Char('R') => state.toggle_order(),
        KeyCode::Char('d') => state.toggle_detail(),
        KeyCode::Char('H') => state.toggle_hide_applied(),
        KeyCode::Char('a') => state.select_all_visible(),
        KeyCode::Char('c') => state.clear_selection(),
        KeyCode::Char('?') => state.open_help(),
        KeyCode::Char('e') | KeyCode::Char('x') => {
            if let Some(reason) = state.replay_request() {
                return KeyAction::Exit(reason);
            }
        }
        KeyCode::Char('i') => {
            if let Some(reason) = state.rebase_request() {
                return KeyAction::Exit(reason);
            }
        }
        _ => {}
    }
    KeyAction::Continue
}

/// Cursor movement in the commit list: j/k, arrows, and paging.
///
/// Returns `None` when the key is not a movement key.
fn handle_scroll_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('n') if !ctrl => state.move_down(1),
        KeyCode::Up | KeyCode::Char('k') if !ctrl => state.move_up(1),
        KeyCode::PageDown => state.move_down(PAGE_ROWS),
        KeyCode::PageUp => state.move_up(PAGE_ROWS),
        KeyCode::Char('f') if ctrl => state.move_down(PAGE_ROWS),
        KeyCode::Char('b') if ctrl => state.move_up(PAGE_ROWS),
        _ => return None,
    }
    Some(KeyAction::Continue)
}

// ---------------------------------------------------------------------------
// Search input
// ---------------------------------------------------------------------------

/// Typed characters extend the query; arrows still move and Tab still toggles.
fn handle_search(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Esc => state.end_search(false),
        KeyCode::Enter => state.end_search(true),
        KeyCode::Backspace => state.pop_search_char(),
        KeyCode::Up => state.move_up(1),
        KeyCode::Down => state.move_down(1),
        KeyCode::Tab => state.toggle_current(),
        KeyCode::Char(c) if is_text_input(key) => state.push_search_char(c),
        _ => {}
    }
    KeyAction::Continue
}

/// Plain or shifted printable characters; anything with Ctrl or Alt is a command.
fn is_text_input(key: KeyEvent) -> bool {
    !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

// ---------------------------------------------------------------------------
// Switch session
// ---------------------------------------------------------------------------

fn handle_switch(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let Some(session) = state.switch_session() else {
        return KeyAction::Continue;
    };

    if session.is_searching() {
        match key.code {
            KeyCode::Esc => session.end_search(false),
            // An empty match list is not worth keeping.
            KeyCode::Enter => {
                let keep = session.visible_len() > 0;
                session.end_search(keep);
            }
            KeyCode::Backspace => session.pop_char(),
            KeyCode::Up => session.move_up(1),
            KeyCode::Down => session.move_down(1),
            KeyCode::Char(c) if is_text_input(key) => session.push_char(c),
            _ => {}
        }
        return KeyAction::Continue;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') => return KeyAction::Exit(ExitReason::Quit),
        KeyCode::Esc => state.close_overlay(),
        KeyCode::Enter | KeyCode::Char(' ') => state.confirm_switch(),
        KeyCode::Down | KeyCode::Char('j') => session.move_down(1),
        KeyCode::Up | KeyCode::Char('k') => session.move_up(1),
        KeyCode::PageDown => session.move_down(SWITCH_PAGE_ROWS),
        KeyCode::PageUp => session.move_up(SWITCH_PAGE_ROWS),
        KeyCode::Char('f') if ctrl => session.move_down(SWITCH_PAGE_ROWS),
        KeyCode::Char('b') if ctrl => session.move_up(SWITCH_PAGE_ROWS),
        KeyCode::Char('/') | KeyCode::Char('f') => {
            if !session.is_loading() {
                session.start_search();
            }
        }
        KeyCode::Char('r') => state.refresh_switch(),
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Conflict session
// ---------------------------------------------------------------------------

fn handle_conflict(key: KeyEvent, state: &mut AppState) -> KeyAction {
    // Leaving now would drop the outcome of the running request.
    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) && state.conflict_in_flight() {
        return KeyAction::Continue;
    }
    match key.code {
        KeyCode::Char('q') => return KeyAction::Exit(ExitReason::Quit),
        KeyCode::Esc => {
            if let Some(reason) = state.cancel_conflict() {
                return KeyAction::Exit(reason);
            }
        }
        KeyCode::Char('c') | KeyCode::Char('4') => state.conflict_request(GitRequest::ContinueReplay),
        KeyCode::Char('a') | KeyCode::Char('3') => state.conflict_request(GitRequest::AbortReplay),
        KeyCode::Char('s') | KeyCode::Char('2') => state.conflict_request(GitRequest::SkipReplay),
        KeyCode::Char('1') | KeyCode::Char('e') => state.conflict_request(GitRequest::ListEditors),
        KeyCode::Char('r') => state.conflict_request(GitRequest::ListConflicts),
        _ => {}
    }
    KeyAction::Continue
}

fn handle_editor_choice(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let Some(session) = state.conflict_session() else {
        return KeyAction::Continue;
    };
    let chosen = match key.code {
        KeyCode::Char('q') => return KeyAction::Exit(ExitReason::Quit),
        KeyCode::Esc => {
            session.close_editor_choice();
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            session.editor_down();
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            session.editor_up();
            None
        }
        KeyCode::Enter | KeyCode::Char(' ') => state.choose_editor(None),
        KeyCode::Char(d @ '1'..='9') => state.choose_editor(d.to_digit(10).map(|n| n as usize - 1)),
        _ => None,
    };
    match chosen {
        Some(launch) => KeyAction::Suspend(launch),
        None => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// Help overlay
// ---------------------------------------------------------------------------

/// `?`, `Esc`, or `q` dismisses the overlay; j/k/g/G scroll it.
fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.help_scroll = state.help_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('G') => state.help_scroll = u16::MAX,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.close_overlay(),
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Scroll wheel moves whatever list has focus by 3 rows.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) {
    if state.loading {
        return;
    }
    let down = match mouse.kind {
        MouseEventKind::ScrollDown => true,
        MouseEventKind::ScrollUp => false,
        _ => return,
    };
    match &mut state.overlay {
        Some(Overlay::Switch(session)) => {
            if down {
                session.move_down(3);
            } else {
                session.move_up(3);
            }
        }
        Some(Overlay::Help) => {
            state.help_scroll =
                if down { state.help_scroll.saturating_add(3) } else { state.help_scroll.saturating_sub(3) };
        }
        Some(Overlay::Conflict(_)) => {}
        None => {
            if down {
                state.move_down(3);
            } else {
                state.move_up(3);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::DisplayOptions;
    use crate::git::worker::handle_request;
    use cherrypick_core::fake::{conflicted_file, FakeVcs};
    use cherrypick_core::types::Scope;
    use crossbeam_channel::Receiver;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ch(c: char) -> KeyEvent {
        key(KeyCode::Char(c))
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn vcs() -> FakeVcs {
        let mut vcs = FakeVcs::new().with_ref("staging").with_applied("staging", "c1");
        for i in (0..30).rev() {
            vcs = vcs.with_commit(&format!("c{i}"), &format!("change {i}"), i);
        }
        vcs.branches = vec!["main".into(), "staging".into()];
        vcs
    }

    fn pump(state: &mut AppState, rx: &Receiver<GitRequest>, vcs: &FakeVcs) -> Option<ExitReason> {
        let mut exit = None;
        while let Ok(request) = rx.try_recv() {
            if let Some(reason) = state.apply_git_result(handle_request(vcs, request)) {
                exit = Some(reason);
            }
        }
        exit
    }

    fn setup(vcs: &FakeVcs) -> (AppState, Receiver<GitRequest>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let scope = Scope {
            source_branch: "dev".into(),
            target_branch: "staging".into(),
            author: "Ada".into(),
            remote: "origin".into(),
        };
        let mut state = AppState::new(scope, "feature", DisplayOptions::default());
        state.set_git_tx(tx);
        state.begin_reload();
        pump(&mut state, &rx, vcs);
        (state, rx)
    }

    #[test]
    fn keys_are_ignored_while_reloading_except_quit() {
        let vcs = vcs();
        let (mut state, _rx) = setup(&vcs);
        state.begin_reload();
        assert_eq!(handle_key(ch('j'), &mut state), KeyAction::Continue);
        assert_eq!(state.view.cursor(), 0);
        assert_eq!(handle_key(ch('q'), &mut state), KeyAction::Exit(ExitReason::Quit));
    }

    #[test]
    fn ctrl_c_quits_from_search() {
        let vcs = vcs();
        let (mut state, _rx) = setup(&vcs);
        handle_key(ch('/'), &mut state);
        assert_eq!(handle_key(ctrl('c'), &mut state), KeyAction::Exit(ExitReason::Quit));
    }

    #[test]
    fn paging_clamps_to_the_view() {
        let vcs = vcs();
        let (mut state, _rx) = setup(&vcs);
        handle_key(key(KeyCode::PageDown), &mut state);
        assert_eq!(state.view.cursor(), 25);
        handle_key(ctrl('f'), &mut state);
        assert_eq!(state.view.cursor(), 29);
        handle_key(ctrl('b'), &mut state);
        assert_eq!(state.view.cursor(), 4);
        handle_key(key(KeyCode::PageUp), &mut state);
        assert_eq!(state.view.cursor(), 0);
    }

    #[test]
    fn search_typing_shadows_normal_keys() {
        let vcs = vcs();
        let (mut state, _rx) = setup(&vcs);
        handle_key(ch('f'), &mut state);
        assert!(state.searching);
        for c in "c2".chars() {
            handle_key(ch(c), &mut state);
        }
        assert_eq!(state.view.query(), "c2");
        // c2 plus c20..c29
        assert_eq!(state.view.len(), 11);
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.store.selected_count(), 1);
        handle_key(key(KeyCode::Esc), &mut state);
        assert!(!state.searching);
        assert_eq!(state.view.len(), 30);
        assert!(state.overlay.is_none());
    }

    #[test]
    fn applied_commit_cannot_be_toggled() {
        let vcs = vcs();
        let (mut state, _rx) = setup(&vcs);
        let row = state.view.row_of(state.store.position_of("c1").unwrap()).unwrap();
        state.view.set_cursor(row);
        handle_key(ch(' '), &mut state);
        assert!(!state.store.has_selection());
    }

    #[test]
    fn execute_without_selection_stays_in_the_loop() {
        let vcs = vcs();
        let (mut state, _rx) = setup(&vcs);
        assert_eq!(handle_key(ch('e'), &mut state), KeyAction::Continue);
        assert_eq!(handle_key(ch('i'), &mut state), KeyAction::Continue);
        handle_key(ch(' '), &mut state);
        assert_eq!(handle_key(ch('x'), &mut state), KeyAction::Exit(ExitReason::Replay(vec!["c29".into()])));
    }

    #[test]
    fn switch_overlay_captures_keys_until_cancelled() {
        let vcs = vcs();
        let (mut state, rx) = setup(&vcs);
        handle_key(ch('b'), &mut state);
        pump(&mut state, &rx, &vcs);
        // 'a' would select all in normal mode.
        handle_key(ch('a'), &mut state);
        assert!(!state.store.has_selection());
        handle_key(ch('k'), &mut state);
        assert_eq!(state.switch_session().unwrap().confirm().as_deref(), Some("main"));
        handle_key(key(KeyCode::Esc), &mut state);
        assert!(state.overlay.is_none());
        assert_eq!(state.scope.target_branch, "staging");
    }

    #[test]
    fn switch_search_then_confirm_reloads() {
        let vcs = vcs();
        let (mut state, rx) = setup(&vcs);
        handle_key(ch('B'), &mut state);
        pump(&mut state, &rx, &vcs);
        handle_key(ch('/'), &mut state);
        for c in "mai".chars() {
            handle_key(ch(c), &mut state);
        }
        handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(state.switch_session().unwrap().query(), "mai");
        handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(state.scope.source_branch, "main");
        assert!(state.loading);
        pump(&mut state, &rx, &vcs);
        assert!(!state.loading);
    }

    #[test]
    fn conflict_keys_route_to_the_session() {
        let vcs = vcs();
        vcs.conflicted.borrow_mut().push(conflicted_file("a.rs", false));
        let (mut state, rx) = setup(&vcs);
        state.enter_conflict("c5", vec!["c6".into()], true);
        pump(&mut state, &rx, &vcs);
        // Normal-mode selection keys do nothing here.
        handle_key(ch(' '), &mut state);
        assert!(!state.store.has_selection());
        handle_key(ch('4'), &mut state);
        assert_eq!(pump(&mut state, &rx, &vcs), Some(ExitReason::ResumeReplay(vec!["c6".into()])));
    }

    #[test]
    fn quit_keys_wait_while_continue_runs() {
        let vcs = vcs();
        let (mut state, rx) = setup(&vcs);
        state.enter_conflict("c5", vec!["c6".into()], true);
        pump(&mut state, &rx, &vcs);
        handle_key(ch('c'), &mut state);
        assert_eq!(handle_key(ch('q'), &mut state), KeyAction::Continue);
        assert_eq!(handle_key(key(KeyCode::Esc), &mut state), KeyAction::Continue);
        let session = state.conflict_session().unwrap();
        assert_eq!(session.message.as_deref(), Some("Waiting for git to finish..."));
        assert_eq!(pump(&mut state, &rx, &vcs), Some(ExitReason::ResumeReplay(vec!["c6".into()])));
        assert_eq!(vcs.count("continue"), 1);
    }

    #[test]
    fn editor_digit_picks_and_suspends() {
        let mut vcs = vcs();
        vcs.editors = vec![
            cherrypick_core::types::EditorOption { command: "nano".into(), description: "Nano".into(), terminal: true },
            cherrypick_core::types::EditorOption {
                command: "mergetool".into(),
                description: "Git mergetool".into(),
                terminal: true,
            },
        ];
        vcs.conflicted.borrow_mut().push(conflicted_file("a.rs", true));
        let (mut state, rx) = setup(&vcs);
        state.enter_conflict("c5", Vec::new(), false);
        pump(&mut state, &rx, &vcs);
        handle_key(ch('1'), &mut state);
        pump(&mut state, &rx, &vcs);
        let KeyAction::Suspend(launch) = handle_key(ch('2'), &mut state) else {
            panic!("expected suspend");
        };
        assert!(launch.option.is_mergetool());
        assert_eq!(launch.paths, vec!["a.rs"]);
    }

    #[test]
    fn help_closes_on_question_mark() {
        let vcs = vcs();
        let (mut state, _rx) = setup(&vcs);
        handle_key(ch('?'), &mut state);
        assert!(matches!(state.overlay, Some(Overlay::Help)));
        handle_key(ch('j'), &mut state);
        assert_eq!(state.view.cursor(), 0);
        handle_key(ch('?'), &mut state);
        assert!(state.overlay.is_none());
    }
}
