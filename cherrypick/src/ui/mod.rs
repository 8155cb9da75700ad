//! UI rendering for cherrypick.
//!
//! `render()` is the single entry point, called from the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`; each
//! panel and overlay has its own module.

mod layout;
pub mod commit_list;
pub mod conflict_view;
pub mod help;
pub mod keybindings;
pub mod preview;
pub mod switch_view;

use ratatui::{Frame, style::Style, widgets::Block};

use crate::app::{AppState, Overlay};
use crate::theme::Theme;
use layout::{compute_layout, render_header, render_status_bar};

/// Renders one complete frame: header, list, optional preview, status bar,
/// then whichever overlay is open on top.
///
/// The list renderer writes its viewport height and scroll offset back into
/// `state`, so scrolling stays stable from one frame to the next.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let areas = compute_layout(frame, state);
    frame.render_widget(Block::default().style(Style::default().bg(theme.background)), frame.area());

    render_header(frame, areas.header, state, theme);
    commit_list::render_commit_list(frame, areas.list, state.overlay.is_none(), state, theme);
    if state.show_preview {
        preview::render_preview(frame, areas.preview, state, theme);
    }
    render_status_bar(frame, areas.status, state, theme);

    match &state.overlay {
        Some(Overlay::Switch(session)) => switch_view::render_switch_overlay(frame, session, theme),
        Some(Overlay::Conflict(session)) => conflict_view::render_conflict_overlay(frame, session, theme),
        Some(Overlay::Help) => help::render_help_overlay(frame, theme, state.help_scroll),
        None => {}
    }
}
