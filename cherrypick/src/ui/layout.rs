//! Screen layout for cherrypick.
//!
//! Pure layout arithmetic plus the two single-row bars (header and status).
//! Called inside `terminal.draw()` on every render, so every frame gets a
//! fresh layout that reflects the current terminal size.
//!
//! # Geometry
//!
//! ```text
//! header        1 row
//! list | diff   fill (diff only while the preview is on)
//! status        1 row
//! ```
//!
//! At `>= 110` columns the preview sits to the right of the list; below that
//! it stacks underneath. `Spacing::Overlap(1)` with `MergeStrategy::Fuzzy`
//! lets adjacent borders share one cell.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, Overlay};
use crate::theme::Theme;

/// Areas for one frame. `preview` is zero-sized while the preview is off.
pub struct Areas {
    pub header: Rect,
    pub list: Rect,
    pub preview: Rect,
    pub status: Rect,
}

pub fn compute_layout(frame: &Frame, state: &AppState) -> Areas {
    let [header, main_area, status] = frame.area().layout(&Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ]));

    if !state.show_preview {
        return Areas { header, list: main_area, preview: Rect::default(), status };
    }

    let split = if main_area.width >= 110 {
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
    } else {
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
    };
    let [list, preview] = main_area.layout(&split.spacing(Spacing::Overlap(1)));
    Areas { header, list, preview, status }
}

/// A bordered panel block. Thick border when the panel has focus.
///
/// `Fuzzy` merging is needed because `Exact` draws wrong junctions between
/// `Thick` and `Plain` borders.
pub fn panel_block<'a>(title: impl Into<Line<'a>>, is_focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .title_style(Style::default().fg(theme.title))
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the header: source and target branches, author filter, current branch.
pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let scope = &state.scope;
    let bold = Style::default().fg(theme.title).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(theme.detail);
    let author = if scope.author.is_empty() { "(any)" } else { scope.author.as_str() };

    let line = Line::from(vec![
        Span::styled(" Cherry-pick ", bold),
        Span::styled(scope.source_branch.as_str(), Style::default().fg(theme.border_active)),
        Span::styled(" → ", dim),
        Span::styled(scope.target_branch.as_str(), Style::default().fg(theme.selected)),
        Span::styled("   author: ", dim),
        Span::raw(author),
        Span::styled("   on ", dim),
        Span::raw(state.current_branch.as_str()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Renders the 1-row status bar.
///
/// Layout: mode badge, then the search prompt or the active flags and
/// counts, then the status notice if any. Never renders blank.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = mode_badge(state, theme);
    let mut spans = vec![Span::styled(mode_text, Style::default().fg(mode_fg).add_modifier(Modifier::BOLD))];

    if state.loading {
        spans.push(Span::raw(" Loading commits..."));
    } else if state.searching {
        spans.push(Span::raw(format!(" /{}", state.view.query())));
        spans.push(Span::styled("█", Style::default().fg(theme.cursor_blink)));
        spans.push(Span::styled(
            format!("  {} match(es)  enter keep, esc clear", state.view.len()),
            Style::default().fg(theme.detail),
        ));
    } else {
        spans.push(Span::raw(format!(" {}", summary_text(state))));
    }

    if let Some(status) = &state.status {
        spans.push(Span::styled(format!("  {status}"), Style::default().fg(theme.warning)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}

fn mode_badge(state: &AppState, theme: &Theme) -> (&'static str, ratatui::style::Color) {
    match &state.overlay {
        Some(Overlay::Conflict(_)) => (" CONFLICT ", theme.status_mode_conflict),
        Some(Overlay::Switch(s)) if s.is_searching() => (" FILTER ", theme.status_mode_search),
        Some(Overlay::Switch(_)) => (" SWITCH ", theme.status_mode_normal),
        Some(Overlay::Help) => (" HELP ", theme.status_mode_normal),
        None if state.searching => (" SEARCH ", theme.status_mode_search),
        None if state.range.is_open() => (" RANGE ", theme.range),
        None => (" NORMAL ", theme.status_mode_normal),
    }
}

/// Flags and counts, e.g. `[preview, detail] 3 selected · 2 merge · 4 applied · newest first`.
pub(crate) fn summary_text(state: &AppState) -> String {
    let mut modes = Vec::new();
    if state.range.is_open() {
        modes.push("range");
    }
    if state.show_preview {
        modes.push("preview");
    }
    if state.detail {
        modes.push("detail");
    }
    if !state.view.query().is_empty() {
        modes.push("filtered");
    }

    let mut parts = Vec::new();
    parts.push(format!("{}/{} shown", state.view.len(), state.store.len()));
    parts.push(format!("{} selected", state.store.selected_count()));
    let merges = state.store.merge_count();
    if merges > 0 {
        parts.push(format!("{merges} merge"));
    }
    let applied = state.store.applied_count();
    if applied > 0 {
        if state.view.hide_applied() {
            parts.push(format!("{applied} applied commits hidden"));
        } else {
            parts.push(format!("{applied} applied"));
        }
    }
    parts.push(if state.oldest_first { "oldest first".to_owned() } else { "newest first".to_owned() });

    let body = parts.join(" · ");
    if modes.is_empty() { body } else { format!("[{}] {body}", modes.join(", ")) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::DisplayOptions;
    use cherrypick_core::types::Scope;

    fn state() -> AppState {
        let scope = Scope {
            source_branch: "dev".into(),
            target_branch: "staging".into(),
            author: "Ada".into(),
            remote: "origin".into(),
        };
        AppState::new(scope, "feature", DisplayOptions::default())
    }

    #[test]
    fn summary_lists_active_modes_and_order() {
        let mut state = state();
        state.show_preview = true;
        state.detail = true;
        state.oldest_first = true;
        assert_eq!(summary_text(&state), "[preview, detail] 0/0 shown · 0 selected · oldest first");
    }

    #[test]
    fn summary_without_modes_has_no_brackets() {
        assert_eq!(summary_text(&state()), "0/0 shown · 0 selected · newest first");
    }
}
