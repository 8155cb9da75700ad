//! Preview panel renderer for cherrypick.
//!
//! Shows the commit under the cursor: a header with the short id and badges,
//! the full message, the stat summary, and the highlighted diff prepared by
//! the git worker. While the worker has not answered yet, each half shows its
//! own loading line.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};

use cherrypick_core::preview::PreviewSlot;

use crate::app::AppState;
use crate::theme::Theme;
use crate::ui::layout::panel_block;

/// Renders the preview panel. Does nothing for a zero-sized area.
pub fn render_preview(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let block = panel_block(" Preview ", false, theme);

    let Some(commit) = state.current_commit() else {
        let empty = Paragraph::new(Line::styled("No commit selected", Style::default().fg(theme.detail))).block(block);
        frame.render_widget(empty, area);
        return;
    };

    let dim = Style::default().fg(theme.detail);
    let mut header = vec![Span::styled(
        commit.short_id.clone(),
        Style::default().fg(theme.border_active).add_modifier(Modifier::BOLD),
    )];
    if commit.already_applied {
        header.push(Span::styled(" ALREADY APPLIED", Style::default().fg(theme.applied).add_modifier(Modifier::BOLD)));
    }
    if commit.is_merge {
        header.push(Span::styled(" MERGE", Style::default().fg(theme.merge).add_modifier(Modifier::BOLD)));
    }

    let mut lines = vec![Line::from(header)];
    lines.extend(commit.full_message.lines().map(|l| Line::raw(l.to_owned())));
    lines.push(Line::styled(format!("{}  {}", commit.date, commit.author), dim));
    lines.push(Line::raw(""));

    match state.preview.stats() {
        PreviewSlot::Loading => lines.push(Line::styled("Loading stats...", dim)),
        PreviewSlot::Ready(stats) => lines.extend(stats.lines().map(|l| Line::styled(l.to_owned(), dim))),
        PreviewSlot::Failed(msg) => lines.push(Line::styled(msg.clone(), Style::default().fg(theme.error))),
    }
    lines.push(Line::raw(""));

    match state.preview.diff() {
        PreviewSlot::Loading => lines.push(Line::styled("Loading diff...", dim)),
        PreviewSlot::Ready(_) => lines.extend(state.preview_lines.iter().cloned()),
        PreviewSlot::Failed(msg) => lines.push(Line::styled(msg.clone(), Style::default().fg(theme.error))),
    }

    frame.render_widget(Paragraph::new(Text::from(lines)).block(block).wrap(Wrap { trim: false }), area);
}
