//! Help overlay renderer for cherrypick.
//!
//! Draws a centred modal over the list. `Clear` erases the background first,
//! so the modal needs no second draw call.

use ratatui::{
    Frame,
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay, scrolled down by `help_scroll` rows.
///
/// Skipped on terminals narrower than 50 columns, where the centred area
/// would collapse to nothing.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 50 {
        return;
    }

    let overlay_area = frame.area().centered(Constraint::Percentage(80), Constraint::Percentage(80));
    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help  j/k scroll, ? or Esc to dismiss ")
        .border_style(Style::default().fg(theme.border_active));

    // Clamp so `G` lands on the last page instead of a blank one.
    let text = build_help_text(theme);
    let max_scroll = (text.lines.len() as u16).saturating_sub(overlay_area.height.saturating_sub(2));

    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: false }).scroll((help_scroll.min(max_scroll), 0)),
        overlay_area,
    );
}

fn build_help_text(theme: &Theme) -> Text<'static> {
    let heading = |s: &'static str| Line::styled(s, Style::default().fg(theme.title).add_modifier(Modifier::BOLD));
    Text::from(vec![
        heading("Navigation"),
        Line::from("  j / k / ↓ / ↑    Move down / up (n also moves down)"),
        Line::from("  PgDn / PgUp      Page down / up"),
        Line::from("  Ctrl-f / Ctrl-b  Page down / up"),
        Line::from(""),
        heading("Selection"),
        Line::from("  Space / Enter    Toggle the commit under the cursor"),
        Line::from("  r                Start a range, press again to mark it"),
        Line::from("  Esc              Cancel an open range"),
        Line::from("  a                Select every visible commit"),
        Line::from("  c                Clear the selection"),
        Line::from(""),
        heading("View"),
        Line::from("  / or f           Search; Enter keeps the filter, Esc clears it"),
        Line::from("  p / Tab          Toggle the diff preview"),
        Line::from("  d                Toggle detail rows"),
        Line::from("  H                Hide or show already-applied commits"),
        Line::from("  R                Reverse the list order"),
        Line::from(""),
        heading("Scope"),
        Line::from("  b                Switch target branch"),
        Line::from("  B                Switch source branch"),
        Line::from("  A                Switch author"),
        Line::from("  (in a switch)    / filter, r refresh, Enter confirm, Esc cancel"),
        Line::from(""),
        heading("Actions"),
        Line::from("  e / x            Cherry-pick the selection, oldest first"),
        Line::from("  i                Interactive rebase from the oldest selected commit"),
        Line::from(""),
        heading("Conflicts"),
        Line::from("  1 / e            Open an editor or merge tool"),
        Line::from("  2 / s            Skip this commit"),
        Line::from("  3 / a            Abort the cherry-pick"),
        Line::from("  4 / c            Continue once markers are gone"),
        Line::from("  r                Refresh the file list"),
        Line::from(""),
        heading("General"),
        Line::from("  ?                Open / close this help"),
        Line::from("  q / Ctrl-c       Quit"),
    ])
}
