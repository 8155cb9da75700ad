//! Conflict session overlay.
//!
//! Lists the unmerged files with their porcelain status and whether marker
//! text is still present, followed by the action menu. In the editor-choice
//! phase the menu is replaced by the numbered list of tools.

use ratatui::{
    Frame,
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Clear, Paragraph, Wrap},
};

use cherrypick_core::conflict::{ConflictPhase, ConflictSession};
use cherrypick_core::types::EditorOption;

use crate::theme::Theme;

pub fn render_conflict_overlay(frame: &mut Frame, session: &ConflictSession, theme: &Theme) {
    let area = frame.area().centered(Constraint::Percentage(85), Constraint::Percentage(85));
    frame.render_widget(Clear, area);

    let short: String = session.commit_id().chars().take(8).collect();
    let block = Block::bordered()
        .title(format!(" Conflict while cherry-picking {short} "))
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(theme.status_mode_conflict));

    let mut lines = file_lines(session, theme);
    lines.push(Line::raw(""));

    if let Some(message) = &session.message {
        lines.push(Line::styled(message.clone(), Style::default().fg(theme.warning)));
        lines.push(Line::raw(""));
    }

    match session.phase() {
        ConflictPhase::Open if session.busy => {
            lines.push(Line::styled("Working...", Style::default().fg(theme.detail)));
        }
        ConflictPhase::Open => lines.extend(menu_lines(theme)),
        ConflictPhase::EditorChoice { options, cursor } => lines.extend(editor_lines(options, *cursor, theme)),
    }

    frame.render_widget(Paragraph::new(Text::from(lines)).block(block).wrap(Wrap { trim: false }), area);
}

fn file_lines(session: &ConflictSession, theme: &Theme) -> Vec<Line<'static>> {
    let files = session.files();
    if files.is_empty() {
        let msg = if session.busy { "Checking conflicted files..." } else { "No conflicted files" };
        return vec![Line::styled(msg, Style::default().fg(theme.detail))];
    }

    let mut lines = vec![Line::styled(
        format!("{} conflicted file(s), {} with markers", files.len(), session.unresolved_count()),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for (i, file) in files.iter().enumerate() {
        let (icon, state_text, color) = if file.has_markers {
            ("✗", "Contains conflict markers", theme.conflict_markers)
        } else {
            ("✓", "Resolved", theme.conflict_resolved)
        };
        lines.push(Line::from(vec![
            Span::raw(format!("  {}. ", i + 1)),
            Span::styled(icon, Style::default().fg(color)),
            Span::raw(format!(" {}", file.path)),
        ]));
        lines.push(Line::styled(
            format!("       Status: {} - {}", file.status_code, file.description),
            Style::default().fg(theme.detail),
        ));
        lines.push(Line::styled(format!("       {state_text}"), Style::default().fg(color)));
    }
    lines
}

fn menu_lines(theme: &Theme) -> Vec<Line<'static>> {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(theme.border_active).add_modifier(Modifier::BOLD));
    vec![
        Line::styled("Options:", Style::default().add_modifier(Modifier::BOLD)),
        Line::from(vec![key("  1"), Span::raw("  Open an editor or merge tool")]),
        Line::from(vec![key("  2"), Span::raw("  Skip this commit")]),
        Line::from(vec![key("  3"), Span::raw("  Abort the cherry-pick")]),
        Line::from(vec![key("  4"), Span::raw("  Continue (all markers must be gone)")]),
        Line::from(vec![key("  r"), Span::raw("  Refresh the file list")]),
        Line::from(vec![key("  ESC"), Span::raw(" Leave the cherry-pick paused")]),
        Line::raw(""),
        Line::styled(
            "Tip: resolve the files in another terminal, then press r and 4.",
            Style::default().fg(theme.detail).add_modifier(Modifier::ITALIC),
        ),
    ]
}

fn editor_lines(options: &[EditorOption], cursor: usize, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled("Choose a tool:", Style::default().add_modifier(Modifier::BOLD))];
    if options.is_empty() {
        lines.push(Line::styled("  No editors found on PATH", Style::default().fg(theme.warning)));
    }
    for (i, option) in options.iter().enumerate() {
        let style = if i == cursor {
            Style::default().bg(theme.cursor_bg).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::styled(format!("  {}. {} ({})", i + 1, option.description, option.command), style));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled("Enter or a number to launch, Esc to go back", Style::default().fg(theme.detail)));
    lines
}
