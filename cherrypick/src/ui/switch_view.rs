//! Switch session overlay: pick a new source branch, target branch, or author.

use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, List, ListItem, ListState, Paragraph},
};

use cherrypick_core::switch::SwitchSession;

use crate::theme::Theme;

/// Renders the session as a centred modal: candidate list plus a one-row footer.
///
/// The footer shows the filter prompt while searching and the key hints
/// otherwise. The entry equal to the field's present value is tagged
/// `(current)`.
pub fn render_switch_overlay(frame: &mut Frame, session: &SwitchSession, theme: &Theme) {
    let area = frame.area().centered(Constraint::Percentage(60), Constraint::Percentage(70));
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(format!(" Select {} ", session.kind().label()))
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(theme.border_active));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [list_area, footer] = inner.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));
    let dim = Style::default().fg(theme.detail);

    if session.is_loading() {
        frame.render_widget(Paragraph::new(Line::styled("Loading...", dim)), list_area);
    } else if let Some(error) = session.error() {
        frame.render_widget(
            Paragraph::new(Line::styled(format!("Error: {error}"), Style::default().fg(theme.error))),
            list_area,
        );
    } else if session.visible_len() == 0 {
        frame.render_widget(Paragraph::new(Line::styled("No matches", dim)), list_area);
    } else {
        let items: Vec<ListItem> = session
            .visible()
            .map(|candidate| {
                let mut spans = vec![Span::raw(candidate.to_owned())];
                if candidate == session.current() {
                    spans.push(Span::styled(" (current)", Style::default().fg(theme.selected)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().bg(theme.cursor_bg).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");
        let mut list_state = ListState::default().with_selected(Some(session.cursor()));
        frame.render_stateful_widget(list, list_area, &mut list_state);
    }

    let footer_line = if session.is_searching() {
        Line::from(vec![
            Span::styled("/", Style::default().fg(theme.status_mode_search)),
            Span::raw(session.query().to_owned()),
            Span::styled("█", Style::default().fg(theme.cursor_blink)),
            Span::styled("  enter keep, esc clear", dim),
        ])
    } else if !session.query().is_empty() {
        Line::styled(format!("filter: {}   enter select, / edit, esc cancel", session.query()), dim)
    } else {
        Line::styled("enter select  / filter  r refresh  esc cancel", dim)
    };
    frame.render_widget(Paragraph::new(footer_line), footer);
}
