//! Commit list panel renderer for cherrypick.
//!
//! Renders the visible rows of the view as a `List`. Each row shows the range
//! marker, a selection box, the one-line commit, and optionally the date and
//! author. With detail on, a second line adds the change stats and a file
//! summary.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
};

use cherrypick_core::types::CommitRecord;

use crate::app::{AppState, DisplayOptions};
use crate::theme::Theme;
use crate::ui::layout::panel_block;

/// Per-row flags computed from the view, store, and range.
#[derive(Debug, Clone, Copy, Default)]
struct RowFlags {
    selected: bool,
    in_range: bool,
    is_cursor: bool,
    blink_on: bool,
    detail: bool,
}

/// Renders the commit list.
///
/// The `ListState` offset is rebuilt from `state.list_offset` each frame and
/// written back afterwards, so the list scrolls only when the cursor leaves
/// the viewport.
///
/// # Arguments
///
/// * `frame` — current render frame
/// * `area` — the list panel `Rect` (includes borders)
/// * `is_focused` — `false` while an overlay has the keys
/// * `state` — app state; `list_offset` is updated
/// * `theme` — active color theme
pub fn render_commit_list(frame: &mut Frame, area: Rect, is_focused: bool, state: &mut AppState, theme: &Theme) {
    let title = format!(" Commits ({}/{}) ", state.view.len(), state.store.len());
    let block = panel_block(title, is_focused, theme);

    if state.view.is_empty() {
        let msg = if state.loading {
            "Loading commits..."
        } else if !state.view.query().is_empty() {
            "No commits match the search"
        } else if state.store.is_empty() {
            "No commits to cherry-pick"
        } else {
            "All commits are hidden"
        };
        let list = List::new(vec![ListItem::new(Line::styled(msg, Style::default().fg(theme.detail)))]).block(block);
        frame.render_widget(list, area);
        return;
    }

    let cursor = state.view.cursor();
    let items: Vec<ListItem> = state
        .view
        .indices()
        .iter()
        .enumerate()
        .filter_map(|(row, &i)| {
            let commit = state.store.get(i)?;
            let flags = RowFlags {
                selected: state.store.is_selected(&commit.id),
                in_range: state.range.is_in_range(row),
                is_cursor: row == cursor,
                blink_on: state.cursor_blink,
                detail: state.detail,
            };
            Some(commit_item(commit, flags, &state.options, theme))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(theme.cursor_bg));

    let mut list_state = ListState::default().with_offset(state.list_offset).with_selected(Some(cursor));
    frame.render_stateful_widget(list, area, &mut list_state);
    state.list_offset = list_state.offset();
}

/// Converts a commit into a styled `ListItem`.
///
/// Format: `▌[x] a1b2c3d Fix the thing [merge]  2024-01-02 10:00  Ada`.
fn commit_item(commit: &CommitRecord, flags: RowFlags, options: &DisplayOptions, theme: &Theme) -> ListItem<'static> {
    let marker = if flags.in_range {
        Span::styled("▌", Style::default().fg(theme.range))
    } else {
        Span::raw(" ")
    };

    let box_text = if commit.already_applied {
        " ✓ "
    } else if flags.selected {
        "[x]"
    } else {
        "[ ]"
    };
    let box_style = if flags.is_cursor && flags.blink_on {
        Style::default().fg(theme.cursor_blink).add_modifier(Modifier::BOLD)
    } else if commit.already_applied {
        Style::default().fg(theme.applied)
    } else if flags.selected {
        Style::default().fg(theme.selected)
    } else {
        Style::default()
    };

    let text_style = if commit.already_applied {
        Style::default().fg(theme.applied).add_modifier(Modifier::DIM)
    } else if flags.selected {
        Style::default().fg(theme.selected)
    } else {
        Style::default()
    };

    let mut spans = vec![
        marker,
        Span::styled(box_text, box_style),
        Span::raw(" "),
        Span::styled(commit.short_id.clone(), Style::default().fg(theme.detail)),
        Span::raw(" "),
        Span::styled(truncate_message(&commit.summary, options.max_message_len), text_style),
    ];
    if commit.is_merge {
        spans.push(Span::styled(" [merge]", Style::default().fg(theme.merge)));
    }
    if options.show_date && !commit.date.is_empty() {
        spans.push(Span::styled(format!("  {}", commit.date), Style::default().fg(theme.detail)));
    }
    if options.show_author {
        spans.push(Span::styled(format!("  {}", commit.author), Style::default().fg(theme.detail)));
    }

    let mut lines = vec![Line::from(spans)];
    if flags.detail {
        lines.push(detail_line(commit, theme));
    }
    ListItem::new(lines)
}

/// `      (+12 -3) [src/lib.rs]  2024-01-02 10:00  Ada`
fn detail_line(commit: &CommitRecord, theme: &Theme) -> Line<'static> {
    let dim = Style::default().fg(theme.detail);
    Line::from(vec![
        Span::raw("      ("),
        Span::styled(format!("+{}", commit.insertions), Style::default().fg(theme.stat_added)),
        Span::raw(" "),
        Span::styled(format!("-{}", commit.deletions), Style::default().fg(theme.stat_removed)),
        Span::raw(") "),
        Span::styled(file_summary(&commit.changed_paths), dim),
        Span::styled(format!("  {}  {}", commit.date, commit.author), dim),
    ])
}

/// `[path]` for a single file, `[N files]` otherwise.
fn file_summary(paths: &[String]) -> String {
    match paths {
        [] => "[no files]".to_owned(),
        [only] => format!("[{only}]"),
        many => format!("[{} files]", many.len()),
    }
}

/// Cuts `message` to `max` characters, ending in `...` when cut.
fn truncate_message(message: &str, max: usize) -> String {
    if max == 0 || message.chars().count() <= max {
        return message.to_owned();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = message.chars().take(keep).collect();
    out.push_str("...");
    out
}
