//! Syntax and word-level highlighting of unified diff text for the preview pane.
//!
//! Runs on the worker thread so the UI only ever copies finished lines. The
//! code part of every `+`/`-`/context line is highlighted with syntect, using
//! the syntax of the file named by the enclosing `diff --git` header. Adjacent
//! removed/added pairs get word-level emphasis from `similar` instead.

use std::sync::LazyLock;

use cherrypick_core::preview::truncate;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use similar::{ChangeTag, TextDiff};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::{SyntaxReference, SyntaxSet};

pub(crate) static PS: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
pub(crate) static TS: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Highlights at most `limit` lines of `diff`, ending with a "more lines" marker when cut.
pub fn highlight_diff(diff: &str, limit: usize) -> Vec<Line<'static>> {
    let shown = truncate(diff, limit);
    let lines: Vec<&str> = shown.lines().collect();
    highlight_lines(&lines)
}

fn highlight_lines(lines: &[&str]) -> Vec<Line<'static>> {
    let theme = TS.themes.get("base16-ocean.dark").or_else(|| TS.themes.values().next());
    let Some(theme) = theme else {
        return lines.iter().map(|l| plain_line(l)).collect();
    };

    let mut out: Vec<Line<'static>> = Vec::new();
    let mut syntax = PS.find_syntax_plain_text();
    let mut h = HighlightLines::new(syntax, theme);
    let mut pending_removed: Option<(String, Vec<Span<'static>>)> = None;

    for &line in lines {
        if let Some(path) = line.strip_prefix("diff --git ") {
            flush(&mut pending_removed, &mut out);
            syntax = syntax_for(path);
            h = HighlightLines::new(syntax, theme);
            out.push(Line::from(Span::styled(
                line.to_owned(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            continue;
        }
        if line.starts_with("+++") || line.starts_with("---") || is_meta(line) {
            flush(&mut pending_removed, &mut out);
            out.push(Line::from(Span::styled(line.to_owned(), Style::default().fg(Color::DarkGray))));
            continue;
        }
        if line.starts_with("@@") {
            flush(&mut pending_removed, &mut out);
            // Fresh state per hunk; a hunk can start mid-comment or mid-string.
            h = HighlightLines::new(syntax, theme);
            out.push(Line::from(Span::styled(line.to_owned(), Style::default().fg(Color::Cyan))));
            continue;
        }

        match line.chars().next() {
            Some('-') => {
                flush(&mut pending_removed, &mut out);
                let code = &line[1..];
                let mut s = vec![Span::styled("- ", Style::default().fg(Color::Red))];
                s.extend(build_syntect_spans(code, &mut h));
                pending_removed = Some((code.to_owned(), s));
            }
            Some('+') => {
                let code = &line[1..];
                if let Some((old_code, _)) = pending_removed.take() {
                    let (old_word, new_word) = word_diff_spans(&old_code, code);
                    let mut old_s = vec![Span::styled("- ", Style::default().fg(Color::Red))];
                    old_s.extend(old_word);
                    out.push(Line::from(old_s));
                    let mut new_s = vec![Span::styled("+ ", Style::default().fg(Color::Green))];
                    new_s.extend(new_word);
                    out.push(Line::from(new_s));
                    // Keep the highlighter's parse state in step with the file.
                    let _ = h.highlight_line(code, &PS);
                } else {
                    let mut s = vec![Span::styled("+ ", Style::default().fg(Color::Green))];
                    s.extend(build_syntect_spans(code, &mut h));
                    out.push(Line::from(s));
                }
            }
            Some(' ') => {
                flush(&mut pending_removed, &mut out);
                let mut s = vec![Span::styled("  ", Style::default().fg(Color::DarkGray))];
                s.extend(build_syntect_spans(&line[1..], &mut h));
                out.push(Line::from(s));
            }
            _ if line.starts_with("... (") => {
                flush(&mut pending_removed, &mut out);
                out.push(Line::from(Span::styled(
                    line.to_owned(),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
            _ => {
                flush(&mut pending_removed, &mut out);
                out.push(plain_line(line));
            }
        }
    }
    flush(&mut pending_removed, &mut out);
    out
}

fn flush(pending: &mut Option<(String, Vec<Span<'static>>)>, out: &mut Vec<Line<'static>>) {
    if let Some((_, spans)) = pending.take() {
        out.push(Line::from(spans));
    }
}

/// Extended header lines git emits between `diff --git` and the first hunk.
fn is_meta(line: &str) -> bool {
    const PREFIXES: [&str; 9] = [
        "index ",
        "new file mode",
        "deleted file mode",
        "similarity index",
        "rename from",
        "rename to",
        "old mode",
        "new mode",
        "Binary files",
    ];
    PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Picks the syntax for the `b/` side of a `diff --git a/x b/y` header.
fn syntax_for(header_paths: &str) -> &'static SyntaxReference {
    let path = header_paths.rsplit(" b/").next().unwrap_or(header_paths);
    PS.find_syntax_by_extension(file_ext(path)).unwrap_or_else(|| PS.find_syntax_plain_text())
}

/// Extracts the file extension from a repository-relative path.
///
/// Returns "txt" if the path has no extension.
fn file_ext(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => "txt",
    }
}

/// Converts a syntect (Style, &str) pair to an owned ratatui Span.
fn syntect_to_span(style: syntect::highlighting::Style, content: &str) -> Span<'static> {
    use syntect::highlighting::Color as SC;
    use syntect::highlighting::FontStyle;
    let to_color = |c: SC| -> Option<Color> {
        if c.a > 0 { Some(Color::Rgb(c.r, c.g, c.b)) } else { None }
    };
    let mut ratatui_style = Style::default();
    if let Some(fg) = to_color(style.foreground) {
        ratatui_style = ratatui_style.fg(fg);
    }
    if style.font_style.contains(FontStyle::BOLD) {
        ratatui_style = ratatui_style.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        ratatui_style = ratatui_style.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        ratatui_style = ratatui_style.add_modifier(Modifier::UNDERLINED);
    }
    Span::styled(content.to_owned(), ratatui_style)
}

/// Highlights one line of code; falls back to a single raw span on error.
fn build_syntect_spans(code: &str, h: &mut HighlightLines) -> Vec<Span<'static>> {
    let ranges = h.highlight_line(code, &PS).unwrap_or_default();
    let spans: Vec<Span<'static>> =
        ranges.into_iter().map(|(style, text)| syntect_to_span(style, text)).collect();
    if spans.is_empty() {
        vec![Span::raw(code.to_owned())]
    } else {
        spans
    }
}

/// Computes word-level diff spans for a removed/added line pair.
///
/// Returns the old line's spans and the new line's spans. Changed words are
/// bold; unchanged words are dimmed.
fn word_diff_spans(old_line: &str, new_line: &str) -> (Vec<Span<'static>>, Vec<Span<'static>>) {
    let diff = TextDiff::from_words(old_line, new_line);
    let mut old_spans: Vec<Span<'static>> = Vec::new();
    let mut new_spans: Vec<Span<'static>> = Vec::new();

    for op in diff.ops() {
        for change in diff.iter_inline_changes(op) {
            for (emphasized, value) in change.iter_strings_lossy() {
                let text = value.into_owned();
                match change.tag() {
                    ChangeTag::Delete => {
                        let mut style = Style::default().fg(Color::Red);
                        if emphasized {
                            style = style.add_modifier(Modifier::BOLD);
                        }
                        old_spans.push(Span::styled(text, style));
                    }
                    ChangeTag::Insert => {
                        let mut style = Style::default().fg(Color::Green);
                        if emphasized {
                            style = style.add_modifier(Modifier::BOLD);
                        }
                        new_spans.push(Span::styled(text, style));
                    }
                    ChangeTag::Equal => {
                        let span = Span::styled(text, Style::default().fg(Color::DarkGray));
                        old_spans.push(span.clone());
                        new_spans.push(span);
                    }
                }
            }
        }
    }
    (old_spans, new_spans)
}

fn plain_line(line: &str) -> Line<'static> {
    Line::from(Span::raw(line.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn long_diffs_are_cut_with_a_marker() {
        let diff: String = (0..25).map(|i| format!(" line {i}\n")).collect();
        let lines = highlight_diff(&diff, 20);
        assert_eq!(lines.len(), 21);
        assert_eq!(text(&lines[20]), "... (5 more lines) ...");
    }

    #[test]
    fn short_diffs_have_no_marker() {
        let lines = highlight_diff("@@ -1 +1 @@\n-a\n+b\n", 20);
        assert_eq!(lines.len(), 3);
        assert!(!text(lines.last().unwrap()).contains("more lines"));
    }

    #[test]
    fn removed_added_pair_keeps_both_lines() {
        let lines = highlight_diff("diff --git a/x.rs b/x.rs\n@@ -1 +1 @@\n-let a = 1;\n+let a = 2;\n", 20);
        assert_eq!(text(&lines[2]), "- let a = 1;");
        assert_eq!(text(&lines[3]), "+ let a = 2;");
    }

    #[test]
    fn file_ext_handles_dotfiles_and_dirs() {
        assert_eq!(file_ext("src/main.rs"), "rs");
        assert_eq!(file_ext("a.b/Makefile"), "txt");
        assert_eq!(file_ext(".gitignore"), "txt");
    }
}
