//! Color theme system for cherrypick.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every surface
//! the picker renders. Two built-in themes are provided:
//!
//! - `dark` uses ANSI 16 colors so it works on any terminal, including
//!   256-color SSH sessions with no truecolor support.
//! - `catppuccin_mocha` is the Catppuccin Mocha palette in RGB; it needs a
//!   truecolor terminal.
//!
//! Diff syntax colors come from syntect and are not themed here.

use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    /// Border of the panel or overlay that receives keys.
    pub border_active: Color,
    pub border_inactive: Color,
    pub title: Color,

    // Commit list
    /// Background of the cursor row.
    pub cursor_bg: Color,
    /// Checkbox color while the cursor blink is in its "on" phase.
    pub cursor_blink: Color,
    pub selected: Color,
    pub applied: Color,
    /// Marker column for rows inside an open range.
    pub range: Color,
    pub merge: Color,
    pub detail: Color,
    pub stat_added: Color,
    pub stat_removed: Color,

    // Conflict overlay
    pub conflict_markers: Color,
    pub conflict_resolved: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    /// Mode badge while browsing.
    pub status_mode_normal: Color,
    /// Mode badge while a search or switch filter is being typed.
    pub status_mode_search: Color,
    /// Mode badge while a conflict session is open.
    pub status_mode_conflict: Color,

    pub warning: Color,
    pub error: Color,
    pub background: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    ///
    /// The default when no config is present or the configured name is unknown.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,
            title: Color::White,

            cursor_bg: Color::DarkGray,
            cursor_blink: Color::White,
            selected: Color::Green,
            applied: Color::DarkGray,
            range: Color::Magenta,
            merge: Color::Blue,
            detail: Color::Gray,
            stat_added: Color::Green,
            stat_removed: Color::Red,

            conflict_markers: Color::Red,
            conflict_resolved: Color::Green,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_search: Color::Yellow,
            status_mode_conflict: Color::Red,

            warning: Color::Yellow,
            error: Color::Red,
            background: Color::Reset,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// On terminals without truecolor the colors degrade to the nearest
    /// 256-color approximation. Use `dark()` on SSH or 256-color terminals.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let blue = Color::Rgb(137, 180, 250); // #89b4fa
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay0 = Color::Rgb(108, 112, 134); // #6c7086
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface0 = Color::Rgb(49, 50, 68); // #313244
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let subtext0 = Color::Rgb(166, 173, 200); // #a6adc8
        let base = Color::Rgb(30, 30, 46); // #1e1e2e
        let text = Color::Rgb(205, 214, 244); // #cdd6f4
        let peach = Color::Rgb(250, 179, 135); // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,
            title: text,

            cursor_bg: surface0,
            cursor_blink: lavender,
            selected: green,
            applied: overlay0,
            range: mauve,
            merge: blue,
            detail: subtext0,
            stat_added: green,
            stat_removed: red,

            conflict_markers: red,
            conflict_resolved: green,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_search: yellow,
            status_mode_conflict: peach,

            warning: yellow,
            error: red,
            background: base,
        }
    }

    /// Resolves a theme name from config to a built-in theme.
    ///
    /// Unknown names fall back to `dark()` with a logged warning, so a typo in
    /// the config file never prevents startup.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }
}
