//! Newsprint palette: dark ink background, paper-white body text, a red
//! masthead and amber for keys and links.

use ratatui::style::{Color, Modifier, Style};

pub const MASTHEAD: Color = Color::Rgb(200, 56, 48);
pub const PAPER: Color = Color::Rgb(236, 232, 222);
pub const INK: Color = Color::Rgb(24, 24, 28);
pub const AMBER: Color = Color::Rgb(224, 168, 56);
pub const SAVED: Color = Color::Rgb(88, 168, 120);
pub const FADED: Color = Color::Rgb(132, 128, 120);
pub const CURSOR: Color = Color::Rgb(56, 44, 48);

pub fn title_style() -> Style {
    Style::default().fg(MASTHEAD).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(CURSOR).fg(PAPER).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(PAPER)
}

pub fn muted_style() -> Style {
    Style::default().fg(FADED)
}

/// Section headings and links
pub fn highlight_style() -> Style {
    Style::default().fg(AMBER)
}

pub fn bookmark_style() -> Style {
    Style::default().fg(SAVED).add_modifier(Modifier::BOLD)
}

pub fn error_style() -> Style {
    Style::default().fg(MASTHEAD).add_modifier(Modifier::ITALIC)
}

pub fn tab_style(selected: bool) -> Style {
    match selected {
        true => Style::default()
            .fg(PAPER)
            .bg(MASTHEAD)
            .add_modifier(Modifier::BOLD),
        false => muted_style(),
    }
}

pub fn border_style(focused: bool) -> Style {
    Style::default().fg(if focused { MASTHEAD } else { FADED })
}

/// Query text while typing
pub fn search_style() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(INK).fg(PAPER)
}

pub fn help_key_style() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    list_item_style()
}
