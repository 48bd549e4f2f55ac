use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use headlines_core::auth::BootstrapOutcome;
use headlines_core::navigation::Destination;

use crate::app::{App, AppState};

use super::styles;
use super::tabs::{articles, bookmarks, breaking, search};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::Reading => render_article_overlay(frame, app),
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingQuit => render_confirm_overlay(frame, "Are you sure you want to quit?", "quit"),
        AppState::ConfirmingDeleteBookmarks => {
            render_confirm_overlay(frame, "Delete all bookmarks?", "delete")
        }
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("  Headlines - {}", app.shell.title());
    let key_hint = match app.bootstrap_outcome {
        Some(BootstrapOutcome::Warmed) => "",
        Some(_) => "[no API key] ",
        None => "[loading key] ",
    };
    let help_hint = format!("{}[?] Help", key_hint);

    let title_line = Line::from(vec![
        Span::styled(title.clone(), styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.chars().count() + help_hint.chars().count() + 4),
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, destination) in Destination::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, destination.title());
        spans.push(Span::styled(label, styles::tab_style(app.current_page() == *destination)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_page() {
        Destination::BreakingNews => breaking::render(frame, app, area),
        Destination::Search => search::render(frame, app, area),
        Destination::Bookmarks => bookmarks::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.current_page() {
        Destination::BreakingNews => "[u]pdate | [b]ookmark | [q]uit",
        Destination::Search => "[/] search | [b]ookmark | [q]uit",
        Destination::Bookmarks => "[b] remove | [D]elete all | [q]uit",
    };

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        format!(" Updated {} ", app.cache_ages.last_updated())
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_article_overlay(frame: &mut Frame, app: &App) {
    let Some(ref article) = app.reading else {
        return;
    };

    let frame_area = frame.area();
    let area = centered_rect_fixed(
        frame_area.width.saturating_sub(8).min(90),
        frame_area.height.saturating_sub(4).min(30),
        frame_area,
    );
    frame.render_widget(Clear, area);

    let mut lines = articles::article_lines(article, (area.width as usize).saturating_sub(4));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" [b]", styles::help_key_style()),
        Span::styled(" bookmark  ", styles::muted_style()),
        Span::styled("[Esc]", styles::help_key_style()),
        Span::styled(" close", styles::muted_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(key, styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 24, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  Headlines", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("  1-3       ", "Switch page (again: scroll to top)"),
        help_line("  ←/→       ", "Previous/next page"),
        help_line("  ↑/↓ j/k   ", "Navigate list"),
        help_line("  PgUp/PgDn ", "Scroll by page"),
        help_line("  Enter     ", "Read article"),
        help_line("  Esc       ", "Back to breaking news, then exit"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("  /         ", "Search all articles"),
        help_line("  b         ", "Toggle bookmark"),
        help_line("  u         ", "Update breaking news"),
        help_line("  r         ", "Retry a failed load"),
        help_line("  D         ", "Delete all bookmarks"),
        help_line("  q         ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_confirm_overlay(frame: &mut Frame, question: &str, action: &str) {
    let area = centered_rect_fixed(46, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("   {}", question), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(format!(" to {}, ", action), styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
