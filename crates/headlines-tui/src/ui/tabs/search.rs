use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use headlines_core::paging::LoadState;

use crate::app::{App, AppState};
use crate::ui::styles;
use crate::ui::tabs::articles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    render_search_box(frame, app, chunks[0]);

    let page = &app.shell.pages().search;
    let state = page.load_state();
    let placeholder = match page.query() {
        None => articles::placeholder(&state, "Press [/] to search all articles"),
        Some(_) => articles::placeholder(&state, "No results"),
    };

    let title = match (page.query(), page.pager.as_ref().and_then(|p| p.total_results())) {
        (Some(query), Some(total)) => format!("\"{}\" - {} total", query, total),
        (Some(query), None) => format!("\"{}\"", query),
        (None, _) => "Search".to_string(),
    };
    let title = match state {
        LoadState::Loading if !page.list.is_empty() => format!("{} - loading more", title),
        _ => title,
    };

    articles::render_split(frame, &page.list, &title, placeholder, chunks[1]);
}

fn render_search_box(frame: &mut Frame, app: &App, area: Rect) {
    let page = &app.shell.pages().search;
    let editing = app.state == AppState::Searching;

    let line = if editing {
        Line::from(vec![
            Span::styled(" / ", styles::search_style()),
            Span::raw(page.input.clone()),
            Span::styled("▌", styles::search_style()),
        ])
    } else {
        match page.query() {
            Some(query) => Line::from(vec![
                Span::styled(" / ", styles::muted_style()),
                Span::raw(query.to_string()),
            ]),
            None => Line::from(Span::styled(" / to search", styles::muted_style())),
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(editing));

    frame.render_widget(Paragraph::new(line).block(block), area);
}
