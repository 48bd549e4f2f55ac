//! Article list and preview shared by all three pages.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use headlines_core::models::NewsArticle;
use headlines_core::paging::{ArticleList, LoadState};
use headlines_core::utils::truncate_string;

use crate::ui::styles;

const BOOKMARK_MARKER: &str = "★";

/// List on the left, preview of the selected article on the right.
pub fn render_split(
    frame: &mut Frame,
    list: &ArticleList,
    title: &str,
    placeholder: Line<'_>,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_list(frame, list, title, placeholder, chunks[0]);
    render_preview(frame, list.selected_item(), chunks[1]);
}

fn render_list(frame: &mut Frame, list: &ArticleList, title: &str, placeholder: Line<'_>, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ({}) ", title, list.len()))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if list.is_empty() {
        let paragraph = Paragraph::new(vec![Line::from(""), placeholder]).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new([Cell::from(""), Cell::from("Title"), Cell::from("Source"), Cell::from("Date")])
        .style(styles::title_style())
        .height(1);

    // Borders, marker, source and date columns
    let title_width = (area.width as usize).saturating_sub(2 + 2 + 18 + 14 + 3);

    let rows: Vec<Row> = list
        .items()
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let style = if i == list.selected() {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let marker = if article.is_bookmarked {
                Cell::from(Span::styled(BOOKMARK_MARKER, styles::bookmark_style()))
            } else {
                Cell::from(" ")
            };

            Row::new(vec![
                marker,
                Cell::from(truncate_string(&article.title, title_width)),
                Cell::from(truncate_string(article.source_display(), 18)),
                Cell::from(article.formatted_date()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(18),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(list.selected()));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_preview(frame: &mut Frame, article: Option<&NewsArticle>, area: Rect) {
    let content = match article {
        Some(article) => article_lines(article, (area.width as usize).saturating_sub(4)),
        None => vec![Line::from(Span::styled(
            "Select an article from the list",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(content).block(block), area);
}

/// Title, metadata, description and link of an article, wrapped to `width`.
pub fn article_lines(article: &NewsArticle, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for line in wrap_text(&article.title, width) {
        lines.push(Line::from(Span::styled(line, styles::title_style())));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(vec![
        Span::styled("Source:  ", styles::muted_style()),
        Span::raw(article.source_display().to_string()),
    ]));
    if let Some(ref author) = article.author {
        lines.push(Line::from(vec![
            Span::styled("Author:  ", styles::muted_style()),
            Span::raw(author.clone()),
        ]));
    }
    let date = article.formatted_date();
    if !date.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Date:    ", styles::muted_style()),
            Span::raw(date),
        ]));
    }
    if article.is_bookmarked {
        lines.push(Line::from(Span::styled(
            format!("{} Bookmarked", BOOKMARK_MARKER),
            styles::bookmark_style(),
        )));
    }
    lines.push(Line::from(""));

    if let Some(ref description) = article.description {
        for line in wrap_text(description, width) {
            lines.push(Line::from(line));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(article.url.clone(), styles::highlight_style())));
    lines
}

/// Placeholder for an empty list, reflecting the load state.
pub fn placeholder(state: &LoadState, empty_message: &str) -> Line<'static> {
    match state {
        LoadState::Loading => Line::from(Span::styled("  Loading...", styles::muted_style())),
        LoadState::Error(message) => Line::from(vec![
            Span::styled(format!("  {} ", message), styles::error_style()),
            Span::styled("[r] retry", styles::help_key_style()),
        ]),
        LoadState::Idle | LoadState::EndReached => {
            Line::from(Span::styled(format!("  {}", empty_message), styles::muted_style()))
        }
    }
}

fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in s.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.chars().count() + 1 + word.chars().count() <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}
