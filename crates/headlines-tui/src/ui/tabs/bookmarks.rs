use ratatui::{layout::Rect, Frame};

use headlines_core::paging::LoadState;

use crate::app::App;
use crate::ui::tabs::articles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let page = &app.shell.pages().bookmarks;
    let placeholder = articles::placeholder(&LoadState::Idle, "No bookmarks - press [b] on an article");
    articles::render_split(frame, &page.list, "Bookmarks", placeholder, area);
}
