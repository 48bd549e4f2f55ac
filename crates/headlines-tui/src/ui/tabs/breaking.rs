use ratatui::{layout::Rect, Frame};

use crate::app::App;
use crate::ui::tabs::articles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let page = &app.shell.pages().breaking;
    let title = format!("Top headlines - {}", app.config.country.to_uppercase());
    let placeholder = articles::placeholder(&page.load_state, "No headlines yet - [u] to refresh");
    articles::render_split(frame, &page.list, &title, placeholder, area);
}
