//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use headlines_core::navigation::Destination;

use crate::app::{App, AppState, PAGE_SCROLL_SIZE};

/// Navigation item ids bound to the number keys.
const NAV_ITEMS: [&str; 3] = ["nav_breaking", "nav_search", "nav_bookmarks"];

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingDeleteBookmarks => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Normal;
                    app.delete_all_bookmarks();
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Reading => {
            handle_reading_input(app, key);
            return Ok(false);
        }
        AppState::Searching => {
            handle_search_input(app, key);
            return Ok(false);
        }
        AppState::Quitting => return Ok(true),
        AppState::Normal => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char(c @ '1'..='3') => {
            let index = (c as usize) - ('1' as usize);
            app.select_item(NAV_ITEMS[index])?;
        }
        KeyCode::Left => {
            let index = app.current_page().index();
            let prev = (index + Destination::ALL.len() - 1) % Destination::ALL.len();
            app.select(Destination::ALL[prev]);
        }
        KeyCode::Right => {
            let index = app.current_page().index();
            let next = (index + 1) % Destination::ALL.len();
            app.select(Destination::ALL[next]);
        }
        KeyCode::Esc | KeyCode::Backspace => {
            return Ok(app.back());
        }
        KeyCode::Char('/') => {
            if app.current_page() != Destination::Search {
                app.select(Destination::Search);
            }
            app.start_search_input();
        }
        KeyCode::Char('u') => {
            app.refresh_breaking_news();
        }
        KeyCode::Char('r') => {
            app.retry();
        }
        KeyCode::Char('D') => {
            if app.current_page() == Destination::Bookmarks
                && !app.shell.pages().bookmarks.list.is_empty()
            {
                app.state = AppState::ConfirmingDeleteBookmarks;
            }
        }
        KeyCode::Enter => {
            let position = current_list(app).selected();
            app.open_article(position);
        }
        KeyCode::Char('b') => {
            let position = current_list(app).selected();
            app.toggle_bookmark(position);
        }
        KeyCode::Up | KeyCode::Char('k') => move_selection(app, |list| list.select_prev(1)),
        KeyCode::Down | KeyCode::Char('j') => move_selection(app, |list| list.select_next(1)),
        KeyCode::PageUp => move_selection(app, |list| list.select_prev(PAGE_SCROLL_SIZE)),
        KeyCode::PageDown => move_selection(app, |list| list.select_next(PAGE_SCROLL_SIZE)),
        KeyCode::Home | KeyCode::Char('g') => move_selection(app, |list| list.scroll_to_top()),
        KeyCode::End | KeyCode::Char('G') => move_selection(app, |list| list.select(usize::MAX)),
        _ => {}
    }

    Ok(false)
}

fn current_list(app: &App) -> &headlines_core::paging::ArticleList {
    app.shell.pages().list(app.current_page())
}

fn move_selection(app: &mut App, f: impl FnOnce(&mut headlines_core::paging::ArticleList)) {
    let page = app.current_page();
    f(app.shell.pages_mut().list_mut(page));
    if page == Destination::Search {
        app.maybe_load_more();
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.submit_search();
        }
        KeyCode::Backspace => {
            app.pop_query_char();
        }
        KeyCode::Char(c) => {
            app.push_query_char(c);
        }
        _ => {}
    }
}

fn handle_reading_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Backspace => {
            app.reading = None;
            app.state = AppState::Normal;
        }
        KeyCode::Char('b') => {
            let url = app.reading.as_ref().map(|a| a.url.clone());
            let list = current_list(app);
            let position = url.and_then(|url| list.items().iter().position(|a| a.url == url));
            if let Some(position) = position {
                app.toggle_bookmark(position);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;
    use headlines_core::auth::{MemoryAccountStore, RequestAuthenticator, SessionCache};
    use headlines_core::Config;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(dir: &tempfile::TempDir) -> App {
        App::new(
            Config::default(),
            Arc::new(MemoryAccountStore::default()),
            Arc::new(SessionCache::new(RequestAuthenticator::new())),
            dir.path().to_path_buf(),
        )
        .expect("app builds")
    }

    #[tokio::test]
    async fn test_number_keys_switch_pages() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app(&dir);

        assert!(!handle_input(&mut app, key(KeyCode::Char('3'))).expect("input"));
        assert_eq!(app.current_page(), Destination::Bookmarks);
        handle_input(&mut app, key(KeyCode::Char('2'))).expect("input");
        assert_eq!(app.current_page(), Destination::Search);
        handle_input(&mut app, key(KeyCode::Right)).expect("input");
        assert_eq!(app.current_page(), Destination::Bookmarks);
        handle_input(&mut app, key(KeyCode::Right)).expect("input");
        assert_eq!(app.current_page(), Destination::BreakingNews);
        handle_input(&mut app, key(KeyCode::Left)).expect("input");
        assert_eq!(app.current_page(), Destination::Bookmarks);
    }

    #[tokio::test]
    async fn test_escape_goes_home_then_exits() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app(&dir);

        handle_input(&mut app, key(KeyCode::Char('2'))).expect("input");
        assert!(!handle_input(&mut app, key(KeyCode::Esc)).expect("input"));
        assert_eq!(app.current_page(), Destination::BreakingNews);
        assert!(handle_input(&mut app, key(KeyCode::Esc)).expect("input"));
    }

    #[tokio::test]
    async fn test_quit_confirmation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app(&dir);

        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))).expect("input"));
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!handle_input(&mut app, key(KeyCode::Char('n'))).expect("input"));
        assert_eq!(app.state, AppState::Normal);
        handle_input(&mut app, key(KeyCode::Char('q'))).expect("input");
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))).expect("input"));
    }

    #[tokio::test]
    async fn test_search_typing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app(&dir);

        handle_input(&mut app, key(KeyCode::Char('/'))).expect("input");
        assert_eq!(app.state, AppState::Searching);
        assert_eq!(app.current_page(), Destination::Search);

        for c in "rusq".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).expect("input");
        }
        handle_input(&mut app, key(KeyCode::Backspace)).expect("input");
        handle_input(&mut app, key(KeyCode::Char('t'))).expect("input");
        assert_eq!(app.shell.pages().search.input, "rust");

        // 'q' is text while typing, not quit
        assert_eq!(app.state, AppState::Searching);
        handle_input(&mut app, key(KeyCode::Esc)).expect("input");
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_delete_bookmarks_needs_bookmarks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = app(&dir);

        handle_input(&mut app, key(KeyCode::Char('3'))).expect("input");
        handle_input(&mut app, key(KeyCode::Char('D'))).expect("input");
        assert_eq!(app.state, AppState::Normal);
    }
}
