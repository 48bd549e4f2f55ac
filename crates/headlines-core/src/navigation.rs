//! Three-page navigation shell.
//!
//! The shell owns the breaking news, search and bookmarks pages for the
//! life of the program. Switching pages attaches the chosen page and
//! detaches the others; detached pages keep their state. Only the selected
//! index survives a restart, stored in the UI state file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// UI state file name in the cache directory
const UI_STATE_FILE: &str = "ui_state.json";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Unexpected page index: {0}")]
    UnknownIndex(usize),

    #[error("Unexpected navigation item: {0}")]
    UnknownItem(String),
}

/// The three pages, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    BreakingNews,
    Search,
    Bookmarks,
}

impl Destination {
    pub const ALL: [Destination; 3] = [
        Destination::BreakingNews,
        Destination::Search,
        Destination::Bookmarks,
    ];

    pub const HOME: Destination = Destination::BreakingNews;

    pub fn index(self) -> usize {
        match self {
            Destination::BreakingNews => 0,
            Destination::Search => 1,
            Destination::Bookmarks => 2,
        }
    }

    pub fn from_index(index: usize) -> Result<Self, NavigationError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(NavigationError::UnknownIndex(index))
    }

    /// Resolve a navigation item id (as bound to keys or menu entries).
    pub fn from_item_id(id: &str) -> Result<Self, NavigationError> {
        match id {
            "nav_breaking" => Ok(Destination::BreakingNews),
            "nav_search" => Ok(Destination::Search),
            "nav_bookmarks" => Ok(Destination::Bookmarks),
            other => Err(NavigationError::UnknownItem(other.to_string())),
        }
    }

    /// Stable identity the page is registered under.
    pub fn tag(self) -> &'static str {
        match self {
            Destination::BreakingNews => "tag_breaking_news_fragment",
            Destination::Search => "tag_search_news_fragment",
            Destination::Bookmarks => "tag_bookmarks_news_fragment",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Destination::BreakingNews => "Breaking News",
            Destination::Search => "Search News",
            Destination::Bookmarks => "Bookmarks",
        }
    }
}

/// Capability of pages that react to their tab being chosen again.
pub trait ReselectListener {
    fn on_reselected(&mut self);
}

/// A page hosted by the shell.
pub trait Page {
    fn on_attach(&mut self) {}

    fn on_detach(&mut self) {}

    /// The page's reselect capability, if it has one.
    fn reselect_listener(&mut self) -> Option<&mut dyn ReselectListener> {
        None
    }
}

/// The set of pages, looked up by their tags.
pub trait PageSet {
    fn find_by_tag(&mut self, tag: &str) -> Option<&mut dyn Page>;
}

/// Result of a back action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackAction {
    /// Went back to the home page.
    Navigated(Destination),
    /// Already home; the caller should exit.
    Exit,
}

/// Persisted shell state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShellState {
    #[serde(rename = "key_selected_index")]
    pub selected_index: usize,
}

impl ShellState {
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(UI_STATE_FILE)
    }

    /// Load saved state; a missing file means no saved state.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = Self::path(dir);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read UI state file")?;
        let state = serde_json::from_str(&contents).context("Failed to parse UI state file")?;
        Ok(Some(state))
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(Self::path(dir), contents).context("Failed to write UI state file")?;
        Ok(())
    }
}

/// Switches between the pages of a [`PageSet`].
pub struct NavigationShell<P: PageSet> {
    pages: P,
    selected: Destination,
    attached: [bool; 3],
}

impl<P: PageSet> NavigationShell<P> {
    /// Fresh shell showing the home page.
    pub fn new(pages: P) -> Self {
        let mut shell = Self {
            pages,
            selected: Destination::HOME,
            attached: [false; 3],
        };
        shell.show(Destination::HOME);
        shell
    }

    /// Rebuild a shell around existing pages. Saved state with an index
    /// outside the page set falls back to home.
    pub fn restore(pages: P, state: Option<ShellState>) -> Self {
        let selected = match state.map(|s| Destination::from_index(s.selected_index)) {
            Some(Ok(destination)) => destination,
            Some(Err(e)) => {
                warn!(error = %e, "Ignoring saved navigation state");
                Destination::HOME
            }
            None => Destination::HOME,
        };
        let mut shell = Self {
            pages,
            selected,
            attached: [false; 3],
        };
        shell.reattach(selected);
        shell
    }

    pub fn selected(&self) -> Destination {
        self.selected
    }

    pub fn selected_index(&self) -> usize {
        self.selected.index()
    }

    pub fn is_attached(&self, destination: Destination) -> bool {
        self.attached[destination.index()]
    }

    pub fn title(&self) -> &'static str {
        self.selected.title()
    }

    pub fn pages(&self) -> &P {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut P {
        &mut self.pages
    }

    pub fn into_pages(self) -> P {
        self.pages
    }

    pub fn save_state(&self) -> ShellState {
        ShellState {
            selected_index: self.selected.index(),
        }
    }

    /// Handle a tab selection. Choosing the current page again notifies it
    /// if it listens for reselection; otherwise the chosen page is shown.
    pub fn select(&mut self, destination: Destination) {
        if destination == self.selected && self.is_attached(destination) {
            debug!(page = destination.tag(), "Page reselected");
            if let Some(page) = self.pages.find_by_tag(destination.tag()) {
                if let Some(listener) = page.reselect_listener() {
                    listener.on_reselected();
                }
            }
        } else {
            self.show(destination);
        }
    }

    pub fn select_index(&mut self, index: usize) -> Result<(), NavigationError> {
        self.select(Destination::from_index(index)?);
        Ok(())
    }

    pub fn select_item(&mut self, id: &str) -> Result<(), NavigationError> {
        self.select(Destination::from_item_id(id)?);
        Ok(())
    }

    /// Back goes home first, and exits only from home.
    pub fn on_back(&mut self) -> BackAction {
        if self.selected != Destination::HOME {
            self.select(Destination::HOME);
            BackAction::Navigated(Destination::HOME)
        } else {
            BackAction::Exit
        }
    }

    /// Bring pages of unknown state in line with `destination`: every other
    /// page is detached, whatever the shell recorded for it.
    fn reattach(&mut self, destination: Destination) {
        for candidate in Destination::ALL {
            let Some(page) = self.pages.find_by_tag(candidate.tag()) else {
                warn!(page = candidate.tag(), "Page not registered");
                continue;
            };
            let selected = candidate == destination;
            if selected {
                page.on_attach();
            } else {
                page.on_detach();
            }
            self.attached[candidate.index()] = selected;
        }
        self.selected = destination;
    }

    fn show(&mut self, destination: Destination) {
        for candidate in Destination::ALL {
            let index = candidate.index();
            let Some(page) = self.pages.find_by_tag(candidate.tag()) else {
                warn!(page = candidate.tag(), "Page not registered");
                continue;
            };
            if candidate == destination {
                if !self.attached[index] {
                    page.on_attach();
                    self.attached[index] = true;
                }
            } else if self.attached[index] {
                page.on_detach();
                self.attached[index] = false;
            }
        }
        self.selected = destination;
    }
}
