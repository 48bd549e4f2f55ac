//! Application state management for Headlines.
//!
//! This module contains the `App` struct that owns the navigation shell and
//! its pages, the session, the API client and the cache, and coordinates the
//! background tasks that load articles.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use headlines_core::api::NewsClient;
use headlines_core::auth::{AccountStore, BootstrapOutcome, BootstrapSequencer, SessionCache};
use headlines_core::cache::{CacheAges, CacheManager, PURGE_AFTER_DAYS};
use headlines_core::models::{NewsArticle, NewsResponse};
use headlines_core::navigation::{BackAction, Destination, NavigationError, NavigationShell, ShellState};
use headlines_core::paging::{LoadState, PageRequest, SearchPager};
use headlines_core::Config;

use crate::pages::NewsPages;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for the search query input.
const MAX_QUERY_LENGTH: usize = 100;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Start loading the next search page when the cursor is this close to the end.
const PREFETCH_DISTANCE: usize = 3;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    /// Typing a search query
    Searching,
    /// Article detail overlay
    Reading,
    ShowingHelp,
    ConfirmingQuit,
    ConfirmingDeleteBookmarks,
    Quitting,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from background tasks back to the event loop.
enum RefreshResult {
    BreakingNews(Vec<NewsArticle>),
    BreakingNewsFailed(String),
    SearchPage {
        query: String,
        page: u32,
        articles: Vec<NewsArticle>,
        /// Items on the page as sent, before removed entries were dropped
        received: u32,
        total_results: u32,
    },
    SearchFailed {
        query: String,
        message: String,
    },
    Bootstrap(BootstrapOutcome),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: Arc<SessionCache>,
    pub store: Arc<dyn AccountStore>,
    pub api: NewsClient,
    pub cache: CacheManager,
    ui_state_dir: PathBuf,

    // UI State
    pub state: AppState,
    pub shell: NavigationShell<NewsPages>,
    pub reading: Option<NewsArticle>,
    pub status_message: Option<String>,
    pub cache_ages: CacheAges,
    pub bootstrap_outcome: Option<BootstrapOutcome>,

    // Background task channel
    refresh_rx: mpsc::Receiver<RefreshResult>,
    refresh_tx: mpsc::Sender<RefreshResult>,
}

impl App {
    /// Create the application and its shell. The shell starts on the page
    /// saved in the UI state file, if there is one.
    pub fn new(
        config: Config,
        store: Arc<dyn AccountStore>,
        session: Arc<SessionCache>,
        cache_dir: PathBuf,
    ) -> Result<Self> {
        let mut api = NewsClient::new(session.authenticator().clone())?
            .with_country(config.country.clone());
        if let Some(ref base_url) = config.api_base_url {
            api = api.with_base_url(base_url.clone());
        }

        let cache = CacheManager::new(cache_dir.clone())?;

        let saved_state = match ShellState::load(&cache_dir) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Failed to load UI state, starting on home page");
                None
            }
        };
        debug!(?saved_state, "UI state loaded");
        let shell = NavigationShell::restore(NewsPages::default(), saved_state);

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            config,
            session,
            store,
            api,
            cache,
            ui_state_dir: cache_dir,

            state: AppState::Normal,
            shell,
            reading: None,
            status_message: None,
            cache_ages: CacheAges::default(),
            bootstrap_outcome: None,

            refresh_rx: rx,
            refresh_tx: tx,
        })
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Start the session bootstrap without waiting for it. Requests issued
    /// before it completes are sent without a key.
    pub fn start_bootstrap(&self, seed_token: Option<String>) {
        let handle = BootstrapSequencer::new(
            Arc::clone(&self.store),
            Arc::clone(&self.session),
            seed_token,
        )
        .spawn();

        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            match handle.await {
                Ok(outcome) => Self::send_result(&tx, RefreshResult::Bootstrap(outcome)).await,
                Err(e) => error!(error = %e, "Bootstrap task panicked"),
            }
        });
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Load cached articles and bookmarks into the pages.
    pub fn load_from_cache(&mut self) {
        match self.cache.purge_older_than(PURGE_AFTER_DAYS) {
            Ok(0) => {}
            Ok(removed) => info!(removed, "Purged old articles from cache"),
            Err(e) => warn!(error = %e, "Failed to purge article cache"),
        }

        match self.cache.load_breaking_news() {
            Ok(Some(cached)) => {
                let mut articles = cached.data;
                self.mark_bookmarks(&mut articles);
                self.shell.pages_mut().breaking.list.submit(articles);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to load cached breaking news"),
        }

        self.reload_bookmarks();
        self.cache_ages = self.cache.get_cache_ages();
    }

    pub fn is_cache_stale(&self) -> bool {
        self.cache.breaking_news_stale()
    }

    fn mark_bookmarks(&self, articles: &mut [NewsArticle]) {
        if let Err(e) = self.cache.apply_bookmarks(articles) {
            warn!(error = %e, "Failed to read bookmarks");
        }
    }

    fn reload_bookmarks(&mut self) {
        match self.cache.load_bookmarks() {
            Ok(bookmarks) => self.shell.pages_mut().bookmarks.list.submit(bookmarks),
            Err(e) => warn!(error = %e, "Failed to load bookmarks"),
        }
        self.shell.pages_mut().bookmarks.needs_reload = false;
    }

    /// Persist the selected page for the next start.
    pub fn save_ui_state(&self) {
        if let Err(e) = self.shell.save_state().save(&self.ui_state_dir) {
            warn!(error = %e, "Failed to save UI state");
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn current_page(&self) -> Destination {
        self.shell.selected()
    }

    /// Select a page by navigation item id. Unknown ids are fatal.
    pub fn select_item(&mut self, id: &str) -> Result<(), NavigationError> {
        self.shell.select_item(id)?;
        self.after_navigation();
        Ok(())
    }

    pub fn select(&mut self, destination: Destination) {
        self.shell.select(destination);
        self.after_navigation();
    }

    /// Back goes home; returns true when the app should exit.
    pub fn back(&mut self) -> bool {
        match self.shell.on_back() {
            BackAction::Navigated(_) => {
                self.after_navigation();
                false
            }
            BackAction::Exit => {
                self.state = AppState::Quitting;
                true
            }
        }
    }

    fn after_navigation(&mut self) {
        if self.shell.pages().bookmarks.needs_reload {
            self.reload_bookmarks();
        }
        debug!(page = self.shell.title(), "Page shown");
    }

    // =========================================================================
    // Article actions
    // =========================================================================

    /// Open the article at `position` on the current page.
    pub fn open_article(&mut self, position: usize) {
        let page = self.current_page();
        if let Some(article) = self.shell.pages().list(page).on_item_click(position, Clone::clone) {
            self.reading = Some(article);
            self.state = AppState::Reading;
        }
    }

    /// Toggle the bookmark of the article at `position` on the current page.
    pub fn toggle_bookmark(&mut self, position: usize) {
        let page = self.current_page();
        let Some(article) = self.shell.pages().list(page).on_bookmark_click(position, Clone::clone) else {
            return;
        };

        match self.cache.toggle_bookmark(&article) {
            Ok(bookmarked) => {
                self.shell.pages_mut().set_bookmarked(&article, bookmarked);
                if let Some(ref mut reading) = self.reading {
                    if reading.same_item(&article) {
                        reading.is_bookmarked = bookmarked;
                    }
                }
                if page == Destination::Bookmarks || !bookmarked {
                    self.reload_bookmarks();
                }
                self.status_message = Some(if bookmarked {
                    "Bookmark added".to_string()
                } else {
                    "Bookmark removed".to_string()
                });
            }
            Err(e) => {
                warn!(error = %e, "Failed to toggle bookmark");
                self.status_message = Some(format!("Could not save bookmark: {}", e));
            }
        }
        if page != Destination::Bookmarks {
            self.shell.pages_mut().bookmarks.needs_reload = true;
        }
    }

    pub fn delete_all_bookmarks(&mut self) {
        if let Err(e) = self.cache.delete_all_bookmarks() {
            warn!(error = %e, "Failed to delete bookmarks");
            self.status_message = Some(format!("Could not delete bookmarks: {}", e));
            return;
        }
        let removed: Vec<NewsArticle> = self.shell.pages().bookmarks.list.items().to_vec();
        for article in &removed {
            self.shell.pages_mut().set_bookmarked(article, false);
        }
        self.reload_bookmarks();
        self.status_message = Some("All bookmarks deleted".to_string());
    }

    // =========================================================================
    // Search input
    // =========================================================================

    pub fn start_search_input(&mut self) {
        self.state = AppState::Searching;
        let current = self.shell.pages().search.query().unwrap_or_default().to_string();
        self.shell.pages_mut().search.input = current;
    }

    pub fn push_query_char(&mut self, c: char) {
        let input = &mut self.shell.pages_mut().search.input;
        if can_add_query_char(input.chars().count(), c) {
            input.push(c);
        }
    }

    pub fn pop_query_char(&mut self) {
        self.shell.pages_mut().search.input.pop();
    }

    /// Start a new search for the typed query, showing cached results
    /// for it until the first page arrives.
    pub fn submit_search(&mut self) {
        self.state = AppState::Normal;
        let query = self.shell.pages().search.input.trim().to_string();
        if query.is_empty() {
            return;
        }

        let mut pager = SearchPager::new(query.clone(), self.config.search_page_size());
        let request = pager.next_request();
        {
            let search = &mut self.shell.pages_mut().search;
            search.pager = Some(pager);
            search.list.submit(Vec::new());
        }

        if let Ok(Some(cached)) = self.cache.load_search_results(&query) {
            let mut articles = cached.data;
            self.mark_bookmarks(&mut articles);
            self.shell.pages_mut().search.list.submit(articles);
        }

        if let Some(request) = request {
            self.spawn_search(request);
        }
        info!(query = %query, "Search started");
    }

    /// Load the next search page if the cursor is near the end.
    pub fn maybe_load_more(&mut self) {
        let search = &mut self.shell.pages_mut().search;
        if !search.list.near_end(PREFETCH_DISTANCE) {
            return;
        }
        let request = search.pager.as_mut().and_then(|p| p.next_request());
        if let Some(request) = request {
            self.spawn_search(request);
        }
    }

    /// Retry a failed load on the current page.
    pub fn retry(&mut self) {
        match self.current_page() {
            Destination::BreakingNews => self.refresh_breaking_news(),
            Destination::Search => {
                let request = self
                    .shell
                    .pages_mut()
                    .search
                    .pager
                    .as_mut()
                    .and_then(|p| p.retry());
                if let Some(request) = request {
                    self.spawn_search(request);
                }
            }
            Destination::Bookmarks => self.reload_bookmarks(),
        }
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Spawn a background fetch of breaking news.
    pub fn refresh_breaking_news(&mut self) {
        if self.shell.pages().breaking.load_state == LoadState::Loading {
            return;
        }
        self.shell.pages_mut().breaking.load_state = LoadState::Loading;
        self.status_message = Some("Refreshing breaking news...".to_string());

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            let result = match api.get_breaking_news().await {
                Ok(response) => RefreshResult::BreakingNews(response.into_articles()),
                Err(e) => {
                    error!(error = %e, "Breaking news refresh failed");
                    RefreshResult::BreakingNewsFailed(e.to_string())
                }
            };
            Self::send_result(&tx, result).await;
        });
    }

    fn spawn_search(&mut self, request: PageRequest) {
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        self.status_message = Some(format!("Searching \"{}\"...", request.query));

        tokio::spawn(async move {
            let result = match api
                .search_news(&request.query, request.page, request.page_size)
                .await
            {
                Ok(response) => Self::search_page_result(request, response),
                Err(e) => {
                    error!(error = %e, query = %request.query, "Search failed");
                    RefreshResult::SearchFailed {
                        query: request.query,
                        message: e.to_string(),
                    }
                }
            };
            Self::send_result(&tx, result).await;
        });
    }

    fn search_page_result(request: PageRequest, response: NewsResponse) -> RefreshResult {
        let received = response.articles.len() as u32;
        RefreshResult::SearchPage {
            query: request.query,
            page: request.page,
            received,
            total_results: response.total_results,
            articles: response.into_articles(),
        }
    }

    /// Helper to send refresh results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send refresh result - channel closed");
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.refresh_rx.try_recv() {
            self.process_refresh_result(result);
        }
    }

    fn process_refresh_result(&mut self, result: RefreshResult) {
        match result {
            RefreshResult::BreakingNews(mut articles) => {
                if let Err(e) = self.cache.save_breaking_news(&articles) {
                    warn!(error = %e, "Failed to cache breaking news");
                }
                self.mark_bookmarks(&mut articles);
                let count = articles.len();
                let breaking = &mut self.shell.pages_mut().breaking;
                breaking.list.submit(articles);
                breaking.load_state = LoadState::Idle;
                self.cache_ages = self.cache.get_cache_ages();
                self.status_message = Some(format!("Loaded {} headlines", count));
            }
            RefreshResult::BreakingNewsFailed(message) => {
                self.shell.pages_mut().breaking.load_state = LoadState::Error(message.clone());
                self.status_message = Some(format!("Refresh failed: {} - [r] to retry", message));
            }
            RefreshResult::SearchPage {
                query,
                page,
                mut articles,
                received,
                total_results,
            } => {
                self.mark_bookmarks(&mut articles);
                let search = &mut self.shell.pages_mut().search;
                let Some(pager) = search.pager.as_mut().filter(|p| p.query() == query) else {
                    debug!(query = %query, "Dropping results for an old search");
                    return;
                };
                pager.on_page_loaded(page, articles, received, total_results);
                let loaded = pager.articles().to_vec();
                search.sync_list();
                if let Err(e) = self.cache.save_search_results(&query, &loaded) {
                    warn!(error = %e, "Failed to cache search results");
                }
                self.status_message = Some(format!(
                    "{} of {} results for \"{}\"",
                    loaded.len(),
                    total_results,
                    query
                ));
            }
            RefreshResult::SearchFailed { query, message } => {
                let search = &mut self.shell.pages_mut().search;
                if let Some(pager) = search.pager.as_mut().filter(|p| p.query() == query) {
                    pager.on_load_error(message.clone());
                    self.status_message = Some(format!("Search failed: {} - [r] to retry", message));
                }
            }
            RefreshResult::Bootstrap(outcome) => {
                self.status_message = Some(match outcome {
                    BootstrapOutcome::Warmed => "API key loaded".to_string(),
                    BootstrapOutcome::StoreEmpty => {
                        "No API key - run `headlines --set-key`".to_string()
                    }
                    BootstrapOutcome::StoreFailed(_) => {
                        "Could not read stored API key".to_string()
                    }
                });
                self.bootstrap_outcome = Some(outcome);
            }
        }
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a query character should be accepted
pub fn can_add_query_char(current_len: usize, c: char) -> bool {
    current_len < MAX_QUERY_LENGTH && !c.is_control()
}

// ============================================================================
// Tests
// ============================================================================
