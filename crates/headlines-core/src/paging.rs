//! Paged loading of search results and the list model the pages render.
//!
//! `SearchPager` tracks which page of a query to ask for next and when the
//! list has ended. `ArticleList` is the ordered, identity-keyed list a page
//! displays; clicks are addressed by position and resolved against whatever
//! the list holds at the time of the click.

use std::collections::HashSet;

use crate::models::NewsArticle;

/// Articles requested per search page.
pub const DEFAULT_SEARCH_PAGE_SIZE: u32 = 20;

/// The developer plan of the News API serves at most this many results
/// per query, whatever `totalResults` says.
pub const MAX_SEARCH_RESULTS: u32 = 100;

/// Where a paged list is in its loading cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    /// The last page failed; `retry` re-requests it.
    Error(String),
    EndReached,
}

/// A request for one page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: String,
    pub page: u32,
    pub page_size: u32,
}

/// Lazily loads search results one page at a time.
#[derive(Debug, Clone)]
pub struct SearchPager {
    query: String,
    page_size: u32,
    next_page: u32,
    total_results: Option<u32>,
    articles: Vec<NewsArticle>,
    seen: HashSet<String>,
    load_state: LoadState,
}

impl SearchPager {
    pub fn new(query: impl Into<String>, page_size: u32) -> Self {
        Self {
            query: query.into(),
            page_size: page_size.max(1),
            next_page: 1,
            total_results: None,
            articles: Vec::new(),
            seen: HashSet::new(),
            load_state: LoadState::Idle,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn articles(&self) -> &[NewsArticle] {
        &self.articles
    }

    pub fn articles_mut(&mut self) -> &mut [NewsArticle] {
        &mut self.articles
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn total_results(&self) -> Option<u32> {
        self.total_results
    }

    /// The next page to fetch, if a fetch should start now. Marks the pager
    /// as loading; returns `None` while loading, after an error (use
    /// `retry`) or once the end is reached.
    pub fn next_request(&mut self) -> Option<PageRequest> {
        if self.load_state != LoadState::Idle || self.query.trim().is_empty() {
            return None;
        }
        self.load_state = LoadState::Loading;
        Some(PageRequest {
            query: self.query.clone(),
            page: self.next_page,
            page_size: self.page_size,
        })
    }

    /// Append a loaded page. `received` is the number of items the API
    /// returned before removed entries were dropped from `articles`; it alone
    /// decides whether the page was short. Responses for a page other than
    /// the one being waited on are ignored.
    pub fn on_page_loaded(
        &mut self,
        page: u32,
        articles: Vec<NewsArticle>,
        received: u32,
        total_results: u32,
    ) {
        if self.load_state != LoadState::Loading || page != self.next_page {
            return;
        }

        for article in articles {
            if self.seen.insert(article.url.clone()) {
                self.articles.push(article);
            }
        }

        self.total_results = Some(total_results);
        self.next_page += 1;

        let requested = (self.next_page - 1) * self.page_size;
        let limit = total_results.min(MAX_SEARCH_RESULTS);
        self.load_state = if received < self.page_size || requested >= limit {
            LoadState::EndReached
        } else {
            LoadState::Idle
        };
    }

    pub fn on_load_error(&mut self, message: impl Into<String>) {
        if self.load_state == LoadState::Loading {
            self.load_state = LoadState::Error(message.into());
        }
    }

    /// Clear an error so the failed page is requested again.
    pub fn retry(&mut self) -> Option<PageRequest> {
        if matches!(self.load_state, LoadState::Error(_)) {
            self.load_state = LoadState::Idle;
        }
        self.next_request()
    }

    pub fn is_exhausted(&self) -> bool {
        self.load_state == LoadState::EndReached
    }
}

/// Ordered articles with a selection cursor, keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct ArticleList {
    items: Vec<NewsArticle>,
    selected: usize,
}

impl ArticleList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents. The selection follows the previously selected
    /// article if it is still present, otherwise it is clamped.
    pub fn submit(&mut self, items: Vec<NewsArticle>) {
        let previous = self.items.get(self.selected).map(|a| a.url.clone());
        self.items = items;
        self.selected = previous
            .and_then(|url| self.items.iter().position(|a| a.url == url))
            .unwrap_or(self.selected)
            .min(self.items.len().saturating_sub(1));
    }

    pub fn items(&self) -> &[NewsArticle] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&NewsArticle> {
        self.items.get(position)
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&NewsArticle> {
        self.items.get(self.selected)
    }

    pub fn select(&mut self, position: usize) {
        self.selected = position.min(self.items.len().saturating_sub(1));
    }

    pub fn select_next(&mut self, step: usize) {
        self.select(self.selected.saturating_add(step));
    }

    pub fn select_prev(&mut self, step: usize) {
        self.selected = self.selected.saturating_sub(step);
    }

    pub fn scroll_to_top(&mut self) {
        self.selected = 0;
    }

    /// Whether the selection is within `threshold` rows of the end.
    pub fn near_end(&self, threshold: usize) -> bool {
        self.items.len().saturating_sub(self.selected + 1) <= threshold
    }

    /// Call `f` with the article at `position`. Nothing happens if the
    /// position no longer resolves to an article.
    pub fn on_item_click<R>(&self, position: usize, f: impl FnOnce(&NewsArticle) -> R) -> Option<R> {
        self.items.get(position).map(f)
    }

    /// Same as `on_item_click`, for the bookmark action.
    pub fn on_bookmark_click<R>(
        &self,
        position: usize,
        f: impl FnOnce(&NewsArticle) -> R,
    ) -> Option<R> {
        self.items.get(position).map(f)
    }

    /// Update the bookmark flag of the item with the given URL.
    pub fn set_bookmarked(&mut self, url: &str, bookmarked: bool) {
        for item in self.items.iter_mut().filter(|a| a.url == url) {
            item.is_bookmarked = bookmarked;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::article::test_article;

    fn page(range: std::ops::Range<u32>) -> Vec<NewsArticle> {
        range
            .map(|i| test_article(&format!("https://n.com/{}", i), &format!("Article {}", i)))
            .collect()
    }

    #[test]
    fn test_pager_requests_pages_in_order() {
        let mut pager = SearchPager::new("rust", 2);

        let first = pager.next_request().expect("first page");
        assert_eq!(first.page, 1);
        assert_eq!(first.page_size, 2);
        assert!(pager.next_request().is_none(), "no overlapping loads");

        pager.on_page_loaded(1, page(0..2), 2, 5);
        assert_eq!(pager.load_state(), &LoadState::Idle);

        let second = pager.next_request().expect("second page");
        assert_eq!(second.page, 2);
        pager.on_page_loaded(2, page(2..4), 2, 5);

        assert_eq!(pager.next_request().map(|r| r.page), Some(3));
        pager.on_page_loaded(3, page(4..5), 1, 5);
        assert!(pager.is_exhausted());
        assert!(pager.next_request().is_none());
        assert_eq!(pager.articles().len(), 5);
    }

    #[test]
    fn test_pager_dedupes_by_url() {
        let mut pager = SearchPager::new("rust", 2);
        pager.next_request();
        pager.on_page_loaded(1, page(0..2), 2, 10);
        pager.next_request();
        pager.on_page_loaded(2, page(1..3), 2, 10);

        let urls: Vec<&str> = pager.articles().iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["https://n.com/0", "https://n.com/1", "https://n.com/2"]);
    }

    #[test]
    fn test_pager_stops_at_api_result_cap() {
        let mut pager = SearchPager::new("rust", 50);
        pager.next_request();
        pager.on_page_loaded(1, page(0..50), 50, 10_000);
        assert!(!pager.is_exhausted());
        pager.next_request();
        pager.on_page_loaded(2, page(50..100), 50, 10_000);
        assert!(pager.is_exhausted());
    }

    #[test]
    fn test_pager_short_after_filtering_is_not_the_end() {
        let mut pager = SearchPager::new("rust", 20);
        pager.next_request();

        // Full page of 20 from the API, one of them dropped as removed
        pager.on_page_loaded(1, page(0..19), 20, 500);
        assert_eq!(pager.load_state(), &LoadState::Idle);
        assert_eq!(pager.articles().len(), 19);
        assert_eq!(pager.next_request().map(|r| r.page), Some(2));

        // A genuinely short page still ends the list
        pager.on_page_loaded(2, page(19..30), 11, 500);
        assert!(pager.is_exhausted());
    }

    #[test]
    fn test_pager_error_and_retry() {
        let mut pager = SearchPager::new("rust", 2);
        pager.next_request();
        pager.on_load_error("Network error");
        assert_eq!(pager.load_state(), &LoadState::Error("Network error".to_string()));
        assert!(pager.next_request().is_none());

        let retry = pager.retry().expect("retry request");
        assert_eq!(retry.page, 1);
        assert_eq!(pager.load_state(), &LoadState::Loading);
    }

    #[test]
    fn test_pager_ignores_stale_pages_and_blank_query() {
        let mut pager = SearchPager::new("rust", 2);
        pager.next_request();
        pager.on_page_loaded(4, page(0..2), 2, 10);
        assert!(pager.articles().is_empty());
        assert_eq!(pager.load_state(), &LoadState::Loading);

        let mut blank = SearchPager::new("   ", 2);
        assert!(blank.next_request().is_none());
    }

    #[test]
    fn test_list_submit_keeps_selection_by_identity() {
        let mut list = ArticleList::new();
        list.submit(page(0..5));
        list.select(2);
        assert_eq!(list.selected_item().map(|a| a.url.as_str()), Some("https://n.com/2"));

        // Same article moves to the front
        let mut reordered = page(2..3);
        reordered.extend(page(0..2));
        list.submit(reordered);
        assert_eq!(list.selected(), 0);
        assert_eq!(list.selected_item().map(|a| a.url.as_str()), Some("https://n.com/2"));

        // Selected article disappears: clamp
        list.submit(page(10..11));
        assert_eq!(list.selected(), 0);
        list.submit(Vec::new());
        assert!(list.selected_item().is_none());
    }

    #[test]
    fn test_list_click_on_stale_position_is_noop() {
        let mut list = ArticleList::new();
        list.submit(page(0..3));

        let clicked = list.on_item_click(1, |a| a.url.clone());
        assert_eq!(clicked.as_deref(), Some("https://n.com/1"));

        list.submit(page(0..1));
        let mut called = false;
        let result = list.on_bookmark_click(1, |_| called = true);
        assert!(result.is_none());
        assert!(!called);
    }

    #[test]
    fn test_list_navigation() {
        let mut list = ArticleList::new();
        list.submit(page(0..20));
        list.select_next(10);
        assert_eq!(list.selected(), 10);
        list.select_next(50);
        assert_eq!(list.selected(), 19);
        assert!(list.near_end(0));
        list.select_prev(5);
        assert!(!list.near_end(3));
        list.scroll_to_top();
        assert_eq!(list.selected(), 0);
    }

    #[test]
    fn test_set_bookmarked() {
        let mut list = ArticleList::new();
        list.submit(page(0..2));
        list.set_bookmarked("https://n.com/1", true);
        assert!(list.get(1).map(|a| a.is_bookmarked).unwrap_or(false));
        assert!(!list.get(0).map(|a| a.is_bookmarked).unwrap_or(true));
    }
}
