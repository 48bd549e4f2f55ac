//! The three pages hosted by the navigation shell.
//!
//! Each page owns its list and cursor, so switching tabs never loses the
//! scroll position or an in-flight search.

use headlines_core::models::NewsArticle;
use headlines_core::navigation::{Destination, Page, PageSet, ReselectListener};
use headlines_core::paging::{ArticleList, LoadState, SearchPager};
use tracing::debug;

#[derive(Default)]
pub struct BreakingNewsPage {
    pub list: ArticleList,
    pub load_state: LoadState,
    pub attached: bool,
}

impl Page for BreakingNewsPage {
    fn on_attach(&mut self) {
        self.attached = true;
    }

    fn on_detach(&mut self) {
        self.attached = false;
    }

    fn reselect_listener(&mut self) -> Option<&mut dyn ReselectListener> {
        Some(self)
    }
}

impl ReselectListener for BreakingNewsPage {
    fn on_reselected(&mut self) {
        debug!("Breaking news reselected, scrolling to top");
        self.list.scroll_to_top();
    }
}

#[derive(Default)]
pub struct SearchPage {
    /// Query being typed
    pub input: String,
    pub pager: Option<SearchPager>,
    pub list: ArticleList,
    pub attached: bool,
}

impl SearchPage {
    pub fn load_state(&self) -> LoadState {
        self.pager
            .as_ref()
            .map(|p| p.load_state().clone())
            .unwrap_or_default()
    }

    pub fn query(&self) -> Option<&str> {
        self.pager.as_ref().map(|p| p.query())
    }

    /// Push the pager's articles into the displayed list.
    pub fn sync_list(&mut self) {
        if let Some(ref pager) = self.pager {
            self.list.submit(pager.articles().to_vec());
        }
    }
}

impl Page for SearchPage {
    fn on_attach(&mut self) {
        self.attached = true;
    }

    fn on_detach(&mut self) {
        self.attached = false;
    }

    fn reselect_listener(&mut self) -> Option<&mut dyn ReselectListener> {
        Some(self)
    }
}

impl ReselectListener for SearchPage {
    fn on_reselected(&mut self) {
        debug!("Search reselected, scrolling to top");
        self.list.scroll_to_top();
    }
}

/// Bookmarks are reloaded from disk whenever the page is shown.
#[derive(Default)]
pub struct BookmarksPage {
    pub list: ArticleList,
    pub attached: bool,
    pub needs_reload: bool,
}

impl Page for BookmarksPage {
    fn on_attach(&mut self) {
        self.attached = true;
        self.needs_reload = true;
    }

    fn on_detach(&mut self) {
        self.attached = false;
    }
}

#[derive(Default)]
pub struct NewsPages {
    pub breaking: BreakingNewsPage,
    pub search: SearchPage,
    pub bookmarks: BookmarksPage,
}

impl NewsPages {
    pub fn list(&self, destination: Destination) -> &ArticleList {
        match destination {
            Destination::BreakingNews => &self.breaking.list,
            Destination::Search => &self.search.list,
            Destination::Bookmarks => &self.bookmarks.list,
        }
    }

    pub fn list_mut(&mut self, destination: Destination) -> &mut ArticleList {
        match destination {
            Destination::BreakingNews => &mut self.breaking.list,
            Destination::Search => &mut self.search.list,
            Destination::Bookmarks => &mut self.bookmarks.list,
        }
    }

    /// Reflect a bookmark change on every page that shows the article.
    pub fn set_bookmarked(&mut self, article: &NewsArticle, bookmarked: bool) {
        self.breaking.list.set_bookmarked(&article.url, bookmarked);
        self.search.list.set_bookmarked(&article.url, bookmarked);
        if let Some(ref mut pager) = self.search.pager {
            for a in pager.articles_mut().iter_mut().filter(|a| a.url == article.url) {
                a.is_bookmarked = bookmarked;
            }
        }
    }
}

impl PageSet for NewsPages {
    fn find_by_tag(&mut self, tag: &str) -> Option<&mut dyn Page> {
        if tag == Destination::BreakingNews.tag() {
            Some(&mut self.breaking)
        } else if tag == Destination::Search.tag() {
            Some(&mut self.search)
        } else if tag == Destination::Bookmarks.tag() {
            Some(&mut self.bookmarks)
        } else {
            None
        }
    }
}
