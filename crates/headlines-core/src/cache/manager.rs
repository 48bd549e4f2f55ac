use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::NewsArticle;
use crate::utils::slugify;

/// Consider breaking news stale after 15 minutes.
const CACHE_STALE_MINUTES: i64 = 15;

/// Non-bookmarked articles older than this are purged from the cache.
pub const PURGE_AFTER_DAYS: i64 = 7;

const BREAKING_NEWS: &str = "breaking_news";
const BOOKMARKS: &str = "bookmarks";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            let remaining_hours = (minutes % 1440) / 60;
            if remaining_hours >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

/// On-disk article cache: breaking news, the last search per query, and
/// bookmarks. Bookmarks are the only data that is never purged.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        self.save_cached(name, &CachedData::new(data))
    }

    fn save_cached<T: Serialize>(&self, name: &str, cached: &CachedData<T>) -> Result<()> {
        let path = self.cache_path(name);
        let contents = serde_json::to_string_pretty(cached)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write cache file: {}", name))?;
        Ok(())
    }

    // ===== Breaking News =====

    pub fn load_breaking_news(&self) -> Result<Option<CachedData<Vec<NewsArticle>>>> {
        self.load(BREAKING_NEWS)
    }

    pub fn save_breaking_news(&self, articles: &[NewsArticle]) -> Result<()> {
        self.save(BREAKING_NEWS, &articles)
    }

    // ===== Search =====

    fn search_key(query: &str) -> String {
        format!("search_{}", slugify(query))
    }

    pub fn load_search_results(&self, query: &str) -> Result<Option<CachedData<Vec<NewsArticle>>>> {
        self.load(&Self::search_key(query))
    }

    pub fn save_search_results(&self, query: &str, articles: &[NewsArticle]) -> Result<()> {
        self.save(&Self::search_key(query), &articles)
    }

    // ===== Bookmarks =====

    pub fn load_bookmarks(&self) -> Result<Vec<NewsArticle>> {
        Ok(self
            .load::<Vec<NewsArticle>>(BOOKMARKS)?
            .map(|cached| cached.data)
            .unwrap_or_default())
    }

    fn save_bookmarks(&self, bookmarks: &[NewsArticle]) -> Result<()> {
        self.save(BOOKMARKS, &bookmarks)
    }

    pub fn bookmarked_urls(&self) -> Result<HashSet<String>> {
        Ok(self.load_bookmarks()?.into_iter().map(|a| a.url).collect())
    }

    pub fn is_bookmarked(&self, url: &str) -> Result<bool> {
        Ok(self.load_bookmarks()?.iter().any(|a| a.url == url))
    }

    /// Add the article to bookmarks, or remove it if already bookmarked.
    /// Returns the new bookmark state.
    pub fn toggle_bookmark(&self, article: &NewsArticle) -> Result<bool> {
        let mut bookmarks = self.load_bookmarks()?;
        let bookmarked = if let Some(pos) = bookmarks.iter().position(|a| a.same_item(article)) {
            bookmarks.remove(pos);
            false
        } else {
            let mut saved = article.clone();
            saved.is_bookmarked = true;
            bookmarks.insert(0, saved);
            true
        };
        self.save_bookmarks(&bookmarks)?;
        debug!(url = %article.url, bookmarked, "Bookmark toggled");
        Ok(bookmarked)
    }

    pub fn delete_all_bookmarks(&self) -> Result<()> {
        self.save_bookmarks(&[])
    }

    /// Mark which of `articles` are bookmarked.
    pub fn apply_bookmarks(&self, articles: &mut [NewsArticle]) -> Result<()> {
        let urls = self.bookmarked_urls()?;
        for article in articles {
            article.is_bookmarked = urls.contains(&article.url);
        }
        Ok(())
    }

    // ===== Maintenance =====

    /// Drop non-bookmarked breaking-news entries fetched more than `days`
    /// ago. Returns how many were removed.
    pub fn purge_older_than(&self, days: i64) -> Result<usize> {
        let Some(cached) = self.load_breaking_news()? else {
            return Ok(0);
        };
        let bookmarked = self.bookmarked_urls()?;
        let cutoff = Utc::now() - Duration::days(days);

        let before = cached.data.len();
        let kept: Vec<NewsArticle> = cached
            .data
            .into_iter()
            .filter(|a| a.updated_at >= cutoff || bookmarked.contains(&a.url))
            .collect();
        let removed = before - kept.len();

        if removed > 0 {
            // Keep the original timestamp so staleness is unaffected
            self.save_cached(
                BREAKING_NEWS,
                &CachedData {
                    data: kept,
                    cached_at: cached.cached_at,
                },
            )?;
            debug!(removed, "Purged old articles");
        }
        Ok(removed)
    }

    // ===== Cache Age Information =====

    pub fn get_cache_ages(&self) -> CacheAges {
        let breaking_news = match self.load_breaking_news() {
            Ok(cached) => cached.map(|c| c.age_display()),
            Err(e) => {
                debug!(error = %e, "Failed to load cache for age display");
                None
            }
        };
        CacheAges { breaking_news }
    }

    /// Whether breaking news should be refetched.
    pub fn breaking_news_stale(&self) -> bool {
        match self.load_breaking_news() {
            Ok(Some(cached)) => cached.is_stale(),
            Ok(None) => true, // No cache = stale
            Err(e) => {
                debug!(error = %e, "Failed to load cache for staleness check");
                true
            }
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct CacheAges {
    pub breaking_news: Option<String>,
}

impl CacheAges {
    pub fn last_updated(&self) -> String {
        self.breaking_news
            .clone()
            .unwrap_or_else(|| "never".to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::article::test_article;

    fn manager() -> (tempfile::TempDir, CacheManager) {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = CacheManager::new(dir.path().join("cache")).expect("cache manager");
        (dir, manager)
    }

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_age_display_hours_and_days() {
        let mut cached = CachedData::new(());
        cached.cached_at = Utc::now() - Duration::minutes(95);
        assert_eq!(cached.age_display(), "2h ago");
        cached.cached_at = Utc::now() - Duration::hours(26);
        assert_eq!(cached.age_display(), "1d ago");
    }

    #[test]
    fn test_cached_data_is_stale() {
        let fresh = CachedData::new(vec![1]);
        assert!(!fresh.is_stale());

        let mut old = CachedData::new(vec![1]);
        old.cached_at = Utc::now() - Duration::minutes(16);
        assert!(old.is_stale());
    }

    #[test]
    fn test_breaking_news_roundtrip_and_staleness() {
        let (_dir, cache) = manager();
        assert!(cache.breaking_news_stale());
        assert_eq!(cache.get_cache_ages().last_updated(), "never");

        cache
            .save_breaking_news(&[test_article("https://a.com", "A")])
            .expect("save");

        let loaded = cache.load_breaking_news().expect("load").expect("cached");
        assert_eq!(loaded.data.len(), 1);
        assert!(!cache.breaking_news_stale());
        assert_eq!(cache.get_cache_ages().last_updated(), "just now");
    }

    #[test]
    fn test_search_results_keyed_by_query() {
        let (_dir, cache) = manager();
        cache
            .save_search_results("Rust Lang", &[test_article("https://r.com", "R")])
            .expect("save");

        assert!(cache.load_search_results("rust lang").expect("load").is_some());
        assert!(cache.load_search_results("golang").expect("load").is_none());
    }

    #[test]
    fn test_toggle_bookmark() {
        let (_dir, cache) = manager();
        let article = test_article("https://a.com", "A");

        assert!(cache.toggle_bookmark(&article).expect("toggle"));
        assert!(cache.is_bookmarked("https://a.com").expect("read"));
        let bookmarks = cache.load_bookmarks().expect("load");
        assert_eq!(bookmarks.len(), 1);
        assert!(bookmarks[0].is_bookmarked);

        assert!(!cache.toggle_bookmark(&article).expect("toggle"));
        assert!(cache.load_bookmarks().expect("load").is_empty());
    }

    #[test]
    fn test_apply_bookmarks_and_delete_all() {
        let (_dir, cache) = manager();
        cache
            .toggle_bookmark(&test_article("https://b.com", "B"))
            .expect("toggle");

        let mut articles = vec![test_article("https://a.com", "A"), test_article("https://b.com", "B")];
        cache.apply_bookmarks(&mut articles).expect("apply");
        assert!(!articles[0].is_bookmarked);
        assert!(articles[1].is_bookmarked);

        cache.delete_all_bookmarks().expect("delete");
        assert!(cache.bookmarked_urls().expect("read").is_empty());
    }

    #[test]
    fn test_purge_keeps_recent_and_bookmarked() {
        let (_dir, cache) = manager();
        let mut old = test_article("https://old.com", "Old");
        old.updated_at = Utc::now() - Duration::days(10);
        let mut old_saved = test_article("https://saved.com", "Saved");
        old_saved.updated_at = Utc::now() - Duration::days(10);
        let recent = test_article("https://new.com", "New");

        cache.toggle_bookmark(&old_saved).expect("toggle");
        cache
            .save_breaking_news(&[old, old_saved, recent])
            .expect("save");

        assert_eq!(cache.purge_older_than(PURGE_AFTER_DAYS).expect("purge"), 1);
        let urls: Vec<String> = cache
            .load_breaking_news()
            .expect("load")
            .expect("cached")
            .data
            .into_iter()
            .map(|a| a.url)
            .collect();
        assert_eq!(urls, vec!["https://saved.com", "https://new.com"]);
        assert_eq!(cache.purge_older_than(PURGE_AFTER_DAYS).expect("purge"), 0);
    }
}
