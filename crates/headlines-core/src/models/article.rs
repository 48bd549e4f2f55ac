//! News article models.
//!
//! `NewsResponse` and `ArticleDto` mirror the News API wire format and are
//! converted into the domain type `NewsArticle`, which is what the cache,
//! pager and UI work with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{format_date, strip_html};

/// Title the News API substitutes for articles that were taken down.
const REMOVED_PLACEHOLDER: &str = "[Removed]";

/// Top-level News API response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsResponse {
    pub status: String,
    #[serde(rename = "totalResults", default)]
    pub total_results: u32,
    #[serde(default)]
    pub articles: Vec<ArticleDto>,
    /// Present when `status == "error"`
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl NewsResponse {
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }

    /// Convert the wire articles into domain articles, dropping removed
    /// and URL-less entries.
    pub fn into_articles(self) -> Vec<NewsArticle> {
        let now = Utc::now();
        self.articles
            .into_iter()
            .filter_map(|dto| dto.into_article(now))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleDto {
    #[serde(default)]
    pub source: Option<ArticleSource>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "urlToImage")]
    pub url_to_image: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub content: Option<String>,
}

impl ArticleDto {
    fn into_article(self, fetched_at: DateTime<Utc>) -> Option<NewsArticle> {
        let url = self.url.filter(|u| !u.is_empty())?;
        let title = self.title.unwrap_or_default();
        if title == REMOVED_PLACEHOLDER {
            return None;
        }

        Some(NewsArticle {
            url,
            title,
            description: self.description.map(|d| strip_html(&d)),
            source: self.source.and_then(|s| s.name),
            author: self.author,
            thumbnail_url: self.url_to_image,
            published_at: self.published_at,
            updated_at: fetched_at,
            is_bookmarked: false,
        })
    }
}

/// A displayable article. Identity is the article URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub source: Option<String>,
    pub author: Option<String>,
    pub thumbnail_url: Option<String>,
    pub published_at: Option<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_bookmarked: bool,
}

impl NewsArticle {
    /// Identity comparison used by list diffing: two articles are the same
    /// item when they share a URL, regardless of content.
    pub fn same_item(&self, other: &NewsArticle) -> bool {
        self.url == other.url
    }

    /// Content comparison used by list diffing.
    pub fn same_contents(&self, other: &NewsArticle) -> bool {
        self == other
    }

    pub fn source_display(&self) -> &str {
        self.source.as_deref().unwrap_or("Unknown source")
    }

    pub fn formatted_date(&self) -> String {
        self.published_at
            .as_deref()
            .map(format_date)
            .unwrap_or_default()
    }

    /// Lowercased match against title, description and source.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&query))
                .unwrap_or(false)
            || self
                .source
                .as_deref()
                .map(|s| s.to_lowercase().contains(&query))
                .unwrap_or(false)
    }
}

#[cfg(test)]
pub(crate) fn test_article(url: &str, title: &str) -> NewsArticle {
    NewsArticle {
        url: url.to_string(),
        title: title.to_string(),
        description: None,
        source: None,
        author: None,
        thumbnail_url: None,
        published_at: None,
        updated_at: Utc::now(),
        is_bookmarked: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "status": "ok",
        "totalResults": 3,
        "articles": [
            {
                "source": {"id": null, "name": "Telex"},
                "author": "Kovacs Anna",
                "title": "Budapest opens new tram line",
                "description": "<p>The line connects <b>Buda</b> and Pest.</p>",
                "url": "https://telex.hu/tram",
                "urlToImage": "https://telex.hu/tram.jpg",
                "publishedAt": "2024-03-05T10:15:00Z",
                "content": "..."
            },
            {
                "source": {"id": null, "name": "[Removed]"},
                "author": null,
                "title": "[Removed]",
                "description": "[Removed]",
                "url": "https://removed.com",
                "urlToImage": null,
                "publishedAt": "1970-01-01T00:00:00Z",
                "content": "[Removed]"
            },
            {
                "source": {"id": "index", "name": "Index"},
                "title": "No url here",
                "url": null
            }
        ]
    }"#;

    #[test]
    fn test_parse_news_response() {
        let resp: NewsResponse = serde_json::from_str(SAMPLE).expect("valid sample json");
        assert_eq!(resp.status, "ok");
        assert_eq!(resp.total_results, 3);
        assert_eq!(resp.articles.len(), 3);
        assert!(!resp.is_error());
    }

    #[test]
    fn test_into_articles_drops_removed_and_urlless() {
        let resp: NewsResponse = serde_json::from_str(SAMPLE).expect("valid sample json");
        let articles = resp.into_articles();
        assert_eq!(articles.len(), 1);

        let a = &articles[0];
        assert_eq!(a.url, "https://telex.hu/tram");
        assert_eq!(a.source_display(), "Telex");
        assert_eq!(a.description.as_deref(), Some("The line connects Buda and Pest."));
        assert_eq!(a.formatted_date(), "Mar 05, 2024");
        assert!(!a.is_bookmarked);
    }

    #[test]
    fn test_parse_error_response() {
        let json = r#"{"status":"error","code":"apiKeyMissing","message":"Your API key is missing."}"#;
        let resp: NewsResponse = serde_json::from_str(json).expect("valid error json");
        assert!(resp.is_error());
        assert_eq!(resp.code.as_deref(), Some("apiKeyMissing"));
        assert!(resp.articles.is_empty());
    }

    #[test]
    fn test_same_item_ignores_content() {
        let a = test_article("https://a.com", "First");
        let mut b = test_article("https://a.com", "Edited");
        b.is_bookmarked = true;
        assert!(a.same_item(&b));
        assert!(!a.same_contents(&b));
        assert!(!a.same_item(&test_article("https://b.com", "First")));
    }

    #[test]
    fn test_matches() {
        let mut a = test_article("https://a.com", "Election results");
        a.source = Some("Hirado".to_string());
        assert!(a.matches("ELECTION"));
        assert!(a.matches("hirado"));
        assert!(!a.matches("weather"));
    }
}
