//! API client for the News API (`newsapi.org/v2`).
//!
//! `NewsClient` issues the two calls the reader needs: top headlines for a
//! country and the paged `everything` search.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::RequestAuthenticator;
use crate::models::NewsResponse;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for all endpoints
pub const BASE_URL: &str = "https://newsapi.org/v2/";

/// Country for top headlines when none is configured
pub const DEFAULT_COUNTRY: &str = "hu";

/// Page size for top headlines; the whole list fits in one page.
pub const BREAKING_NEWS_PAGE_SIZE: u32 = 100;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// News API client.
/// Clone is cheap - reqwest::Client and the authenticator are both Arc-backed.
#[derive(Clone)]
pub struct NewsClient {
    client: Client,
    authenticator: RequestAuthenticator,
    base_url: String,
    country: String,
}

impl NewsClient {
    /// Create a client that authorizes requests through `authenticator`.
    pub fn new(authenticator: RequestAuthenticator) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("headlines/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            authenticator,
            base_url: BASE_URL.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    // ===== Request building =====

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET request with the current key attached. The key is looked up here,
    /// each time a request is built.
    fn build_get(&self, path: &str, query: &[(&str, String)]) -> RequestBuilder {
        let request = self.client.get(self.endpoint(path)).query(query);
        self.authenticator.authorize(request)
    }

    fn breaking_news_request(&self) -> RequestBuilder {
        self.build_get(
            "top-headlines",
            &[
                ("country", self.country.clone()),
                ("pageSize", BREAKING_NEWS_PAGE_SIZE.to_string()),
            ],
        )
    }

    fn search_request(&self, query: &str, page: u32, page_size: u32) -> RequestBuilder {
        self.build_get(
            "everything",
            &[
                ("q", query.to_string()),
                ("page", page.to_string()),
                ("pageSize", page_size.to_string()),
            ],
        )
    }

    // ===== Response handling =====

    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should
    /// retry), or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn send<T: DeserializeOwned>(&self, build: impl Fn() -> RequestBuilder) -> Result<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let request = build().build().context("Failed to build request")?;
            let url = request.url().path().to_string();
            let response = self
                .client
                .execute(request)
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send GET request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    fn into_checked(response: NewsResponse) -> Result<NewsResponse> {
        if response.is_error() {
            return Err(ApiError::Api {
                code: response.code.unwrap_or_else(|| "unknown".to_string()),
                message: response.message.unwrap_or_default(),
            }
            .into());
        }
        Ok(response)
    }

    // ===== Endpoints =====

    /// Fetch the top headlines for the configured country.
    pub async fn get_breaking_news(&self) -> Result<NewsResponse> {
        debug!(country = %self.country, "Fetching breaking news");
        let response: NewsResponse = self.send(|| self.breaking_news_request()).await?;
        Self::into_checked(response)
    }

    /// Search all articles. Pages are 1-based.
    pub async fn search_news(&self, query: &str, page: u32, page_size: u32) -> Result<NewsResponse> {
        debug!(query, page, page_size, "Searching news");
        let response: NewsResponse = self
            .send(|| self.search_request(query, page, page_size))
            .await?;
        Self::into_checked(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::API_KEY_HEADER;

    fn client() -> (RequestAuthenticator, NewsClient) {
        let auth = RequestAuthenticator::new();
        let client = NewsClient::new(auth.clone()).expect("client builds");
        (auth, client)
    }

    #[test]
    fn test_breaking_news_url() {
        let (_, client) = client();
        let request = client.breaking_news_request().build().expect("request");
        assert_eq!(
            request.url().as_str(),
            "https://newsapi.org/v2/top-headlines?country=hu&pageSize=100"
        );
    }

    #[test]
    fn test_search_url_encodes_query() {
        let (_, client) = client();
        let request = client
            .search_request("rust & tokio", 2, 20)
            .build()
            .expect("request");
        assert_eq!(request.url().path(), "/v2/everything");
        assert_eq!(request.url().query(), Some("q=rust+%26+tokio&page=2&pageSize=20"));
    }

    #[test]
    fn test_key_applied_per_request() {
        let (auth, client) = client();

        let before = client.breaking_news_request().build().expect("request");
        assert!(before.headers().get(API_KEY_HEADER).is_none());

        auth.set_token("abc123");
        let after = client.breaking_news_request().build().expect("request");
        assert_eq!(
            after.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok()),
            Some("abc123")
        );
    }

    #[test]
    fn test_base_url_and_country_overrides() {
        let (_, client) = client();
        let client = client.with_base_url("http://localhost:8080/v2").with_country("de");
        let request = client.breaking_news_request().build().expect("request");
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8080/v2/top-headlines?country=de&pageSize=100"
        );
    }

    #[test]
    fn test_error_envelope_is_rejected() {
        let response = NewsResponse {
            status: "error".to_string(),
            code: Some("apiKeyInvalid".to_string()),
            message: Some("Your API key is invalid.".to_string()),
            ..Default::default()
        };
        let err = NewsClient::into_checked(response).expect_err("error envelope");
        assert!(err.to_string().contains("apiKeyInvalid"));
    }
}
