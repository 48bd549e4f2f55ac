use std::sync::Arc;

use arc_swap::ArcSwap;
use reqwest::RequestBuilder;

/// Header the News API reads the access key from.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Attaches the current API token to outgoing requests.
///
/// The token is read when a request is built, not when the authenticator is
/// constructed, so `set_token` applies to the very next request. Clones share
/// the same token.
#[derive(Clone, Default)]
pub struct RequestAuthenticator {
    token: Arc<ArcSwap<String>>,
}

impl RequestAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the token used for subsequent requests. An empty token means
    /// requests go out unauthenticated.
    pub fn set_token(&self, token: impl Into<String>) {
        self.token.store(Arc::new(token.into()));
    }

    pub fn token(&self) -> Arc<String> {
        self.token.load_full()
    }

    pub fn has_token(&self) -> bool {
        !self.token.load().is_empty()
    }

    /// Attach the current token to a request, if there is one.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.token.load();
        if token.is_empty() {
            request
        } else {
            request.header(API_KEY_HEADER, token.as_str())
        }
    }
}

impl std::fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAuthenticator")
            .field("has_token", &self.has_token())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_key_of(auth: &RequestAuthenticator) -> Option<String> {
        let client = reqwest::Client::new();
        let request = auth
            .authorize(client.get("https://newsapi.org/v2/everything"))
            .build()
            .expect("request builds");
        request
            .headers()
            .get(API_KEY_HEADER)
            .map(|v| v.to_str().unwrap_or_default().to_string())
    }

    #[test]
    fn test_default_token_is_empty() {
        let auth = RequestAuthenticator::new();
        assert_eq!(auth.token().as_str(), "");
        assert!(!auth.has_token());
        assert_eq!(api_key_of(&auth), None);
    }

    #[test]
    fn test_token_read_at_send_time() {
        let auth = RequestAuthenticator::new();
        let shared = auth.clone();

        shared.set_token("abc123");
        assert_eq!(api_key_of(&auth).as_deref(), Some("abc123"));

        shared.set_token("rotated");
        assert_eq!(api_key_of(&auth).as_deref(), Some("rotated"));

        shared.set_token("");
        assert_eq!(api_key_of(&auth), None);
    }

    #[test]
    fn test_debug_hides_token() {
        let auth = RequestAuthenticator::new();
        auth.set_token("secret");
        let debug = format!("{:?}", auth);
        assert!(!debug.contains("secret"));
    }
}
