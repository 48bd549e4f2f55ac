//! Data models for the news reader.
//!
//! - `AccountProperties`: the durable account record holding the API token
//! - `NewsArticle`: a cached, displayable article keyed by its URL
//! - `NewsResponse`, `ArticleDto`: News API wire types

pub mod account;
pub mod article;

pub use account::{AccountProperties, CURRENT_ACCOUNT_PK};
pub use article::{ArticleDto, ArticleSource, NewsArticle, NewsResponse};
