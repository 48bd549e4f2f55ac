//! REST client module for the News API.
//!
//! This module provides the `NewsClient` for fetching top headlines and
//! searching all articles. Every request is authorized through the shared
//! `RequestAuthenticator`, so key changes apply without rebuilding the client.

pub mod client;
pub mod error;

pub use client::{NewsClient, BASE_URL, BREAKING_NEWS_PAGE_SIZE, DEFAULT_COUNTRY};
pub use error::ApiError;
