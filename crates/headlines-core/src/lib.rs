//! Core library for headlines.
//!
//! Everything here is independent of the terminal front-end: the News API
//! client, the API-key session and its startup bootstrap, the article cache,
//! paged search and the three-page navigation shell.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod navigation;
pub mod paging;
pub mod utils;

pub use config::Config;
