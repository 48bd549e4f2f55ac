//! Local caching module for offline reading.
//!
//! This module provides the `CacheManager` for storing and retrieving
//! articles locally. Data is cached in JSON format; breaking news is
//! considered stale after 15 minutes.
//!
//! Cached data types include:
//! - Breaking news for the configured country
//! - The last result set per search query
//! - Bookmarks (never purged)

pub mod manager;

pub use manager::{CacheAges, CacheManager, CachedData, PURGE_AFTER_DAYS};
