//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! headline country, search page size, credential backend and an optional
//! API base URL override.
//!
//! Configuration is stored at `~/.config/headlines/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_COUNTRY;
use crate::auth::CredentialBackend;
use crate::paging::DEFAULT_SEARCH_PAGE_SIZE;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "headlines";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Two-letter country code for top headlines
    pub country: String,
    pub search_page_size: u32,
    pub credential_backend: CredentialBackend,
    pub api_base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            search_page_size: DEFAULT_SEARCH_PAGE_SIZE,
            credential_backend: CredentialBackend::default(),
            api_base_url: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Article cache, UI state and logs.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Durable data such as the account file.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn search_page_size(&self) -> u32 {
        self.search_page_size.clamp(1, 100)
    }
}
