// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{
    DEFAULT_EXCERPT_LENGTH, DEFAULT_LIST_LIMIT, DEFAULT_MAX_EXCERPTS, DEFAULT_SEARCH_LIMIT,
    DEFAULT_TIMEOUT_SECS,
};
use crate::domain::SearchMode;

/// Overrides `server.base_url` when set.
pub const SERVER_URL_ENV: &str = "SMARTNOTES_URL";

/// TOML configuration for the client
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub notes: NotesConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Origin used to build `/shared/{id}` links
    #[serde(default = "default_share_origin")]
    pub share_origin: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SearchConfig {
    #[serde(default)]
    pub mode: SearchMode,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
    #[serde(default = "default_include_content")]
    pub include_content: bool,
    #[serde(default = "default_max_excerpts")]
    pub max_excerpts: usize,
    #[serde(default = "default_excerpt_length")]
    pub excerpt_length: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NotesConfig {
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,
}

// Default value functions
fn default_base_url() -> String { "http://localhost:8000".to_string() }
fn default_share_origin() -> String { "http://localhost:5173".to_string() }
fn default_timeout_secs() -> u64 { DEFAULT_TIMEOUT_SECS }
fn default_search_limit() -> u32 { DEFAULT_SEARCH_LIMIT }
fn default_include_content() -> bool { true }
fn default_max_excerpts() -> usize { DEFAULT_MAX_EXCERPTS }
fn default_excerpt_length() -> usize { DEFAULT_EXCERPT_LENGTH }
fn default_list_limit() -> u32 { DEFAULT_LIST_LIMIT }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            share_origin: default_share_origin(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            limit: default_search_limit(),
            include_content: default_include_content(),
            max_excerpts: default_max_excerpts(),
            excerpt_length: default_excerpt_length(),
        }
    }
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }
        std::fs::write(path.as_ref(), toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// `<config dir>/smartnotes/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("smartnotes").join("config.toml"))
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used when
    /// present and built-in defaults otherwise. `SMARTNOTES_URL` and then
    /// `server_override` replace the base URL.
    pub fn resolve(path: Option<&Path>, server_override: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!(?path, "Loading config from default location");
                    Self::load(path)?
                }
                None => Self::default(),
            },
        };

        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                config.server.base_url = url;
            }
        }
        if let Some(url) = server_override {
            config.server.base_url = url.to_string();
        }
        Ok(config)
    }
}
