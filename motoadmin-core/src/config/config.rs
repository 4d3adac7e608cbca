//! src/config/config.rs
//! ============================================================================
//! # Config: Application Configuration Loader and Saver
//!
//! Manages all user-editable settings for the admin console. Loads and saves
//! settings as TOML from the proper cross-platform config path using the
//! [`directories`](https://docs.rs/directories) crate.
//!
//! ## Features
//! - XDG-compliant config discovery and writing (Linux, macOS, Windows)
//! - Robust defaulting if no config file exists
//! - Async load/save for smooth integration with Tokio
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! config.save().await?;
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// App theme (color scheme) selector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Light,
    Dark,
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the workshop REST backend (no trailing slash).
    pub api_base_url: String,
    /// Per-request HTTP timeout.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Quiet period before a typed search query is applied.
    #[serde(with = "humantime_serde")]
    pub search_debounce: Duration,
    /// Rows requested per backend page.
    pub page_size: u32,
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: "http://localhost:8000/api".to_string(),
            request_timeout: Duration::from_secs(30),
            search_debounce: Duration::from_millis(300),
            page_size: 50,
            theme: Theme::Default,
        }
    }
}

impl Config {
    /// Loads config from TOML file at the XDG-compliant app config dir, or returns defaults.
    ///
    /// The config is expected at `$XDG_CONFIG_HOME/motoadmin/config.toml`
    /// (Linux), or equivalent on Windows/macOS.
    pub async fn load() -> anyhow::Result<Self> {
        let path: PathBuf = Self::config_path()?;
        if path.exists() {
            let text: String = tokio::fs::read_to_string(&path).await?;
            let cfg: Config = toml::from_str(&text)?;
            Ok(cfg)
        } else {
            Ok(Config::default())
        }
    }

    /// Saves config to TOML file at the XDG-compliant app config dir.
    pub async fn save(&self) -> anyhow::Result<()> {
        let path: PathBuf = Self::config_path()?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let toml_str: String = toml::to_string_pretty(self)?;
        tokio::fs::write(&path, toml_str).await?;
        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        let proj_dirs: ProjectDirs = ProjectDirs::from("org", "motoadmin", "motoadmin")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip() {
        let cfg = Config::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.api_base_url, cfg.api_base_url);
        assert_eq!(back.search_debounce, Duration::from_millis(300));
        assert_eq!(back.page_size, 50);
    }
}
