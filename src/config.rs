//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the surf-tides.toml file.
//! It provides a centralized way to configure the tides API, the spot to follow,
//! display options and caching.

use crate::renderer::DisplayLocale;
use crate::schedule::DEFAULT_UPCOMING_LIMIT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "surf-tides.toml";

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "SURF_TIDES_API_URL";

/// Application configuration loaded from surf-tides.toml
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Tides API configuration
    pub api: ApiConfig,
    /// Display and caching configuration
    pub display: DisplayConfig,
}

/// Tides API configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the spots API, without trailing slash
    pub base_url: String,
    /// Spot whose tides are fetched
    pub spot_id: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

/// Display and caching configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// How many upcoming tide events to show
    pub max_events: usize,
    /// Language for labels, weekdays and clock format
    pub locale: DisplayLocale,
    /// Cache TTL in minutes
    pub cache_ttl_minutes: u64,
    /// Directory holding cached API payloads
    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig {
                base_url: "http://localhost:3000".to_string(),
                spot_id: "hossegor".to_string(),
                timeout_secs: 10,
            },
            display: DisplayConfig {
                max_events: DEFAULT_UPCOMING_LIMIT,
                locale: DisplayLocale::Fr,
                cache_ttl_minutes: 30,
                cache_dir: std::env::temp_dir().join("surf-tides"),
            },
        }
    }
}

impl Config {
    /// Load configuration from surf-tides.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(spot = %config.api.spot_id, "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!("invalid config file format: {}", e);
                    warn!("using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                info!(
                    path = %path.as_ref().display(),
                    "no config file found, using default configuration"
                );
                Self::default()
            }
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api.base_url = url;
            }
        }
        config
    }

    /// Save current configuration to the given path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }

    /// URL of the tides endpoint for the configured spot.
    pub fn tides_url(&self) -> String {
        format!(
            "{}/api/spots/{}/tides",
            self.api.base_url.trim_end_matches('/'),
            self.api.spot_id
        )
    }

    /// Cache file for the configured spot.
    pub fn cache_path(&self) -> PathBuf {
        self.display
            .cache_dir
            .join(format!("tides-{}.json", self.api.spot_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.spot_id, "hossegor");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.display.max_events, 4);
        assert_eq!(config.display.locale, DisplayLocale::Fr);
        assert_eq!(config.display.cache_ttl_minutes, 30);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.api.spot_id, parsed.api.spot_id);
        assert_eq!(config.display.locale, parsed.display.locale);
        assert_eq!(config.display.cache_dir, parsed.display.cache_dir);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config.api.spot_id, "hossegor");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = Config::default();
        config.api.spot_id = "la-graviere".to_string();
        config.display.locale = DisplayLocale::En;
        config.save(&path).unwrap();

        let loaded = Config::load_from_path(&path);
        assert_eq!(loaded.api.spot_id, "la-graviere");
        assert_eq!(loaded.display.locale, DisplayLocale::En);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "api = 42").unwrap();

        let config = Config::load_from_path(&path);
        assert_eq!(config.api.spot_id, "hossegor");
    }

    #[test]
    fn test_endpoint_and_cache_paths() {
        let mut config = Config::default();
        config.api.base_url = "https://surf.example/".to_string();
        config.api.spot_id = "lacanau".to_string();
        config.display.cache_dir = PathBuf::from("/var/cache/surf");

        assert_eq!(config.tides_url(), "https://surf.example/api/spots/lacanau/tides");
        assert_eq!(config.cache_path(), PathBuf::from("/var/cache/surf/tides-lacanau.json"));
    }
}
