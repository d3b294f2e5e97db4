use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

/// Environment variable that overrides `server.base_url`.
pub const URL_ENV: &str = "TVHC_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub epg: EpgConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Where the tvheadend web interface lives and how to authenticate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// HTTP basic auth user.  Empty = anonymous.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Tuning for the buffered EPG view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpgConfig {
    /// Rows requested by a reload.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Extra rows fetched past the end of a scrolled-to range.
    #[serde(default = "default_near_limit")]
    pub near_limit: usize,
    /// Cached rows above this count are evicted, farthest from the viewport first.
    #[serde(default = "default_max_cached_rows")]
    pub max_cached_rows: usize,
    #[serde(default = "default_catalog_refresh_secs")]
    pub catalog_refresh_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub show_end_column: bool,
    /// Re-render cadence; keeps the airing-now emphasis current.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: String::new(),
            password: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for EpgConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            near_limit: default_near_limit(),
            max_cached_rows: default_max_cached_rows(),
            catalog_refresh_secs: default_catalog_refresh_secs(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_end_column: false,
            tick_ms: default_tick_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:9981/".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_buffer_size() -> usize {
    300
}

fn default_near_limit() -> usize {
    100
}

fn default_max_cached_rows() -> usize {
    3000
}

fn default_catalog_refresh_secs() -> u64 {
    300
}

fn default_tick_ms() -> u64 {
    1000
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing {}", config_path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("writing {}", config_path.display()))?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// Apply `TVHC_URL` if present.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(URL_ENV) {
            if !url.trim().is_empty() {
                self.server.base_url = url.trim().to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.base_url, "http://127.0.0.1:9981/");
        assert_eq!(config.epg.buffer_size, 300);
        assert_eq!(config.epg.near_limit, 100);
        assert!(!config.ui.show_end_column);
        assert!(config.server.username.is_empty());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            base_url = "http://tv.lan:9981/"

            [epg]
            near_limit = 40
            "#,
        )
        .unwrap();
        assert_eq!(config.server.base_url, "http://tv.lan:9981/");
        assert_eq!(config.server.timeout_secs, 15);
        assert_eq!(config.epg.near_limit, 40);
        assert_eq!(config.epg.buffer_size, 300);
        assert_eq!(config.ui.tick_ms, 1000);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let mut config = Config::default();
        config.server.username = "admin".into();
        config.epg.max_cached_rows = 1200;
        let text = toml::to_string_pretty(&config).unwrap();
        let back = Config::from_toml_str(&text).unwrap();
        assert_eq!(back.server.username, "admin");
        assert_eq!(back.epg.max_cached_rows, 1200);
    }
}
