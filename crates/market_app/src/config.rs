//! Configuration for the market client.
//!
//! Read from a RON file (`./market.ron` by default). A missing file means
//! defaults; an unreadable or invalid file is an error. Missing fields use
//! default values.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use market_core::PrefetchGate;
use market_engine::FetchSettings;
use market_logging::market_info;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_CONFIG_FILENAME: &str = "market.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub base_url: String,
    /// Items per page; also the gate boundary width.
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openmarket.yagom-academy.kr".to_string(),
            page_size: 20,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        let settings = FetchSettings::default();
        Self {
            connect_timeout_ms: settings.connect_timeout.as_millis() as u64,
            request_timeout_ms: settings.request_timeout.as_millis() as u64,
            max_bytes: settings.max_bytes,
        }
    }
}

impl AppConfig {
    /// Load `./market.ron`, or defaults if it does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(Path::new(DEFAULT_CONFIG_FILENAME))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                market_info!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        };

        let config: AppConfig = ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            source: err,
        })?;
        config.validate()?;
        market_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        self.page_size()?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.feed.base_url).map_err(|err| ConfigError::InvalidBaseUrl {
            url: self.feed.base_url.clone(),
            source: err,
        })
    }

    pub fn page_size(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.feed.page_size as usize).ok_or(ConfigError::InvalidPageSize)
    }

    pub fn gate(&self) -> Result<PrefetchGate, ConfigError> {
        Ok(PrefetchGate::new(self.page_size()?))
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_millis(self.fetch.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.fetch.request_timeout_ms),
            max_bytes: self.fetch.max_bytes,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },

    #[error("Invalid base url {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("page_size must be at least 1")]
    InvalidPageSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_all_defaults() {
        let config: AppConfig = ron::from_str("()").expect("empty config should work");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.page_size().unwrap().get(), 20);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config: AppConfig =
            ron::from_str("(feed: (page_size: 10))").expect("partial config should work");
        assert_eq!(config.feed.page_size, 10);
        assert_eq!(config.feed.base_url, FeedConfig::default().base_url);
        assert_eq!(config.fetch, FetchConfig::default());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut config = AppConfig::default();
        config.feed.page_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPageSize)
        ));
    }

    #[test]
    fn fetch_settings_round_trip_defaults() {
        let settings = AppConfig::default().fetch_settings();
        let defaults = FetchSettings::default();
        assert_eq!(settings.connect_timeout, defaults.connect_timeout);
        assert_eq!(settings.request_timeout, defaults.request_timeout);
        assert_eq!(settings.max_bytes, defaults.max_bytes);
    }
}
