//! Configuration management for gemtrend
//!
//! This module handles loading and validating configuration from environment variables
//! and TOML files.

use crate::analytics::momentum::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW};
use crate::analytics::DEFAULT_TOP_K;
use crate::models::{EntityRegistry, BRAND_ENTITY, MAX_ALIASES_PER_GROUP};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default DataLab search trend endpoint
pub const DEFAULT_ENDPOINT: &str = "https://openapi.naver.com/v1/datalab/search";

/// Keyword groups the provider accepts per request
pub const PROVIDER_MAX_GROUP_SIZE: usize = 5;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Analytics parameters
    pub analytics: AnalyticsConfig,

    /// Trend source configuration
    pub source: SourceConfig,

    /// Refresh schedule
    pub refresh: RefreshConfig,

    /// Read API server
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Tracked entities and their aliases
    pub entities: EntityRegistry,
}

/// Analytics parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Days of history requested per refresh
    pub lookback_days: u32,

    /// Short moving-average window
    pub short_window: usize,

    /// Long moving-average window
    pub long_window: usize,

    /// Size of every ranking
    pub top_k: usize,

    /// Entity whose raw series is published as the brand series
    pub watched_entity: String,
}

/// Trend source (Naver DataLab) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Search trend API endpoint
    pub endpoint: String,

    /// Client ID (X-Naver-Client-Id)
    pub client_id: Option<String>,

    /// Client secret (X-Naver-Client-Secret)
    pub client_secret: Option<String>,

    /// Keyword groups per request
    pub max_group_size: usize,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Requests per second
    pub rate_limit: u32,

    /// Retry attempts for transient failures
    pub max_retries: u32,
}

/// Refresh schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between refresh cycles
    pub interval_secs: u64,
}

/// Read API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            lookback_days: 365,
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            top_k: DEFAULT_TOP_K,
            watched_entity: BRAND_ENTITY.to_string(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            client_id: None,
            client_secret: None,
            max_group_size: PROVIDER_MAX_GROUP_SIZE,
            request_timeout_secs: 30,
            rate_limit: 2,
            max_retries: 3,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 24 * 60 * 60,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analytics: AnalyticsConfig::default(),
            source: SourceConfig::default(),
            refresh: RefreshConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            entities: EntityRegistry::gemstones(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables on top of defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_parse("GEMTREND_LOOKBACK_DAYS") {
            self.analytics.lookback_days = v;
        }
        if let Some(v) = env_parse("GEMTREND_SHORT_WINDOW") {
            self.analytics.short_window = v;
        }
        if let Some(v) = env_parse("GEMTREND_LONG_WINDOW") {
            self.analytics.long_window = v;
        }
        if let Some(v) = env_parse("GEMTREND_TOP_K") {
            self.analytics.top_k = v;
        }
        if let Ok(v) = std::env::var("GEMTREND_WATCHED_ENTITY") {
            self.analytics.watched_entity = v;
        }

        if let Ok(v) = std::env::var("GEMTREND_ENDPOINT") {
            self.source.endpoint = v;
        }
        if let Ok(v) = std::env::var("NAVER_CLIENT_ID") {
            self.source.client_id = Some(v);
        }
        if let Ok(v) = std::env::var("NAVER_CLIENT_SECRET") {
            self.source.client_secret = Some(v);
        }
        if let Some(v) = env_parse("GEMTREND_MAX_GROUP_SIZE") {
            self.source.max_group_size = v;
        }
        if let Some(v) = env_parse("GEMTREND_REQUEST_TIMEOUT") {
            self.source.request_timeout_secs = v;
        }
        if let Some(v) = env_parse("GEMTREND_RATE_LIMIT") {
            self.source.rate_limit = v;
        }

        if let Some(v) = env_parse("GEMTREND_REFRESH_INTERVAL") {
            self.refresh.interval_secs = v;
        }
        if let Ok(v) = std::env::var("GEMTREND_HOST") {
            self.server.host = v;
        }
        if let Some(v) = env_parse("GEMTREND_PORT") {
            self.server.port = v;
        }

        if let Ok(v) = std::env::var("GEMTREND_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("GEMTREND_LOG_FORMAT") {
            self.logging.format = v;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let analytics = &self.analytics;
        if analytics.lookback_days == 0 {
            anyhow::bail!("lookback_days must be greater than 0");
        }
        if analytics.short_window == 0 || analytics.long_window == 0 {
            anyhow::bail!("moving average windows must be greater than 0");
        }
        if analytics.short_window >= analytics.long_window {
            anyhow::bail!(
                "short_window ({}) must be smaller than long_window ({})",
                analytics.short_window,
                analytics.long_window
            );
        }
        if analytics.top_k == 0 {
            anyhow::bail!("top_k must be greater than 0");
        }

        let source = &self.source;
        url::Url::parse(&source.endpoint)
            .with_context(|| format!("Invalid source endpoint: {}", source.endpoint))?;
        if source.max_group_size == 0 || source.max_group_size > PROVIDER_MAX_GROUP_SIZE {
            anyhow::bail!(
                "max_group_size must be between 1 and {PROVIDER_MAX_GROUP_SIZE}, got {}",
                source.max_group_size
            );
        }
        if source.rate_limit == 0 {
            anyhow::bail!("rate_limit must be positive");
        }

        if self.refresh.interval_secs == 0 {
            anyhow::bail!("refresh interval must be greater than 0");
        }

        if self.entities.is_empty() {
            anyhow::bail!("at least one entity must be configured");
        }
        for entity in self.entities.entities() {
            let aliases = self.entities.aliases(entity).unwrap_or(&[]);
            if entity.trim().is_empty() {
                anyhow::bail!("entity keys must not be empty");
            }
            if aliases.is_empty() || aliases.len() > MAX_ALIASES_PER_GROUP {
                anyhow::bail!(
                    "entity '{entity}' must have between 1 and {MAX_ALIASES_PER_GROUP} aliases"
                );
            }
        }

        Ok(())
    }

    /// Client credentials, required only by the live source
    pub fn credentials(&self) -> Result<(String, String)> {
        let id = self
            .source
            .client_id
            .clone()
            .context("NAVER_CLIENT_ID is not set")?;
        let secret = self
            .source
            .client_secret
            .clone()
            .context("NAVER_CLIENT_SECRET is not set")?;
        Ok((id, secret))
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.request_timeout_secs)
    }

    /// Get refresh interval as Duration
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }
}
