//! Configuration management for sitesearch
//!
//! Configuration is read from a TOML file and may be overridden by
//! `SITESEARCH_*` environment variables.
//!
//! ```toml
//! [crawler]
//! user_agent = "SiteSearchBot/0.1"
//! referrer = "https://www.google.com"
//!
//! [[sites]]
//! url = "https://example.com"
//! name = "Example"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Crawler configuration
    pub crawler: CrawlerConfig,

    /// Sites to index
    pub sites: Vec<SiteConfig>,

    /// Database configuration
    pub database: DatabaseConfig,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// Search configuration
    pub search: SearchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Crawler-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// User agent string sent with every request
    pub user_agent: String,

    /// Referer header sent with every request
    pub referrer: String,

    /// Delay before each fetch in milliseconds
    pub politeness_delay_ms: u64,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Number of sites indexed concurrently; defaults to available parallelism
    pub workers: Option<usize>,
}

/// A site listed for indexing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Canonical site URL without trailing slash
    pub url: String,

    /// Display name
    pub name: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub bind_address: SocketAddr,

    /// Enable permissive CORS
    pub enable_cors: bool,
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Page size used when the caller does not pass a limit
    pub default_limit: usize,

    /// Maximum number of fragments per snippet
    pub snippet_fragments: usize,
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

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("SiteSearchBot/{}", env!("CARGO_PKG_VERSION")),
            referrer: String::from("https://www.google.com"),
            politeness_delay_ms: 150,
            request_timeout_secs: 30,
            workers: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("data/sitesearch.db"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            enable_cors: true,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 30,
            snippet_fragments: 3,
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
            crawler: CrawlerConfig::default(),
            sites: Vec::new(),
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl CrawlerConfig {
    /// Per-request timeout as a Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl LoggingConfig {
    const LEVELS: [&'static str; 5] = ["trace", "debug", "info", "warn", "error"];

    /// Default tracing filter: crate events at `level`, dependencies at warn
    ///
    /// `verbose` raises the crate to debug and dependencies to info.
    #[must_use]
    pub fn filter_directive(&self, verbose: bool) -> String {
        if verbose {
            String::from("sitesearch=debug,info")
        } else {
            format!("sitesearch={},warn", self.level.to_ascii_lowercase())
        }
    }

    /// Whether events are written as JSON lines
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env();
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    /// Apply `SITESEARCH_*` environment overrides
    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("SITESEARCH_USER_AGENT") {
            self.crawler.user_agent = v;
        }
        if let Ok(v) = std::env::var("SITESEARCH_REFERRER") {
            self.crawler.referrer = v;
        }
        if let Some(v) = env_parse::<u64>("SITESEARCH_POLITENESS_DELAY_MS") {
            self.crawler.politeness_delay_ms = v;
        }
        if let Some(v) = env_parse::<u64>("SITESEARCH_REQUEST_TIMEOUT") {
            self.crawler.request_timeout_secs = v;
        }
        if let Some(v) = env_parse::<usize>("SITESEARCH_WORKERS") {
            self.crawler.workers = Some(v);
        }
        if let Ok(v) = std::env::var("SITESEARCH_SQLITE_PATH") {
            self.database.sqlite_path = v.into();
        }
        if let Some(v) = env_parse::<SocketAddr>("SITESEARCH_BIND_ADDRESS") {
            self.server.bind_address = v;
        }
        if let Ok(v) = std::env::var("SITESEARCH_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("SITESEARCH_LOG_FORMAT") {
            self.logging.format = v;
        }
    }

    /// Strip trailing slashes from site URLs
    fn normalize(&mut self) {
        for site in &mut self.sites {
            let trimmed = site.url.trim().trim_end_matches('/').to_string();
            site.url = trimmed;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.sites.is_empty() {
            anyhow::bail!("at least one site must be configured");
        }

        let mut seen = std::collections::HashSet::new();
        for site in &self.sites {
            let parsed = Url::parse(&site.url)
                .with_context(|| format!("invalid site url: {}", site.url))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                anyhow::bail!("site url must be http or https: {}", site.url);
            }
            if !seen.insert(site.url.as_str()) {
                anyhow::bail!("duplicate site url: {}", site.url);
            }
        }

        if self.crawler.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.crawler.workers == Some(0) {
            anyhow::bail!("workers must be greater than 0");
        }

        if self.search.default_limit == 0 {
            anyhow::bail!("default_limit must be greater than 0");
        }

        if !LoggingConfig::LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            anyhow::bail!("unknown log level: {}", self.logging.level);
        }

        if !matches!(self.logging.format.to_ascii_lowercase().as_str(), "text" | "json") {
            anyhow::bail!("log format must be text or json: {}", self.logging.format);
        }

        Ok(())
    }

    /// Find a configured site by its URL, ignoring a trailing slash
    pub fn site(&self, url: &str) -> Option<&SiteConfig> {
        let url = url.trim().trim_end_matches('/');
        self.sites.iter().find(|s| s.url == url)
    }

    /// Get politeness delay as Duration
    #[must_use]
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.crawler.politeness_delay_ms)
    }

    /// Number of site pipelines allowed to run at once
    #[must_use]
    pub fn workers(&self) -> usize {
        self.crawler.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
