//! Configuration management.
//!
//! Configuration is read from a TOML file and overridden by environment
//! variables prefixed with `PAPER_FEED_` (nested keys separated by `__`,
//! e.g. `PAPER_FEED_CACHE__TTL_SECONDS=60`).
//!
//! # Configuration File Format
//!
//! ```toml
//! [arxiv]
//! api_url = "https://export.arxiv.org/api/query"
//!
//! [trending]
//! api_url = "https://huggingface.co/api/daily_papers"
//! default_category = "cs.AI"
//!
//! [http]
//! user_agent = "paper-feed/0.1.0 (Research Paper Reader)"
//! timeout_secs = 30          # 0 disables the timeout
//! connect_timeout_secs = 10  # 0 disables the timeout
//!
//! [cache]
//! ttl_seconds = 300
//! # max_entries = 1000
//!
//! [feed]
//! default_category = "cs.AI"
//! page_size = 10
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::{DEFAULT_CATEGORY, DEFAULT_PAGE_SIZE};

/// Default arXiv API endpoint
pub const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";
/// Default HuggingFace daily papers endpoint
pub const TRENDING_API_URL: &str = "https://huggingface.co/api/daily_papers";

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "PAPER_FEED";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub arxiv: ArxivConfig,

    #[serde(default)]
    pub trending: TrendingConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// arXiv API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArxivConfig {
    #[serde(default = "default_arxiv_url")]
    pub api_url: String,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            api_url: default_arxiv_url(),
        }
    }
}

fn default_arxiv_url() -> String {
    ARXIV_API_URL.to_string()
}

/// Trending papers settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingConfig {
    #[serde(default = "default_trending_url")]
    pub api_url: String,

    /// Category assigned to trending papers, which upstream leaves unclassified
    #[serde(default = "default_category")]
    pub default_category: String,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            api_url: default_trending_url(),
            default_category: default_category(),
        }
    }
}

fn default_trending_url() -> String {
    TRENDING_API_URL.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Outbound HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout; 0 disables it
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connect timeout; 0 disables it
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_user_agent() -> String {
    concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION"),
        " (Research Paper Reader)"
    )
    .to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Result cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,

    /// Upper bound on cached queries; unbounded when unset
    #[serde(default)]
    pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            max_entries: None,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

fn default_ttl() -> u64 {
    300 // 5 minutes
}

/// Feed defaults used by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_category")]
    pub default_category: String,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_category: default_category(),
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `"json"` for structured output, plain text otherwise
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Write the configuration as TOML
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn env_overrides() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(env_overrides())
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Get the configuration from environment overrides and defaults only
pub fn get_config() -> Result<Config, ConfigError> {
    let settings = config::Config::builder()
        .add_source(env_overrides())
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Default location for a user-level config file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("paper-feed").join("config.toml"))
}

/// Find a config file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("paper-feed.toml");
    if local.is_file() {
        return Some(local);
    }

    default_config_path().filter(|path| path.is_file())
}
