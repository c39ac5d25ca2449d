//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Text preprocessing settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Report output settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for a network crawl.
    ///
    /// Must pass before any request is issued.
    pub fn validate(&self) -> Result<()> {
        let crawler = &self.crawler;

        if crawler.seed_url.trim().is_empty() {
            return Err(AppError::config("crawler.seed_url is empty"));
        }
        let seed = url::Url::parse(crawler.seed_url.trim())
            .map_err(|e| AppError::config(format!("crawler.seed_url is invalid: {e}")))?;
        if !matches!(seed.scheme(), "http" | "https") {
            return Err(AppError::config(format!(
                "crawler.seed_url must be http or https, got '{}'",
                seed.scheme()
            )));
        }

        if crawler.allowed_domains.iter().all(|d| d.trim().is_empty()) {
            return Err(AppError::config(
                "crawler.allowed_domains is empty; refusing an unrestricted crawl",
            ));
        }
        if crawler.max_depth == 0 {
            return Err(AppError::config("crawler.max_depth must be > 0"));
        }
        if crawler.max_concurrent == 0 {
            return Err(AppError::config("crawler.max_concurrent must be > 0"));
        }
        if crawler.timeout_secs == 0 {
            return Err(AppError::config("crawler.timeout_secs must be > 0"));
        }
        if crawler.user_agent.trim().is_empty() {
            return Err(AppError::config("crawler.user_agent is empty"));
        }
        crawler.compile_exclude_patterns()?;

        self.output.validate()
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// First page of the crawl
    #[serde(default)]
    pub seed_url: String,

    /// Hosts the crawl may visit (exact host match)
    #[serde(default)]
    pub allowed_domains: Vec<String>,

    /// Maximum link depth; the seed page is depth 1
    #[serde(default = "defaults::max_depth")]
    pub max_depth: usize,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay after each completed request in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,

    /// Maximum concurrent requests
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// URL regexes that are never visited
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl CrawlerConfig {
    /// Compile `exclude_patterns` into regexes.
    pub fn compile_exclude_patterns(&self) -> Result<Vec<Regex>> {
        self.exclude_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    AppError::config(format!("crawler.exclude_patterns '{p}' is invalid: {e}"))
                })
            })
            .collect()
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: String::new(),
            allowed_domains: Vec::new(),
            max_depth: defaults::max_depth(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: 0,
            max_concurrent: defaults::max_concurrent(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// Text cleaning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Literal phrases removed from page text before filtering
    #[serde(default = "defaults::stop_words")]
    pub stop_words: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            stop_words: defaults::stop_words(),
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Report file path
    #[serde(default = "defaults::output_path")]
    pub path: PathBuf,

    /// Write to a temp file and rename on success
    #[serde(default = "defaults::atomic")]
    pub atomic: bool,
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(AppError::config("output.path is empty"));
        }
        if self.path.is_dir() {
            return Err(AppError::config(format!(
                "output.path {} is a directory",
                self.path.display()
            )));
        }
        Ok(())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: defaults::output_path(),
            atomic: defaults::atomic(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Crawler defaults
    pub fn max_depth() -> usize {
        2
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; mojiset/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        5
    }

    // Extraction defaults
    pub fn stop_words() -> Vec<String> {
        [
            "メニュー",
            "検索",
            "ログイン",
            "コピーライト",
            "利用規約",
            "プライバシーポリシー",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    // Output defaults
    pub fn output_path() -> PathBuf {
        PathBuf::from("output.txt")
    }
    pub fn atomic() -> bool {
        true
    }
}
