//! Configuration management for castdrop
//!
//! Handles loading and validation of application configuration from TOML files.

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

/// Cast search (crawl) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Cast search endpoint URL
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    /// Results requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Delay between successful page requests (ms)
    #[serde(default = "default_page_interval_ms")]
    pub page_interval_ms: u64,
    /// Delay after a rate-limited (HTTP 429) response (ms)
    #[serde(default = "default_rate_limit_backoff_ms")]
    pub rate_limit_backoff_ms: u64,
    /// Delay after a transient page failure (ms)
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,
    /// Consecutive page failures tolerated before the crawl aborts
    #[serde(default = "default_max_consecutive_errors")]
    pub max_consecutive_errors: u32,
    /// Crawl progress is checkpointed to the cache every N pages
    #[serde(default = "default_checkpoint_pages")]
    pub checkpoint_pages: u32,
}

fn default_search_endpoint() -> String {
    "https://api.neynar.com/v2/farcaster/cast/search".to_string()
}

const fn default_page_size() -> u32 {
    100
}

const fn default_page_interval_ms() -> u64 {
    1000
}

const fn default_rate_limit_backoff_ms() -> u64 {
    10_000
}

const fn default_error_backoff_ms() -> u64 {
    3000
}

const fn default_max_consecutive_errors() -> u32 {
    3
}

const fn default_checkpoint_pages() -> u32 {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            page_size: default_page_size(),
            page_interval_ms: default_page_interval_ms(),
            rate_limit_backoff_ms: default_rate_limit_backoff_ms(),
            error_backoff_ms: default_error_backoff_ms(),
            max_consecutive_errors: default_max_consecutive_errors(),
            checkpoint_pages: default_checkpoint_pages(),
        }
    }
}

/// What an exhausted on-chain check resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExhaustedFallback {
    /// Treat the address as not holding the token (over-include in the airdrop)
    #[default]
    Eligible,
    /// Treat the address as holding the token (exclude from the airdrop)
    Holder,
}

/// On-chain balance check configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// RPC endpoint pool for the Base chain, rotated on failure
    #[serde(default = "default_rpc_urls")]
    pub rpc_urls: Vec<String>,
    /// Each endpoint is tried roughly this many times before giving up
    #[serde(default = "default_attempts_per_endpoint")]
    pub attempts_per_endpoint: u32,
    /// First retry backoff (ms), doubled on every attempt
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
    /// Retry backoff ceiling (ms)
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Delay after each fresh (uncached) balance check (ms)
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
    /// Balance cache is persisted every N users
    #[serde(default = "default_checkpoint_users")]
    pub checkpoint_users: usize,
    /// Verdict when every endpoint fails up to the retry ceiling
    #[serde(default)]
    pub exhausted_fallback: ExhaustedFallback,
}

fn default_rpc_urls() -> Vec<String> {
    // Base chain RPC URLs - multiple public providers for reliability
    [
        "https://base.llamarpc.com",
        "https://mainnet.base.org",
        "https://base.meowrpc.com",
        "https://base-mainnet.public.blastapi.io",
        "https://base.gateway.tenderly.co",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

const fn default_attempts_per_endpoint() -> u32 {
    2
}

const fn default_base_backoff_ms() -> u64 {
    500
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

const fn default_check_interval_ms() -> u64 {
    1000
}

const fn default_checkpoint_users() -> usize {
    25
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_urls: default_rpc_urls(),
            attempts_per_endpoint: default_attempts_per_endpoint(),
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            check_interval_ms: default_check_interval_ms(),
            checkpoint_users: default_checkpoint_users(),
            exhausted_fallback: ExhaustedFallback::Eligible,
        }
    }
}

/// Local cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding crawl and balance cache files
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

fn default_cache_dir() -> String {
    ".cache".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// - File I/O errors (file not found, permission denied)
    /// - TOML parsing errors (invalid syntax, type mismatches)
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(crate::CastdropError::Io)?;
        let config: Self = toml::from_str(&content).map_err(crate::CastdropError::TomlParsing)?;
        Ok(config)
    }

    /// Load configuration from the default config file path
    ///
    /// Tries `config.toml`, then `config.example.toml`, then built-in
    /// defaults so the tool works out of the box.
    ///
    /// # Errors
    /// Returns an error if a config file exists but cannot be parsed
    pub fn load() -> crate::Result<Self> {
        let config = if Path::new("config.toml").exists() {
            Self::from_file("config.toml")?
        } else if Path::new("config.example.toml").exists() {
            Self::from_file("config.example.toml")?
        } else {
            tracing::debug!("No config file found, using built-in defaults");
            Self::default()
        };

        if config.chain.rpc_urls.is_empty() {
            return Err(crate::CastdropError::Config(
                "chain.rpc_urls must list at least one RPC endpoint".to_string(),
            ));
        }

        Ok(config)
    }

    /// Get the search endpoint URL
    #[must_use]
    pub fn search_endpoint(&self) -> &str {
        &self.search.endpoint
    }

    /// Get the search page size
    #[must_use]
    pub const fn search_page_size(&self) -> u32 {
        self.search.page_size
    }

    /// Get the RPC endpoint pool
    #[must_use]
    pub fn rpc_urls(&self) -> &[String] {
        &self.chain.rpc_urls
    }

    /// Get the cache directory
    #[must_use]
    pub fn cache_dir(&self) -> &str {
        &self.cache.dir
    }

    /// Get the configured log level
    #[must_use]
    pub fn log_level(&self) -> &str {
        &self.logging.level
    }
}
