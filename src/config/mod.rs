pub mod presets;

use crate::error::{Error, Result};
use crate::github::GitHubConfig;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub github: GitHubConfig,
    pub search: SearchConfig,
    pub presets_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_rate_limit: u64,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Matches reachable through the upstream search API
    pub result_cap: u64,
    pub upstream_page_size: u32,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_cap: 1000,
            upstream_page_size: 100,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: &str) -> Result<T> {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {name} value")))
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        Ok(Settings {
            server: ServerConfig {
                host,
                port: env_or("PORT", "5000")?,
                api_rate_limit: env_or("API_RATE_LIMIT", "10")?,
                max_request_body_size: env_or("MAX_REQUEST_BODY_SIZE", "10485760")?,
            },
            github: GitHubConfig::from_env(),
            search: SearchConfig {
                result_cap: env_or("SEARCH_RESULT_CAP", "1000")?,
                upstream_page_size: env_or("SEARCH_UPSTREAM_PAGE_SIZE", "100")?,
                default_page_size: env_or("SEARCH_DEFAULT_PAGE_SIZE", "10")?,
                max_page_size: env_or("SEARCH_MAX_PAGE_SIZE", "100")?,
            },
            presets_path: std::env::var("PRESETS_PATH").ok().map(PathBuf::from),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        if self.server.api_rate_limit == 0 {
            return Err(Error::Config("API rate limit must be non-zero".to_string()));
        }

        let base = Url::parse(&self.github.api_base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "GitHub API URL must use http or https: {}",
                self.github.api_base_url
            )));
        }

        if self.github.timeout_secs == 0 {
            return Err(Error::Config("GitHub timeout must be non-zero".to_string()));
        }

        let search = &self.search;
        if search.result_cap == 0 {
            return Err(Error::Config("Search result cap must be non-zero".to_string()));
        }

        if search.upstream_page_size == 0 || search.upstream_page_size > 100 {
            return Err(Error::Config(
                "Upstream page size must be between 1 and 100".to_string(),
            ));
        }

        // An output page may then straddle at most two upstream pages
        if search.max_page_size == 0 || search.max_page_size > search.upstream_page_size {
            return Err(Error::Config(format!(
                "Max page size must be between 1 and the upstream page size ({})",
                search.upstream_page_size
            )));
        }

        if search.default_page_size == 0 || search.default_page_size > search.max_page_size {
            return Err(Error::Config(format!(
                "Default page size must be between 1 and {}",
                search.max_page_size
            )));
        }

        Ok(())
    }
}
