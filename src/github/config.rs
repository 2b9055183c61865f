use std::env;

/// Upstream GitHub API configuration
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// Default personal access token for increased rate limits
    pub token: Option<String>,

    /// Base URL of the REST API
    pub api_base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    pub user_agent: String,
}

impl GitHubConfig {
    /// Create a new GitHubConfig from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            token: env::var("GITHUB_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            api_base_url: env::var("GITHUB_API_URL").unwrap_or(defaults.api_base_url),
            timeout_secs: env::var("GITHUB_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            user_agent: defaults.user_agent,
        }
    }

    /// Base API URL without a trailing slash
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base_url: "https://api.github.com".to_string(),
            timeout_secs: 10,
            user_agent: format!("Repo-Finder/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
