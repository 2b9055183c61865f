use crate::github::{
    config::GitHubConfig,
    models::{ErrorBody, Repository, SearchResponse},
    rate_limiter::{RateLimitState, RateLimiter},
};
use crate::search::{SearchQuery, UpstreamPage, UpstreamSearch};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use tracing::{debug, error};

const RATE_LIMIT_MESSAGE: &str = "GitHub API rate limit exceeded. Consider using a GitHub token.";

/// GitHub search API client
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    config: GitHubConfig,
    token: Option<String>,
    rate_limiter: RateLimiter,
}

impl GitHubClient {
    /// Create a new GitHub client using the configured default token
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&config.user_agent)
                .map_err(|e| Error::Config(format!("Invalid user agent: {e}")))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token: config.token.clone(),
            config,
            rate_limiter: RateLimiter::new(),
        })
    }

    /// Same client authenticated with a caller-supplied token.
    ///
    /// The returned client tracks its own rate-limit budget.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            config: self.config.clone(),
            token: Some(token.into()),
            rate_limiter: RateLimiter::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Search repositories, returning one upstream page in GitHub's order
    pub async fn search_repositories(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u32,
    ) -> Result<SearchResponse> {
        if let Some(wait_secs) = self.rate_limiter.exhausted_for().await {
            return Err(Error::RateLimited(format!(
                "{RATE_LIMIT_MESSAGE} Resets in {wait_secs}s."
            )));
        }

        let url = format!("{}/search/repositories", self.config.api_base_url());
        debug!(
            "GitHub API request: GET {} q={:?} sort={} page={} per_page={}",
            url, query.q, query.sort, page, per_page
        );

        let page = page.to_string();
        let per_page = per_page.to_string();
        let mut request = self.client.get(&url).query(&[
            ("q", query.q.as_str()),
            ("sort", query.sort.as_str()),
            ("order", query.order()),
            ("per_page", per_page.as_str()),
            ("page", page.as_str()),
        ]);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        self.rate_limiter
            .update_from_headers(response.headers())
            .await;

        let status = response.status();

        if !status.is_success() {
            let budget_exhausted = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                == Some("0");
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.full_message())
                .unwrap_or_else(|_| format!("GitHub API error: {status}"));
            error!("GitHub API error: {} - {}", status, message);

            return Err(error_for_status(status, budget_exhausted, message));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Upstream {
            status: status.as_u16(),
            message: format!("Failed to parse GitHub API response: {e}"),
        })
    }

    /// Last rate-limit budget reported by GitHub for this client
    pub async fn get_rate_limit_status(&self) -> Option<RateLimitState> {
        self.rate_limiter.get_status().await
    }
}

fn error_for_status(status: StatusCode, budget_exhausted: bool, message: String) -> Error {
    match status {
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
            if budget_exhausted || message.to_lowercase().contains("rate limit") =>
        {
            Error::RateLimited(RATE_LIMIT_MESSAGE.to_string())
        }
        StatusCode::UNPROCESSABLE_ENTITY => Error::InvalidQuery(message),
        StatusCode::UNAUTHORIZED => Error::Upstream {
            status: status.as_u16(),
            message: format!("GitHub authentication failed: {message}"),
        },
        _ => Error::Upstream {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl UpstreamSearch for GitHubClient {
    type Item = Repository;

    async fn fetch_page(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u32,
    ) -> Result<UpstreamPage<Repository>> {
        let response = self.search_repositories(query, page, per_page).await?;
        if response.incomplete_results {
            debug!("GitHub reported incomplete results for page {}", page);
        }

        Ok(UpstreamPage {
            total_count: response.total_count,
            items: response.items,
        })
    }
}
