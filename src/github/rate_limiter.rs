use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Tracks the search rate-limit budget reported by GitHub.
///
/// Nothing is known until the first response arrives. Once the budget hits
/// zero, calls fail fast until the reported reset time has passed.
#[derive(Clone, Default)]
pub struct RateLimiter {
    state: Arc<RwLock<Option<RateLimitState>>>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RateLimitState {
    /// Total rate limit
    pub limit: u32,

    /// Remaining requests
    pub remaining: u32,

    /// Unix timestamp when rate limit resets
    pub reset_at: i64,
}

impl RateLimitState {
    pub fn reset_time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.reset_at, 0).unwrap_or_else(Utc::now)
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update rate limit from GitHub API response headers
    pub async fn update_from_headers(&self, headers: &reqwest::header::HeaderMap) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<i64>().ok())
        };

        let (Some(limit), Some(remaining), Some(reset_at)) = (
            header("x-ratelimit-limit"),
            header("x-ratelimit-remaining"),
            header("x-ratelimit-reset"),
        ) else {
            return;
        };

        let update = RateLimitState {
            limit: u32::try_from(limit).unwrap_or(0),
            remaining: u32::try_from(remaining).unwrap_or(0),
            reset_at,
        };

        debug!(
            "Rate limit updated: {}/{} (resets at {})",
            update.remaining, update.limit, update.reset_at
        );

        // Use the minimum of 5 requests or 10% of limit as the warning threshold
        let threshold = std::cmp::min(5, update.limit / 10);
        if update.remaining <= threshold {
            warn!(
                "GitHub search rate limit low: {}/{} remaining until {}",
                update.remaining,
                update.limit,
                update.reset_time()
            );
        }

        *self.state.write().await = Some(update);
    }

    /// Seconds until the budget resets, if it is exhausted right now
    pub async fn exhausted_for(&self) -> Option<i64> {
        let state = (*self.state.read().await)?;
        let now = Utc::now().timestamp();

        (state.remaining == 0 && now < state.reset_at).then(|| state.reset_at - now)
    }

    /// Get current rate limit status
    pub async fn get_status(&self) -> Option<RateLimitState> {
        *self.state.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    fn headers(limit: &str, remaining: &str, reset: i64) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert("x-ratelimit-limit", HeaderValue::from_str(limit).unwrap());
        map.insert("x-ratelimit-remaining", HeaderValue::from_str(remaining).unwrap());
        map.insert(
            "x-ratelimit-reset",
            HeaderValue::from_str(&reset.to_string()).unwrap(),
        );
        map
    }

    #[tokio::test]
    async fn test_unknown_until_first_response() {
        let limiter = RateLimiter::new();
        assert!(limiter.get_status().await.is_none());
        assert!(limiter.exhausted_for().await.is_none());
    }

    #[tokio::test]
    async fn test_exhausted_budget_blocks_until_reset() {
        let limiter = RateLimiter::new();
        let reset = Utc::now().timestamp() + 30;
        limiter.update_from_headers(&headers("10", "0", reset)).await;

        let wait = limiter.exhausted_for().await.unwrap();
        assert!(wait > 0 && wait <= 30);
    }

    #[tokio::test]
    async fn test_past_reset_is_not_exhausted() {
        let limiter = RateLimiter::new();
        let reset = Utc::now().timestamp() - 1;
        limiter.update_from_headers(&headers("10", "0", reset)).await;
        assert!(limiter.exhausted_for().await.is_none());
    }

    #[tokio::test]
    async fn test_partial_headers_ignored() {
        let limiter = RateLimiter::new();
        let mut map = HeaderMap::new();
        map.insert("x-ratelimit-remaining", HeaderValue::from_static("3"));
        limiter.update_from_headers(&map).await;
        assert!(limiter.get_status().await.is_none());
    }
}
