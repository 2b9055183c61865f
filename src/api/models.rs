use crate::config::presets::Preset;
use crate::export::RepositoryRecord;
use crate::github::rate_limiter::RateLimitState;
use crate::search::{FilterConfig, SortBy};
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize optional string, treating empty strings as None
fn deserialize_optional_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Ok(Some(s.to_string())),
    }
}

/// Topics arrive either as a list or as one comma-separated string
fn deserialize_topics<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Topics {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Option::<Topics>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Topics::List(list)) => list,
        Some(Topics::Joined(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

/// POST /api/search body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "deserialize_topics")]
    pub topics: Vec<String>,
    #[serde(default)]
    pub min_stars: Option<i64>,
    #[serde(default)]
    pub max_stars: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub since: Option<String>,
    #[serde(default)]
    pub exclude_archived: Option<bool>,
    #[serde(default)]
    pub exclude_forks: Option<bool>,
    #[serde(default)]
    pub sort_by: Option<SortBy>,
    #[serde(default)]
    pub num_repos: Option<u32>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub seed: Option<u64>,
    /// `total_count` from an earlier page of the same search
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub github_token: Option<String>,
}

impl SearchRequest {
    pub fn to_filter(&self, default_page_size: u32) -> FilterConfig {
        FilterConfig {
            language: self.language.clone(),
            topics: self.topics.clone(),
            min_stars: self.min_stars,
            max_stars: self.max_stars,
            since: self.since.clone(),
            exclude_archived: self.exclude_archived.unwrap_or(false),
            exclude_forks: self.exclude_forks.unwrap_or(false),
            sort_by: self.sort_by.unwrap_or_default(),
            page_size: self.num_repos.unwrap_or(default_page_size),
        }
    }
}

/// POST /api/search response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub total_count: u64,
    pub returned_count: usize,
    pub repositories: Vec<RepositoryRecord>,
    pub seed: u64,
    pub page: u32,
    pub has_more: bool,
}

/// Body of both export endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub repositories: Vec<RepositoryRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresetsResponse {
    pub success: bool,
    pub presets: Vec<Preset>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimePeriodsResponse {
    pub success: bool,
    pub time_periods: Vec<&'static str>,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub rate_limit: Option<RateLimitState>,
}

/// GET / response
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics_accept_comma_string() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"topics": "ai, ml,,  rust "}"#).unwrap();
        assert_eq!(request.topics, vec!["ai", "ml", "rust"]);
    }

    #[test]
    fn test_topics_accept_list_and_null() {
        let request: SearchRequest = serde_json::from_str(r#"{"topics": ["a", "b"]}"#).unwrap();
        assert_eq!(request.topics, vec!["a", "b"]);

        let request: SearchRequest = serde_json::from_str(r#"{"topics": null}"#).unwrap();
        assert!(request.topics.is_empty());
    }

    #[test]
    fn test_empty_strings_become_none() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"language": "", "since": " ", "github_token": ""}"#).unwrap();
        assert!(request.language.is_none());
        assert!(request.since.is_none());
        assert!(request.github_token.is_none());
    }

    #[test]
    fn test_filter_defaults() {
        let request: SearchRequest = serde_json::from_str(r#"{"language": "go"}"#).unwrap();
        let filter = request.to_filter(10);
        assert_eq!(filter.page_size, 10);
        assert_eq!(filter.sort_by, SortBy::Stars);
        assert!(!filter.exclude_archived);
    }

    #[test]
    fn test_unknown_sort_rejected() {
        let result = serde_json::from_str::<SearchRequest>(r#"{"sort_by": "relevance"}"#);
        assert!(result.is_err());
    }
}
