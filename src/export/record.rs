use crate::github::models::Repository;
use serde::{Deserialize, Serialize};

/// Flattened repository as shown to clients and written by the exporters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryRecord {
    pub name: String,
    pub full_name: String,
    pub owner: String,
    pub stars: u64,
    pub forks: u64,
    pub language: Option<String>,
    pub description: Option<String>,
    pub url: String,
    pub homepage: Option<String>,
    pub topics: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    pub pushed_at: Option<String>,
    pub archived: bool,
    pub open_issues: u64,
    pub watchers: u64,
    pub license: Option<String>,
}

impl From<Repository> for RepositoryRecord {
    fn from(repo: Repository) -> Self {
        Self {
            name: repo.name,
            full_name: repo.full_name,
            owner: repo.owner.login,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            language: repo.language,
            description: repo.description,
            url: repo.html_url,
            homepage: repo.homepage.filter(|h| !h.is_empty()),
            topics: repo.topics,
            created_at: repo.created_at,
            updated_at: repo.updated_at,
            pushed_at: repo.pushed_at,
            archived: repo.archived,
            open_issues: repo.open_issues_count,
            watchers: repo.watchers_count,
            license: repo.license.map(|l| l.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_search_item() {
        let repo: Repository = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "ripgrep",
            "full_name": "BurntSushi/ripgrep",
            "owner": { "login": "BurntSushi", "id": 2 },
            "html_url": "https://github.com/BurntSushi/ripgrep",
            "description": "fast grep",
            "homepage": "",
            "language": "Rust",
            "topics": ["cli", "search"],
            "stargazers_count": 50000,
            "forks_count": 2000,
            "open_issues_count": 80,
            "watchers_count": 50000,
            "archived": false,
            "license": { "key": "unlicense", "name": "The Unlicense", "spdx_id": "Unlicense" },
            "created_at": "2016-03-11T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z",
            "pushed_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap();

        let record = RepositoryRecord::from(repo);
        assert_eq!(record.owner, "BurntSushi");
        assert_eq!(record.stars, 50000);
        assert_eq!(record.url, "https://github.com/BurntSushi/ripgrep");
        assert_eq!(record.homepage, None);
        assert_eq!(record.license.as_deref(), Some("The Unlicense"));
        assert_eq!(record.topics, vec!["cli", "search"]);
    }

    #[test]
    fn test_missing_fields_default() {
        let record: RepositoryRecord =
            serde_json::from_str(r#"{"name": "x", "full_name": "o/x"}"#).unwrap();
        assert_eq!(record.stars, 0);
        assert!(record.topics.is_empty());
        assert!(record.license.is_none());
    }
}
