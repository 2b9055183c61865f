#![allow(dead_code)]

use serde_json::{json, Value};

/// A search-API repository object with predictable fields
pub fn repo_json(id: u64) -> Value {
    json!({
        "id": id,
        "name": format!("repo{id}"),
        "full_name": format!("owner{id}/repo{id}"),
        "owner": { "login": format!("owner{id}"), "id": id },
        "html_url": format!("https://github.com/owner{id}/repo{id}"),
        "description": format!("Repository number {id}"),
        "homepage": "",
        "language": "Go",
        "topics": ["cli", "tools"],
        "stargazers_count": 500 + id,
        "forks_count": id,
        "open_issues_count": 3,
        "watchers_count": 500 + id,
        "archived": false,
        "fork": false,
        "license": { "key": "mit", "name": "MIT License", "spdx_id": "MIT" },
        "created_at": "2020-01-01T00:00:00Z",
        "updated_at": "2024-06-01T00:00:00Z",
        "pushed_at": "2024-06-01T00:00:00Z"
    })
}

/// Body of one `/search/repositories` page holding ids `first..first + count`
pub fn search_page_body(total_count: u64, first: u64, count: u64) -> String {
    let items: Vec<Value> = (first..first + count).map(repo_json).collect();
    json!({
        "total_count": total_count,
        "incomplete_results": false,
        "items": items
    })
    .to_string()
}
