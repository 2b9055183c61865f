use crate::{Error, Result};
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named relative periods and their length in days, in display order
pub const TIME_PERIODS: &[(&str, i64)] = &[
    ("1week", 7),
    ("2weeks", 14),
    ("1month", 30),
    ("3months", 90),
    ("6months", 180),
    ("1year", 365),
    ("2years", 730),
    ("5years", 1825),
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Names of the supported relative periods
pub fn time_period_names() -> Vec<&'static str> {
    TIME_PERIODS.iter().map(|(name, _)| *name).collect()
}

/// Look up the day count of a named period (case-insensitive)
pub fn period_days(period: &str) -> Option<i64> {
    let period = period.to_lowercase();
    TIME_PERIODS
        .iter()
        .find(|(name, _)| *name == period)
        .map(|(_, days)| *days)
}

/// Resolve a `since` value relative to `today`.
///
/// Named periods become `today - days`; any other non-empty value is passed
/// through unchanged. Empty input means no constraint.
pub fn resolve_since(since: &str, today: NaiveDate) -> Option<String> {
    let since = since.trim();
    if since.is_empty() {
        return None;
    }

    match period_days(since) {
        Some(days) => Some((today - Duration::days(days)).format(DATE_FORMAT).to_string()),
        None => Some(since.to_string()),
    }
}

/// Check that `since` is either a named period or a `YYYY-MM-DD` date
pub fn validate_since(since: &str) -> Result<()> {
    let since = since.trim();
    if since.is_empty() || period_days(since).is_some() {
        return Ok(());
    }

    NaiveDate::parse_from_str(since, DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| {
            Error::Validation(format!(
                "Invalid date format '{since}'. Use YYYY-MM-DD or one of: {}",
                time_period_names().join(", ")
            ))
        })
}

/// Upstream sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Stars,
    Forks,
    Updated,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Stars => "stars",
            SortBy::Forks => "forks",
            SortBy::Updated => "updated",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "stars" => Ok(SortBy::Stars),
            "forks" => Ok(SortBy::Forks),
            "updated" => Ok(SortBy::Updated),
            other => Err(Error::Validation(format!(
                "Invalid sort_by '{other}'. Expected one of: stars, forks, updated"
            ))),
        }
    }
}

/// One search request's filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub min_stars: Option<i64>,
    pub max_stars: Option<i64>,
    pub since: Option<String>,
    pub exclude_archived: bool,
    pub exclude_forks: bool,
    pub sort_by: SortBy,
    pub page_size: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            language: None,
            topics: Vec::new(),
            min_stars: None,
            max_stars: None,
            since: None,
            exclude_archived: false,
            exclude_forks: false,
            sort_by: SortBy::Stars,
            page_size: 10,
        }
    }
}

impl FilterConfig {
    /// Topics trimmed, without empty entries or repeats, in first-seen order
    pub fn normalized_topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = Vec::with_capacity(self.topics.len());
        for topic in &self.topics {
            let topic = topic.trim();
            if !topic.is_empty() && !topics.iter().any(|t| t == topic) {
                topics.push(topic.to_string());
            }
        }
        topics
    }

    /// Check page size and date format. Star bounds are left to GitHub.
    pub fn validate(&self, max_page_size: u32) -> Result<()> {
        if self.page_size == 0 || self.page_size > max_page_size {
            return Err(Error::Validation(format!(
                "num_repos must be between 1 and {max_page_size}, got {}",
                self.page_size
            )));
        }

        if let Some(since) = &self.since {
            validate_since(since)?;
        }

        Ok(())
    }

    /// Render the query string using today's local date
    pub fn build_query(&self) -> String {
        self.build_query_on(Local::now().date_naive())
    }

    /// Render the query string with `since` resolved against `today`
    pub fn build_query_on(&self, today: NaiveDate) -> String {
        let mut parts = Vec::new();

        if let Some(language) = self.language.as_deref().map(str::trim) {
            if !language.is_empty() {
                parts.push(format!("language:{language}"));
            }
        }

        for topic in self.normalized_topics() {
            parts.push(format!("topic:{topic}"));
        }

        match (self.min_stars, self.max_stars) {
            (Some(min), Some(max)) => parts.push(format!("stars:{min}..{max}")),
            (Some(min), None) => parts.push(format!("stars:>={min}")),
            (None, Some(max)) => parts.push(format!("stars:<={max}")),
            (None, None) => {}
        }

        if let Some(date) = self
            .since
            .as_deref()
            .and_then(|since| resolve_since(since, today))
        {
            parts.push(format!("pushed:>={date}"));
        }

        if self.exclude_archived {
            parts.push("archived:false".to_string());
        }

        if self.exclude_forks {
            parts.push("fork:false".to_string());
        }

        parts.join(" ")
    }

    /// Query string plus sort parameters, ready for the upstream
    pub fn to_search_query(&self) -> SearchQuery {
        SearchQuery {
            q: self.build_query(),
            sort: self.sort_by,
        }
    }
}

/// A rendered upstream query. Results are always requested in descending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub q: String,
    pub sort: SortBy,
}

impl SearchQuery {
    pub fn order(&self) -> &'static str {
        "desc"
    }
}
