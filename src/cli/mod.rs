pub mod commands;

use crate::config::presets::PresetConfig;
use crate::search::{FilterConfig, SortBy};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "repo-finder")]
#[command(about = "Repo Finder - random GitHub repositories with advanced filtering", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Fetch a random sample of repositories from GitHub
    Search(SearchArgs),

    /// List the search presets
    Presets,

    /// List the named time periods accepted by --since
    Periods,
}

/// Page size used when neither `--num-repos` nor a preset sets one
pub const DEFAULT_NUM_REPOS: u32 = 5;

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Start from a preset's filters (see `repo-finder presets`)
    #[arg(long)]
    pub preset: Option<String>,

    /// Programming language filter (e.g. python, javascript, go)
    #[arg(long)]
    pub language: Option<String>,

    /// Comma-separated topics, all of which must match
    #[arg(long, value_delimiter = ',')]
    pub topics: Vec<String>,

    /// Minimum number of stars
    #[arg(long)]
    pub min_stars: Option<i64>,

    /// Maximum number of stars
    #[arg(long)]
    pub max_stars: Option<i64>,

    /// Last push since a period (1week .. 5years) or a YYYY-MM-DD date
    #[arg(long)]
    pub since: Option<String>,

    /// Number of repositories to retrieve [default: 5, or the preset's]
    #[arg(short, long)]
    pub num_repos: Option<u32>,

    /// Output page to fetch; reuse --seed to continue a previous search
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Sampling seed (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Total count printed by an earlier page of the same seed
    #[arg(long, requires = "seed")]
    pub total_count: Option<u64>,

    /// Exclude archived repositories
    #[arg(long)]
    pub exclude_archived: bool,

    /// Exclude forked repositories
    #[arg(long)]
    pub exclude_forks: bool,

    /// Sort repositories by [default: stars, or the preset's]
    #[arg(long, value_enum)]
    pub sort_by: Option<SortBy>,

    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Export the results to a .json or .csv file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl SearchArgs {
    /// Filters from the command line, layered over `preset` when given
    pub fn to_filter(&self, preset: Option<&PresetConfig>) -> FilterConfig {
        let mut filter = match preset {
            Some(preset) => preset.to_filter(DEFAULT_NUM_REPOS),
            None => FilterConfig {
                page_size: DEFAULT_NUM_REPOS,
                ..FilterConfig::default()
            },
        };

        if self.language.is_some() {
            filter.language = self.language.clone();
        }
        if !self.topics.is_empty() {
            filter.topics = self.topics.clone();
        }
        if self.min_stars.is_some() {
            filter.min_stars = self.min_stars;
        }
        if self.max_stars.is_some() {
            filter.max_stars = self.max_stars;
        }
        if self.since.is_some() {
            filter.since = self.since.clone();
        }
        filter.exclude_archived |= self.exclude_archived;
        filter.exclude_forks |= self.exclude_forks;
        if let Some(sort_by) = self.sort_by {
            filter.sort_by = sort_by;
        }
        if let Some(num_repos) = self.num_repos {
            filter.page_size = num_repos;
        }

        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_args() {
        let cli = Cli::try_parse_from([
            "repo-finder",
            "search",
            "--language",
            "rust",
            "--topics",
            "cli,terminal",
            "--min-stars",
            "100",
            "--sort-by",
            "forks",
            "--exclude-forks",
        ])
        .unwrap();

        let Commands::Search(args) = cli.command else {
            panic!("expected search command");
        };
        let filter = args.to_filter(None);
        assert_eq!(filter.topics, vec!["cli", "terminal"]);
        assert_eq!(filter.sort_by, SortBy::Forks);
        assert_eq!(filter.page_size, 5);
        assert!(filter.exclude_forks);
        assert!(!filter.exclude_archived);
    }

    fn search_args(argv: &[&str]) -> SearchArgs {
        let cli = Cli::try_parse_from(["repo-finder", "search"].iter().chain(argv)).unwrap();
        let Commands::Search(args) = cli.command else {
            panic!("expected search command");
        };
        args
    }

    #[test]
    fn test_preset_is_base_for_flags() {
        let preset = PresetConfig {
            language: Some("rust".to_string()),
            min_stars: Some(500),
            since: Some("6months".to_string()),
            exclude_archived: true,
            num_repos: Some(10),
            ..Default::default()
        };

        let filter = search_args(&["--preset", "rust-projects"]).to_filter(Some(&preset));
        assert_eq!(filter.language.as_deref(), Some("rust"));
        assert_eq!(filter.min_stars, Some(500));
        assert_eq!(filter.page_size, 10);
        assert!(filter.exclude_archived);

        let filter = search_args(&["--preset", "rust-projects", "--min-stars", "50", "-n", "3"])
            .to_filter(Some(&preset));
        assert_eq!(filter.min_stars, Some(50));
        assert_eq!(filter.page_size, 3);
        assert_eq!(filter.since.as_deref(), Some("6months"));
    }

    #[test]
    fn test_total_count_requires_seed() {
        let result =
            Cli::try_parse_from(["repo-finder", "search", "--language", "go", "--total-count", "9"]);
        assert!(result.is_err());

        let args = search_args(&["--language", "go", "--seed", "4", "--total-count", "9"]);
        assert_eq!(args.total_count, Some(9));
    }
}
