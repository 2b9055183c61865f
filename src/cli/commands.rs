use crate::cli::SearchArgs;
use crate::config::{
    presets::{PresetCatalog, PresetConfig},
    Settings,
};
use crate::export::{self, RepositoryRecord};
use crate::github::GitHubClient;
use crate::search::{generate_seed, SamplingPaginator, TIME_PERIODS};
use crate::{Error, Result};
use chrono::Local;
use std::path::Path;
use tracing::info;

/// Run one sampled search directly against GitHub and print the results
pub async fn search(settings: &Settings, args: SearchArgs) -> Result<()> {
    let preset = match args.preset.as_deref() {
        Some(id) => Some(find_preset(settings, id)?),
        None => None,
    };

    let filter = args.to_filter(preset.as_ref());
    if let (Some(min), Some(max)) = (filter.min_stars, filter.max_stars) {
        if min > max {
            return Err(Error::Validation(
                "min-stars cannot be greater than max-stars".to_string(),
            ));
        }
    }
    filter.validate(settings.search.max_page_size)?;

    let query = filter.to_search_query();
    if query.q.is_empty() {
        return Err(Error::Validation(
            "At least one filter must be specified".to_string(),
        ));
    }

    let mut client = GitHubClient::new(settings.github.clone())?;
    if let Some(token) = args.github_token.as_deref().filter(|t| !t.is_empty()) {
        client = client.with_token(token);
    }

    let paginator = SamplingPaginator::new(
        settings.search.result_cap,
        settings.search.upstream_page_size,
    );
    let seed = args.seed.unwrap_or_else(generate_seed);

    println!("Searching GitHub with query: {}", query.q);
    println!("Fetching {} random repositories...", filter.page_size);

    let sampled = paginator
        .sample_page_with_total(
            &client,
            &query,
            seed,
            args.page,
            filter.page_size,
            args.seed.and(args.total_count),
        )
        .await?;

    let records: Vec<RepositoryRecord> = sampled
        .items
        .into_iter()
        .map(RepositoryRecord::from)
        .collect();

    if records.is_empty() {
        println!("\nNo repositories found matching your criteria.");
        return Ok(());
    }

    for (index, record) in records.iter().enumerate() {
        print_repository(record, index + 1);
    }

    println!(
        "\n✓ Retrieved {} repositories ({} total matches)",
        records.len(),
        sampled.total_count
    );
    if sampled.has_more {
        println!(
            "  Next page: --seed {} --page {} --total-count {}",
            sampled.seed,
            sampled.page + 1,
            sampled.total_count
        );
    }

    if let Some(output) = args.output {
        write_export(&output, &records).await?;
        println!("✓ Exported to {}", output.display());
    }

    Ok(())
}

fn find_preset(settings: &Settings, id: &str) -> Result<PresetConfig> {
    let catalog = PresetCatalog::load(settings.presets_path.as_deref())?;
    catalog
        .get(id)
        .map(|preset| preset.config.clone())
        .ok_or_else(|| {
            Error::NotFound(format!(
                "Unknown preset '{id}'. Run `repo-finder presets` to list them"
            ))
        })
}

/// Write records to `path`, choosing the format from its extension
pub async fn write_export(path: &Path, records: &[RepositoryRecord]) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    let content = match extension.as_deref() {
        Some("json") => export::to_json_document(records, Local::now())?,
        Some("csv") => export::to_csv(records)?,
        _ => {
            return Err(Error::Validation(format!(
                "Unsupported export format for {}. Use .json or .csv",
                path.display()
            )))
        }
    };

    tokio::fs::write(path, content).await?;
    info!("Exported {} repositories to {}", records.len(), path.display());
    Ok(())
}

/// Print the preset catalog
pub fn list_presets(catalog: &PresetCatalog, default_page_size: u32) {
    println!("{:<16} {:<28} Query", "ID", "Name");
    println!("{}", "-".repeat(90));

    for preset in &catalog.presets {
        let filter = preset.config.to_filter(default_page_size);
        println!(
            "{:<16} {:<28} {}",
            preset.id,
            truncate(&preset.name, 26),
            filter.build_query()
        );
    }
}

/// Print the named time periods
pub fn list_time_periods() {
    for (name, days) in TIME_PERIODS {
        println!("{name:<10} {days} days");
    }
    println!("\nOr use an exact date: YYYY-MM-DD");
}

fn print_repository(record: &RepositoryRecord, index: usize) {
    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("Repository #{index}");
    println!("{rule}");
    println!("Name:         {}", record.name);
    println!("Owner:        {}", record.owner);
    println!("Stars:        {}", record.stars);
    println!("Forks:        {}", record.forks);
    println!(
        "Language:     {}",
        record.language.as_deref().unwrap_or("N/A")
    );
    println!(
        "Last Push:    {}",
        record.pushed_at.as_deref().unwrap_or("N/A")
    );
    println!("Created:      {}", record.created_at);
    println!(
        "Archived:     {}",
        if record.archived { "Yes" } else { "No" }
    );

    if let Some(description) = record.description.as_deref().filter(|d| !d.is_empty()) {
        println!("Description:  {}", truncate(description, 100));
    }

    println!("URL:          {}", record.url);
    println!("{rule}");
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_find_preset() {
        let settings = Settings {
            server: crate::config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                api_rate_limit: 10,
                max_request_body_size: 10485760,
            },
            github: crate::github::GitHubConfig::default(),
            search: crate::config::SearchConfig::default(),
            presets_path: None,
        };

        let preset = find_preset(&settings, "go-backend").unwrap();
        assert_eq!(preset.language.as_deref(), Some("go"));

        let missing = find_preset(&settings, "no-such-preset");
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_write_export_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_export(&dir.path().join("out.txt"), &[]).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_write_export_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.CSV");
        let record = RepositoryRecord {
            name: "x".to_string(),
            full_name: "o/x".to_string(),
            ..Default::default()
        };

        write_export(&path, &[record]).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("name,full_name,owner"));
        assert!(content.contains("o/x"));
    }
}
