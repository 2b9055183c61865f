pub mod record;

pub use record::RepositoryRecord;

use crate::{Error, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

/// CSV columns, in output order
pub const CSV_COLUMNS: [&str; 15] = [
    "name",
    "full_name",
    "owner",
    "stars",
    "forks",
    "language",
    "description",
    "url",
    "topics",
    "created_at",
    "pushed_at",
    "archived",
    "open_issues",
    "watchers",
    "license",
];

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    exported_at: String,
    count: usize,
    repositories: &'a [RepositoryRecord],
}

/// Pretty-printed JSON document wrapping the records
pub fn to_json_document(records: &[RepositoryRecord], exported_at: DateTime<Local>) -> Result<String> {
    let document = ExportDocument {
        exported_at: exported_at.to_rfc3339(),
        count: records.len(),
        repositories: records,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// CSV with a header row. No records yields an empty document.
pub fn to_csv(records: &[RepositoryRecord]) -> Result<String> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_COLUMNS)?;

    for record in records {
        let stars = record.stars.to_string();
        let forks = record.forks.to_string();
        let topics = record.topics.join(", ");
        let open_issues = record.open_issues.to_string();
        let watchers = record.watchers.to_string();

        writer.write_record([
            record.name.as_str(),
            record.full_name.as_str(),
            record.owner.as_str(),
            stars.as_str(),
            forks.as_str(),
            record.language.as_deref().unwrap_or_default(),
            record.description.as_deref().unwrap_or_default(),
            record.url.as_str(),
            topics.as_str(),
            record.created_at.as_str(),
            record.pushed_at.as_deref().unwrap_or_default(),
            if record.archived { "true" } else { "false" },
            open_issues.as_str(),
            watchers.as_str(),
            record.license.as_deref().unwrap_or_default(),
        ])?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| Error::Internal(format!("Failed to flush CSV writer: {e}")))?;
    String::from_utf8(data).map_err(|e| Error::Internal(format!("CSV output is not UTF-8: {e}")))
}

/// Download filename such as `github_repos_20250101_120000.csv`
pub fn export_filename(extension: &str, at: DateTime<Local>) -> String {
    format!("github_repos_{}.{extension}", at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_csv_has_no_header() {
        assert_eq!(to_csv(&[]).unwrap(), "");
    }

    #[test]
    fn test_export_filename_format() {
        let at = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(export_filename("csv", at), "github_repos_20250102_030405.csv");
    }

    #[test]
    fn test_json_document_counts_records() {
        let records = vec![RepositoryRecord::default(), RepositoryRecord::default()];
        let json = to_json_document(&records, Local::now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["count"], 2);
        assert_eq!(value["repositories"].as_array().unwrap().len(), 2);
        assert!(value["exported_at"].is_string());
    }
}
