use chrono::NaiveDate;
use repo_finder::search::{FilterConfig, SortBy};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_full_query_token_order() {
    let filter = FilterConfig {
        language: Some("go".to_string()),
        topics: vec!["cli".to_string(), "terminal".to_string()],
        min_stars: Some(500),
        max_stars: Some(5000),
        since: Some("6months".to_string()),
        exclude_archived: true,
        exclude_forks: true,
        sort_by: SortBy::Updated,
        page_size: 10,
    };

    assert_eq!(
        filter.build_query_on(day("2024-07-01")),
        "language:go topic:cli topic:terminal stars:500..5000 pushed:>=2024-01-03 archived:false fork:false"
    );
}

#[test]
fn test_star_bound_variants() {
    let mut filter = FilterConfig {
        min_stars: Some(100),
        ..Default::default()
    };
    assert_eq!(filter.build_query(), "stars:>=100");

    filter.min_stars = None;
    filter.max_stars = Some(50);
    assert_eq!(filter.build_query(), "stars:<=50");

    filter.min_stars = Some(0);
    assert_eq!(filter.build_query(), "stars:0..50");
}

#[test]
fn test_blank_topics_are_dropped() {
    let filter = FilterConfig {
        topics: vec!["  ai ".to_string(), "".to_string(), "ml".to_string()],
        ..Default::default()
    };
    assert_eq!(filter.build_query(), "topic:ai topic:ml");
}

#[test]
fn test_exact_date_passes_through() {
    let filter = FilterConfig {
        since: Some("2023-03-15".to_string()),
        ..Default::default()
    };
    assert_eq!(filter.build_query(), "pushed:>=2023-03-15");
}

#[test]
fn test_named_periods_resolve_against_today() {
    let today = day("2024-03-01");
    let cases = [
        ("1week", "2024-02-23"),
        ("2weeks", "2024-02-16"),
        ("1month", "2024-01-31"),
        ("1year", "2023-03-02"),
    ];

    for (period, expected) in cases {
        let filter = FilterConfig {
            since: Some(period.to_string()),
            ..Default::default()
        };
        assert_eq!(
            filter.build_query_on(today),
            format!("pushed:>={expected}"),
            "{period}"
        );
    }
}

#[test]
fn test_same_day_queries_are_identical() {
    let filter = FilterConfig {
        language: Some("python".to_string()),
        since: Some("6months".to_string()),
        ..Default::default()
    };
    let today = day("2024-11-20");
    assert_eq!(filter.build_query_on(today), filter.build_query_on(today));
}

#[test]
fn test_empty_filter_builds_empty_query() {
    assert_eq!(FilterConfig::default().build_query(), "");
}

#[test]
fn test_validate_page_size_bounds() {
    let mut filter = FilterConfig::default();
    for size in [1, 50, 100] {
        filter.page_size = size;
        assert!(filter.validate(100).is_ok(), "{size}");
    }
    for size in [0, 101] {
        filter.page_size = size;
        assert!(filter.validate(100).is_err(), "{size}");
    }
}

#[test]
fn test_validate_rejects_malformed_dates() {
    for since in ["2024/01/01", "last-week", "2024-13-01"] {
        let filter = FilterConfig {
            since: Some(since.to_string()),
            ..Default::default()
        };
        assert!(filter.validate(100).is_err(), "{since}");
    }
}
