use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    api::models::*,
    config::{presets::PresetCatalog, Settings},
    export::{self, RepositoryRecord},
    github::GitHubClient,
    search::{generate_seed, query::time_period_names, SamplingPaginator},
    Error, Result,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub github: GitHubClient,
    pub paginator: SamplingPaginator,
    pub presets: Arc<PresetCatalog>,
    pub settings: Settings,
}

impl AppState {
    /// Build the state from validated settings
    pub fn new(settings: Settings) -> Result<Self> {
        let github = GitHubClient::new(settings.github.clone())?;
        let paginator = SamplingPaginator::new(
            settings.search.result_cap,
            settings.search.upstream_page_size,
        );
        let presets = PresetCatalog::load(settings.presets_path.as_deref())?;

        Ok(Self {
            github,
            paginator,
            presets: Arc::new(presets),
            settings,
        })
    }
}

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Error::PayloadTooLarge(rejection.body_text())
        } else {
            Error::Validation(rejection.body_text())
        }
    })
}

/// GET / - Service descriptor
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "repo-finder",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            "GET  /health",
            "GET  /api/presets",
            "GET  /api/time-periods",
            "POST /api/search",
            "POST /api/export/json",
            "POST /api/export/csv",
        ],
    })
}

/// GET /api/presets - List search presets
pub async fn list_presets(State(state): State<AppState>) -> Json<PresetsResponse> {
    Json(PresetsResponse {
        success: true,
        presets: state.presets.presets.clone(),
    })
}

/// GET /api/time-periods - List named relative periods
pub async fn list_time_periods() -> Json<TimePeriodsResponse> {
    Json(TimePeriodsResponse {
        success: true,
        time_periods: time_period_names(),
    })
}

/// POST /api/search - Sample one page of matching repositories
pub async fn search_repositories(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>> {
    let request = json_body(payload)?;
    let search_settings = &state.settings.search;

    let filter = request.to_filter(search_settings.default_page_size);
    filter.validate(search_settings.max_page_size)?;

    let page = request.page.unwrap_or(1);
    if page == 0 {
        return Err(Error::Validation("page must be at least 1".to_string()));
    }

    let query = filter.to_search_query();
    if query.q.is_empty() {
        return Err(Error::Validation(
            "At least one search criterion must be specified".to_string(),
        ));
    }

    // A total count only describes the search its seed belongs to
    let known_total = request.seed.and(request.total_count);
    let seed = request.seed.unwrap_or_else(generate_seed);
    debug!(
        "Search request: q={:?} sort={} page={} size={} seed={}",
        query.q, query.sort, page, filter.page_size, seed
    );

    let client = match request.github_token.as_deref() {
        Some(token) => state.github.with_token(token),
        None => state.github.clone(),
    };

    let sampled = state
        .paginator
        .sample_page_with_total(&client, &query, seed, page, filter.page_size, known_total)
        .await?;

    let repositories: Vec<RepositoryRecord> = sampled
        .items
        .into_iter()
        .map(RepositoryRecord::from)
        .collect();

    info!(
        "Search '{}' page {} returned {} of {} matches",
        query.q,
        sampled.page,
        repositories.len(),
        sampled.total_count
    );

    Ok(Json(SearchResponse {
        success: true,
        query: query.q,
        total_count: sampled.total_count,
        returned_count: repositories.len(),
        repositories,
        seed: sampled.seed,
        page: sampled.page,
        has_more: sampled.has_more,
    }))
}

fn attachment(content_type: &str, filename: String, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// POST /api/export/json - Download records as a JSON document
pub async fn export_json(
    payload: std::result::Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response> {
    let request = json_body(payload)?;
    debug!("JSON export of {} repositories", request.repositories.len());

    let now = Local::now();
    let body = export::to_json_document(&request.repositories, now)?;

    Ok(attachment(
        "application/json",
        export::export_filename("json", now),
        body,
    ))
}

/// POST /api/export/csv - Download records as CSV
pub async fn export_csv(
    payload: std::result::Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response> {
    let request = json_body(payload)?;
    debug!("CSV export of {} repositories", request.repositories.len());

    let body = export::to_csv(&request.repositories)?;

    Ok(attachment(
        "text/csv; charset=utf-8",
        export::export_filename("csv", Local::now()),
        body,
    ))
}

/// GET /health - Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        rate_limit: state.github.get_rate_limit_status().await,
    })
}
