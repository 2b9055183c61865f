use axum::http::{header, HeaderValue, Method};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

#[cfg(not(test))]
use {
    axum::extract::ConnectInfo,
    std::net::IpAddr,
    std::sync::Arc,
    tower_governor::{governor::GovernorConfigBuilder, key_extractor::KeyExtractor, GovernorLayer},
    tracing::warn,
};

use crate::api::handlers::{self, AppState};
use crate::config::Settings;

/// Governor quota for `rate` requests per second: the replenish interval in
/// milliseconds and a burst of two seconds' worth of requests.
fn governor_quota(rate: u64) -> (u64, u32) {
    let rate = rate.max(1);
    let replenish_ms = (1000 / rate).max(1);
    let burst = u32::try_from(rate).unwrap_or(u32::MAX).saturating_mul(2);
    (replenish_ms, burst)
}

/// Create the router with all endpoints
#[cfg_attr(test, allow(unused_variables))]
pub fn create_router(state: AppState, settings: &Settings) -> Router {
    #[cfg_attr(test, allow(unused_mut))]
    let mut api_routes = Router::new()
        .route("/presets", get(handlers::list_presets))
        .route("/time-periods", get(handlers::list_time_periods))
        .route("/search", post(handlers::search_repositories))
        .route("/export/json", post(handlers::export_json))
        .route("/export/csv", post(handlers::export_csv))
        .with_state(state.clone());

    // Apply rate limiting only in non-test builds.
    // The key extractor falls back to 127.0.0.1 when the peer address is not
    // available (local runs, in-process tests).
    #[cfg(not(test))]
    {
        #[derive(Clone, Copy, Debug)]
        struct FallbackIpKeyExtractor;

        impl KeyExtractor for FallbackIpKeyExtractor {
            type Key = IpAddr;

            fn extract<B>(
                &self,
                req: &axum::http::Request<B>,
            ) -> Result<Self::Key, tower_governor::GovernorError> {
                if let Some(ConnectInfo(addr)) = req
                    .extensions()
                    .get::<ConnectInfo<std::net::SocketAddr>>()
                {
                    return Ok(addr.ip());
                }

                Ok(IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)))
            }
        }

        let (replenish_ms, burst) = governor_quota(settings.server.api_rate_limit);
        let governor_conf = GovernorConfigBuilder::default()
            .key_extractor(FallbackIpKeyExtractor)
            .per_millisecond(replenish_ms)
            .burst_size(burst)
            .finish();

        match governor_conf {
            Some(config) => {
                api_routes = api_routes.layer(GovernorLayer {
                    config: Arc::new(config),
                });
            }
            None => warn!("Invalid API rate limit configuration, rate limiting disabled"),
        }
    }

    let api_routes = api_routes;

    let root_routes = Router::new()
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health_check))
        .with_state(state);

    Router::new()
        .merge(root_routes)
        .nest("/api", api_routes)
        .layer(
            // Request body size limit - prevent memory exhaustion from large exports
            RequestBodyLimitLayer::new(settings.server.max_request_body_size),
        )
        .layer(DefaultBodyLimit::max(settings.server.max_request_body_size))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .allow_origin(tower_http::cors::Any)
                .max_age(Duration::from_secs(3600)),
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SearchConfig, ServerConfig};
    use crate::github::GitHubConfig;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let settings = Settings {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                api_rate_limit: 10,
                max_request_body_size: 10485760,
            },
            github: GitHubConfig {
                api_base_url: "http://127.0.0.1:9".to_string(),
                ..GitHubConfig::default()
            },
            search: SearchConfig::default(),
            presets_path: None,
        };

        AppState::new(settings).unwrap()
    }

    #[tokio::test]
    async fn test_routes_exist() {
        let state = create_test_state();
        let app = create_router(state.clone(), &state.settings);

        for uri in ["/", "/health", "/api/presets", "/api/time-periods"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[test]
    fn test_governor_quota() {
        assert_eq!(governor_quota(10), (100, 20));
        assert_eq!(governor_quota(1), (1000, 2));
        assert_eq!(governor_quota(0), (1000, 2));
        assert_eq!(governor_quota(5000), (1, 10000));
        assert_eq!(governor_quota(u64::MAX), (1, u32::MAX));
    }

    #[tokio::test]
    async fn test_search_requires_post() {
        let state = create_test_state();
        let app = create_router(state.clone(), &state.settings);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/search")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
