use crate::actors::RefreshStats;
use crate::cache::CacheStats;
use crate::coordinator::Coordinator;
use crate::error::{PinnedReposError, Result};
use crate::extractor::RepoSource;
use axum::{
    extract::{Query, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const ALLOWED_METHODS: &str = "OPTIONS, GET";
const CACHE_CONTROL: &str = "public, max-age=600";

const USAGE_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><meta charset="utf-8"><title>Pinned Repos</title></head>
  <body>
    <h1>Pinned Repos</h1>
    <p>Returns the pinned repositories of a GitHub user as JSON.</p>
    <p>Usage: <code>GET /?username=&lt;github username&gt;</code></p>
    <p>Add <code>&amp;refresh=true</code> to skip the cache and fetch from GitHub.</p>
  </body>
</html>
"#;

/// Query string of the main endpoint
#[derive(Debug, Default, Deserialize)]
pub struct PinnedParams {
    pub username: Option<String>,
    pub refresh: Option<String>,
}

impl PinnedParams {
    /// Blank usernames are treated as missing.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn force_refresh(&self) -> bool {
        self.refresh
            .as_deref()
            .is_some_and(|r| r.trim().eq_ignore_ascii_case("true"))
    }
}

/// Response for errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub started_at: DateTime<Utc>,
    pub cache: CacheStats,
    pub refresh: RefreshStats,
}

/// Application state shared by all handlers
pub struct AppState<S> {
    pub coordinator: Arc<Coordinator<S>>,
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
}

impl<S> AppState<S> {
    pub fn new(coordinator: Arc<Coordinator<S>>) -> Self {
        Self {
            coordinator,
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
            start_time: self.start_time,
            started_at: self.started_at,
        }
    }
}

/// Builds the router with CORS and cache headers applied to every response.
pub fn create_router<S: RepoSource>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(pinned_repos::<S>).options(preflight))
        .route("/healthz", get(health_check::<S>))
        .layer(static_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .layer(static_header(header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS))
        .layer(static_header(header::ACCESS_CONTROL_ALLOW_HEADERS, "*"))
        .layer(static_header(header::CACHE_CONTROL, CACHE_CONTROL))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn static_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}

/// Serves `router` on all interfaces until `shutdown` resolves.
pub async fn serve<F>(router: Router, port: u16, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Pinned repos server listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

async fn pinned_repos<S: RepoSource>(
    State(state): State<AppState<S>>,
    Query(params): Query<PinnedParams>,
) -> Response {
    let Some(username) = params.username() else {
        return Html(USAGE_PAGE).into_response();
    };

    match state.coordinator.resolve(username, params.force_refresh()).await {
        Ok(repos) => Json(repos).into_response(),
        Err(e) => {
            error!(username, error = %e, "Failed to resolve pinned repositories");
            error_response(username, &e).into_response()
        }
    }
}

fn error_response(username: &str, err: &PinnedReposError) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("Failed to fetch pinned repositories for {}", username),
            details: err.to_string(),
        }),
    )
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn health_check<S: RepoSource>(State(state): State<AppState<S>>) -> impl IntoResponse {
    let cache = state.coordinator.cache_stats().await;
    let refresh = state.coordinator.refresh_stats();

    let status = if state.coordinator.refresher_running() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        started_at: state.started_at,
        cache,
        refresh,
    })
}
