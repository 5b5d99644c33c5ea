use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    Json, Router,
    extract::{MatchedPath, State},
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{MakeSpan, OnRequest, OnResponse, TraceLayer},
};
use tracing::{Span, field, instrument};

use crate::{
    api::{self, ApiResult},
    catalog::MovieCatalog,
    config::AppConfig,
    discovery::SessionRegistry,
    journal::SearchJournal,
};

/// Shared application state cloned into each request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<dyn MovieCatalog>,
    pub journal: Arc<SearchJournal>,
    pub sessions: Arc<SessionRegistry>,
    pub boot_instant: Instant,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        catalog: Arc<dyn MovieCatalog>,
        journal: Arc<SearchJournal>,
        sessions: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            config,
            catalog,
            journal,
            sessions,
            boot_instant: Instant::now(),
        }
    }
}

/// Build the Axum router with shared layers and routes.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);
    let frontend_dist_dir = state.config.frontend_dist_dir.clone();

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/v1/sessions", post(api::sessions::create_session))
        .route(
            "/api/v1/sessions/{id}",
            get(api::sessions::session_view).delete(api::sessions::close_session),
        )
        .route(
            "/api/v1/sessions/{id}/input",
            post(api::sessions::submit_input),
        )
        .route(
            "/api/v1/sessions/{id}/load-more",
            post(api::sessions::load_more),
        )
        .route("/api/v1/trending", get(api::trending::trending))
        .with_state(state);

    let router = match frontend_dist_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(api::fallback_handler),
    };

    router
        .layer(middleware::from_fn(api::ensure_error_envelope))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(HttpTrace)
                .on_request(HttpTrace)
                .on_response(HttpTrace),
        )
        .layer(cors)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}

/// JSON payload returned by `/healthz`.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    environment: String,
    uptime_seconds: f64,
    active_sessions: usize,
    journaled_searches: usize,
}

#[instrument(skip(state))]
async fn healthz(State(state): State<AppState>) -> ApiResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok",
        environment: state.config.environment.clone(),
        uptime_seconds: state.boot_instant.elapsed().as_secs_f64(),
        active_sessions: state.sessions.len().await,
        journaled_searches: state.journal.len(),
    }))
}

/// Unified tower-http trace hooks: span creation, request and response logs.
#[derive(Clone)]
struct HttpTrace;

impl<B> MakeSpan<B> for HttpTrace {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let matched_path = request
            .extensions()
            .get::<MatchedPath>()
            .map(|path| path.as_str())
            .unwrap_or_else(|| request.uri().path());

        let span = tracing::info_span!(
            "http_request",
            http.request.method = %request.method(),
            http.route = %matched_path,
            url.path = request.uri().path(),
            url.query = field::Empty,
            http.response.status_code = field::Empty,
            http.latency_ms = field::Empty
        );

        if let Some(query) = request.uri().query() {
            span.record("url.query", field::display(query));
        }

        span
    }
}

impl<B> OnRequest<B> for HttpTrace {
    fn on_request(&mut self, request: &axum::http::Request<B>, span: &Span) {
        tracing::info!(
            parent: span,
            "HTTP request received: {} {}",
            request.method(),
            request.uri().path()
        );
    }
}

impl<B> OnResponse<B> for HttpTrace {
    fn on_response(self, response: &axum::http::Response<B>, latency: Duration, span: &Span) {
        let status_code = response.status().as_u16();

        span.record("http.response.status_code", field::display(status_code));
        span.record("http.latency_ms", field::display(latency.as_millis()));

        tracing::info!(
            parent: span,
            "HTTP request completed with status {} in {} ms",
            status_code,
            latency.as_millis()
        );
    }
}
