//! HTTP boundary: public beacon ingestion and admin summary endpoints.
//!
//! The beacon endpoint is tolerant by design — per-event validation failures
//! are dropped silently and a batch with zero valid events comes back as a
//! client error with the same response shape, never a 5xx. The summary
//! endpoint is bearer-token gated.

use crate::core::{Config, Result, VitalsError};
use crate::ingest::{classify_device, sanitize_batch, RawEvent, Sampler};
use crate::store::RumStore;
use crate::summary;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Smallest summary window a client may request (1 minute).
const MIN_WINDOW_MS: u64 = 60_000;

/// Largest summary window a client may request (7 days).
const MAX_WINDOW_MS: u64 = 7 * 24 * 3600 * 1000;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct ApiState {
    store: Arc<RumStore>,
    sampler: Sampler,
    admin_token: Option<String>,
    max_batch_size: usize,
    started_at: Instant,
}

impl ApiState {
    /// Build handler state from the app config and an injected store.
    pub fn new(store: Arc<RumStore>, config: &Config) -> Self {
        Self {
            store,
            sampler: Sampler::new(config.sampling.rate),
            admin_token: config.auth.admin_token.clone(),
            max_batch_size: config.server.max_batch_size,
            started_at: Instant::now(),
        }
    }
}

/// Beacon batch payload.
#[derive(Debug, Deserialize)]
struct BeaconPayload {
    #[serde(default)]
    events: Vec<RawEvent>,
}

/// Beacon response shape, identical for accepted and rejected batches.
#[derive(Debug, Serialize)]
struct BeaconResponse {
    accepted: usize,
    dropped: usize,
}

/// Query parameters for the summary endpoint.
#[derive(Debug, Deserialize)]
struct SummaryQuery {
    #[serde(rename = "windowMs")]
    window_ms: Option<u64>,
    #[serde(rename = "pathPrefix")]
    path_prefix: Option<String>,
}

/// Summary response.
#[derive(Debug, Serialize)]
struct SummaryResponse {
    count: usize,
    #[serde(rename = "windowMs")]
    window_ms: u64,
    #[serde(rename = "generatedAt")]
    generated_at: String,
    overall: summary::SummarySet,
    #[serde(rename = "byPath")]
    by_path: std::collections::BTreeMap<String, summary::SummarySet>,
    #[serde(rename = "byDevice")]
    by_device: std::collections::BTreeMap<&'static str, summary::SummarySet>,
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_seconds: u64,
    event_count: usize,
    capacity: usize,
}

/// Create the router with all endpoints and middleware.
pub fn create_router(state: ApiState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/v1/vitals", post(handle_beacon))
        .route("/v1/vitals/summary", get(handle_summary))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(tower_http::cors::Any)
                    .allow_methods(tower_http::cors::Any)
                    .allow_headers(tower_http::cors::Any),
            ),
        )
        .with_state(state)
}

/// Start the API server, running until ctrl-c.
pub async fn start_server(state: ApiState, config: &Config) -> Result<()> {
    let app = create_router(state, config.server.max_body_bytes);
    let addr = format!("{}:{}", config.server.bind_address, config.server.port);

    tracing::info!("Starting vitals collector on http://{}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| VitalsError::server(format!("Failed to bind to {}: {}", addr, e)))?;

    serve_with_shutdown(app, listener, async {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received, draining connections");
    })
    .await
}

/// Serve `app` on `listener` until `shutdown` resolves, then drain
/// in-flight connections and return.
pub async fn serve_with_shutdown(
    app: Router,
    listener: TcpListener,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| VitalsError::server(format!("API server error: {}", e)))?;

    Ok(())
}

/// POST /v1/vitals - public beacon ingestion.
async fn handle_beacon(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    tracing::debug!("Received beacon request, {} bytes", body.len());

    // Even an unparseable body gets the success-shaped response, as a
    // client error; a public beacon never leaks validation internals
    let payload: BeaconPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!("Beacon body rejected: {}", e);
            let response = BeaconResponse {
                accepted: 0,
                dropped: 0,
            };
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        },
    };

    // Sampling happens before anything reaches the core
    if !state.sampler.should_accept() {
        tracing::debug!("Beacon request sampled out");
        let response = BeaconResponse {
            accepted: 0,
            dropped: 0,
        };
        return (StatusCode::ACCEPTED, Json(response)).into_response();
    }

    let received = payload.events.len();
    let mut events = payload.events;
    // A public beacon does not fail loudly on oversized batches
    events.truncate(state.max_batch_size);

    let user_agent = headers.get("user-agent").and_then(|v| v.to_str().ok());
    let device_class = classify_device(user_agent);

    let now = crate::core::types::now_millis();
    let sanitized = sanitize_batch(events, now, device_class);
    let accepted = sanitized.len();
    let dropped = received - accepted;

    if accepted == 0 {
        // No valid events is a client problem, with the same body shape
        tracing::debug!("Beacon batch fully rejected ({} events received)", received);
        let response = BeaconResponse { accepted, dropped };
        return (StatusCode::BAD_REQUEST, Json(response)).into_response();
    }

    state.store.add_many(sanitized);
    tracing::debug!("Beacon batch stored: {} accepted, {} dropped", accepted, dropped);

    Json(BeaconResponse { accepted, dropped }).into_response()
}

/// GET /v1/vitals/summary - admin summary over a requested window.
async fn handle_summary(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(params): Query<SummaryQuery>,
) -> std::result::Result<Response, ApiError> {
    authorize(&state, &headers)?;

    let window_ms = params
        .window_ms
        .unwrap_or(MAX_WINDOW_MS)
        .clamp(MIN_WINDOW_MS, MAX_WINDOW_MS);

    let events = state.store.data_within(Duration::from_millis(window_ms));
    let prefix = params.path_prefix.unwrap_or_default();
    let events = summary::filter_by_prefix(events, &prefix);

    let response = SummaryResponse {
        count: events.len(),
        window_ms,
        generated_at: chrono::Utc::now().to_rfc3339(),
        overall: summary::overall_summary(&events),
        by_path: summary::by_path_summary(&events),
        by_device: summary::by_device_summary(&events),
    };

    Ok(Json(response).into_response())
}

/// GET /health - liveness and basic stats.
async fn health_check(State(state): State<ApiState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        event_count: state.store.len(),
        capacity: state.store.capacity(),
    })
}

/// Check the bearer token against the configured admin token.
fn authorize(state: &ApiState, headers: &HeaderMap) -> std::result::Result<(), ApiError> {
    let expected = state
        .admin_token
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("summary endpoint disabled: no admin token configured".to_string()))?;

    let provided = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

    if provided != expected {
        return Err(ApiError::Unauthorized("invalid token".to_string()));
    }

    Ok(())
}

/// HTTP-specific error type.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request payload or parameters.
    BadRequest(String),
    /// Missing or invalid admin credentials.
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        let body = Json(serde_json::json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}
