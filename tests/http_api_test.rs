//! End-to-end tests for the HTTP boundary, exercised in-process via tower.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;
use vitals_lib::api::{create_router, ApiState};
use vitals_lib::core::config::ConfigBuilder;
use vitals_lib::core::Config;
use vitals_lib::store::RumStore;

const ADMIN_TOKEN: &str = "test-admin-token";

fn test_config() -> Config {
    ConfigBuilder::new()
        .admin_token(Some(ADMIN_TOKEN.to_string()))
        .build()
        .unwrap()
}

fn test_router(config: &Config) -> (axum::Router, Arc<RumStore>) {
    let store = Arc::new(RumStore::new(config.store.capacity, config.store.retention));
    let state = ApiState::new(Arc::clone(&store), config);
    (create_router(state, config.server.max_body_bytes), store)
}

fn beacon_request(payload: serde_json::Value, user_agent: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/vitals")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, user_agent)
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn summary_request(query: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("GET")
        .uri(format!("/v1/vitals/summary{}", query));
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_beacon_accepts_valid_batch() {
    let config = test_config();
    let (app, store) = test_router(&config);

    let payload = serde_json::json!({
        "events": [
            { "name": "LCP", "value": 1800.0, "path": "/home" },
            { "name": "CLS", "value": 0.02, "path": "/home" },
        ]
    });
    let response = app.oneshot(beacon_request(payload, "Mozilla/5.0")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["accepted"], 2);
    assert_eq!(body["dropped"], 0);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_beacon_drops_malformed_keeps_valid() {
    let config = test_config();
    let (app, store) = test_router(&config);

    let payload = serde_json::json!({
        "events": [
            { "name": "LCP", "value": 1800.0, "path": "/home" },
            { "name": "FID", "value": 10.0, "path": "/home" },
            { "name": "TTFB", "value": 90.0, "path": "relative-path" },
        ]
    });
    let response = app.oneshot(beacon_request(payload, "Mozilla/5.0")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["accepted"], 1);
    assert_eq!(body["dropped"], 2);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_beacon_rejects_fully_invalid_batch_as_client_error() {
    let config = test_config();
    let (app, store) = test_router(&config);

    let payload = serde_json::json!({
        "events": [
            { "name": "NOPE", "value": 1.0, "path": "/a" },
        ]
    });
    let response = app.oneshot(beacon_request(payload, "Mozilla/5.0")).await.unwrap();

    // Same response shape, client-error status, never a 5xx
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["accepted"], 0);
    assert_eq!(body["dropped"], 1);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_beacon_rejects_invalid_json() {
    let config = test_config();
    let (app, _store) = test_router(&config);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/vitals")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_beacon_truncates_oversized_batch() {
    let config = test_config();
    let (app, store) = test_router(&config);

    let events: Vec<serde_json::Value> = (0..150)
        .map(|i| serde_json::json!({ "name": "TTFB", "value": i, "path": "/" }))
        .collect();
    let payload = serde_json::json!({ "events": events });
    let response = app.oneshot(beacon_request(payload, "Mozilla/5.0")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["accepted"], 100);
    assert_eq!(body["dropped"], 50);
    assert_eq!(store.len(), 100);
}

#[tokio::test]
async fn test_beacon_sampled_out() {
    let config = ConfigBuilder::new().sampling_rate(0.0).build().unwrap();
    let (app, store) = test_router(&config);

    let payload = serde_json::json!({
        "events": [ { "name": "LCP", "value": 100.0, "path": "/" } ]
    });
    let response = app.oneshot(beacon_request(payload, "Mozilla/5.0")).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = json_body(response).await;
    assert_eq!(body["accepted"], 0);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_summary_requires_token() {
    let config = test_config();
    let (app, _store) = test_router(&config);

    let response = app
        .clone()
        .oneshot(summary_request("", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.oneshot(summary_request("", Some("wrong-token"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_summary_disabled_without_configured_token() {
    let config = ConfigBuilder::new().build().unwrap();
    let (app, _store) = test_router(&config);

    let response = app.oneshot(summary_request("", Some(ADMIN_TOKEN))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_summary_shape_and_grouping() {
    let config = test_config();
    let (app, _store) = test_router(&config);

    let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148";
    let payload = serde_json::json!({
        "events": [
            { "name": "LCP", "value": 1000.0, "path": "/a" },
            { "name": "LCP", "value": 3000.0, "path": "/a" },
            { "name": "CLS", "value": 0.05, "path": "/b" },
        ]
    });
    let response = app
        .clone()
        .oneshot(beacon_request(payload, iphone))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(summary_request("?windowMs=3600000", Some(ADMIN_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["count"], 3);
    assert_eq!(body["windowMs"], 3_600_000);
    assert!(body["generatedAt"].is_string());

    // Nearest-rank p50 of [1000, 3000] is 1000
    assert_eq!(body["overall"]["LCP"]["count"], 2);
    assert_eq!(body["overall"]["LCP"]["p50"], 1000.0);
    assert_eq!(body["overall"]["INP"]["count"], 0);
    assert!(body["overall"]["INP"]["p50"].is_null());

    assert_eq!(body["byPath"]["/a"]["LCP"]["count"], 2);
    assert_eq!(body["byPath"]["/b"]["CLS"]["count"], 1);

    // All four device classes are always present
    let by_device = body["byDevice"].as_object().unwrap();
    assert_eq!(by_device.len(), 4);
    assert_eq!(body["byDevice"]["mobile"]["LCP"]["count"], 2);
    assert_eq!(body["byDevice"]["tablet"]["LCP"]["count"], 0);
}

#[tokio::test]
async fn test_summary_path_prefix_filter() {
    let config = test_config();
    let (app, _store) = test_router(&config);

    let payload = serde_json::json!({
        "events": [
            { "name": "TTFB", "value": 50.0, "path": "/shop/cart" },
            { "name": "TTFB", "value": 70.0, "path": "/blog" },
        ]
    });
    let response = app
        .clone()
        .oneshot(beacon_request(payload, "Mozilla/5.0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(summary_request("?pathPrefix=/shop", Some(ADMIN_TOKEN)))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["overall"]["TTFB"]["count"], 1);
    assert_eq!(body["overall"]["TTFB"]["p50"], 50.0);
}

#[tokio::test]
async fn test_summary_window_clamped() {
    let config = test_config();
    let (app, _store) = test_router(&config);

    let response = app
        .oneshot(summary_request("?windowMs=1", Some(ADMIN_TOKEN)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["windowMs"], 60_000);
}

#[tokio::test]
async fn test_server_drains_and_exits_on_shutdown() {
    let config = test_config();
    let (app, _store) = test_router(&config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(vitals_lib::api::serve_with_shutdown(app, listener, async move {
        shutdown_rx.await.ok();
    }));

    // Server keeps running until the shutdown future resolves
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(!server.is_finished());

    shutdown_tx.send(()).unwrap();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
        .await
        .expect("server did not stop after shutdown signal")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_health_endpoint() {
    let config = test_config();
    let (app, _store) = test_router(&config);

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["event_count"], 0);
    assert_eq!(body["capacity"], 10_000);
}
