//! Tests for the fetch service router: cache hits, upstream failures, health

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use karir_gateway::{router, FetchState};
use karir_jobs::{ApiJobsClient, ResponseCache};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

async fn spawn_upstream(hits: Arc<AtomicUsize>, fail: bool) -> String {
    let app = Router::new().route(
        "/v1/job/search",
        post(move |Json(body): Json<Value>| {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                if fail {
                    return (StatusCode::BAD_GATEWAY, Json(json!({"error": "down"})));
                }
                let q = body["q"].as_str().unwrap_or_default().to_string();
                (StatusCode::OK, Json(json!({ "hits": [{ "title": format!("{} Engineer", q) }] })))
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1/job/search", addr)
}

fn fetch_request(q: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/fetch")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "q": q }).to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ===========================================================================
// /api/fetch
// ===========================================================================

#[tokio::test]
async fn second_identical_query_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let upstream = ApiJobsClient::direct(spawn_upstream(hits.clone(), false).await, Some("k".into()));
    let cache = ResponseCache::new(dir.path().join("cache").join("cached_data.json"), Duration::from_secs(3600));
    let app = router(Arc::new(FetchState::new(cache, upstream)));

    let first = app.clone().oneshot(fetch_request("data")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_json(first).await["hits"][0]["title"], "data Engineer");

    let second = app.clone().oneshot(fetch_request("data")).await.unwrap();
    assert_eq!(body_json(second).await["hits"][0]["title"], "data Engineer");
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    app.oneshot(fetch_request("nurse")).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    let stored: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("cache/cached_data.json")).unwrap()).unwrap();
    assert!(stored.get(r#"{"q": "data"}"#).is_some());
}

#[tokio::test]
async fn upstream_failure_is_a_500_with_details() {
    let dir = tempfile::tempdir().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let upstream = ApiJobsClient::direct(spawn_upstream(hits, true).await, None);
    let cache = ResponseCache::new(dir.path().join("cached_data.json"), Duration::from_secs(3600));
    let app = router(Arc::new(FetchState::new(cache, upstream)));

    let response = app.oneshot(fetch_request("welder")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to fetch data from external API");
    assert!(body["details"].as_str().unwrap().contains("502"));
    assert!(!dir.path().join("cached_data.json").exists());
}

#[tokio::test]
async fn missing_query_uses_empty_string() {
    let dir = tempfile::tempdir().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let upstream = ApiJobsClient::direct(spawn_upstream(hits.clone(), false).await, None);
    let cache = ResponseCache::new(dir.path().join("cached_data.json"), Duration::from_secs(3600));
    let app = router(Arc::new(FetchState::new(cache, upstream)));

    let request = Request::builder()
        .method("POST")
        .uri("/api/fetch")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["hits"][0]["title"], " Engineer");
}

// ===========================================================================
// /health
// ===========================================================================

#[tokio::test]
async fn health_reports_cache_state() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ResponseCache::new(dir.path().join("cached_data.json"), Duration::from_secs(60));
    let app = router(Arc::new(FetchState::new(cache, ApiJobsClient::direct("http://127.0.0.1:1", None))));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["cache_valid"], false);
}
