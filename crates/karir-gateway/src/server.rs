//! Fetch service: `POST /api/fetch` answers from the response cache or APIJobs

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use karir_core::KarirConfig;
use karir_jobs::{ApiJobsClient, ResponseCache};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub struct FetchState {
    pub cache: ResponseCache,
    /// Always a direct client; the service never calls itself.
    pub upstream: ApiJobsClient,
    pub started_at: std::time::Instant,
}

impl FetchState {
    pub fn new(cache: ResponseCache, upstream: ApiJobsClient) -> Self {
        Self { cache, upstream, started_at: std::time::Instant::now() }
    }

    pub fn from_config(config: &KarirConfig) -> Self {
        let upstream = ApiJobsClient::direct(&config.apijobs.api_url, config.apijobs.api_key());
        Self::new(ResponseCache::from_config(&config.cache), upstream)
    }
}

pub fn router(state: Arc<FetchState>) -> Router {
    Router::new()
        .route("/api/fetch", post(fetch_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_fetch_service(config: &KarirConfig) -> anyhow::Result<()> {
    if config.apijobs.api_key().is_none() {
        warn!("{} is not set, APIJobs will reject uncached queries", karir_core::config::APIJOBS_KEY_ENV);
    }
    let state = Arc::new(FetchState::from_config(config));
    let app = router(state.clone());

    let bind_addr: SocketAddr = config
        .gateway_addr()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind address {}: {}", config.gateway_addr(), e))?;

    info!("Karir fetch service v{} starting", env!("CARGO_PKG_VERSION"));
    info!("  Listening on: {}", bind_addr);
    info!("  Cache file:   {}", state.cache.path().display());
    info!("  Cache TTL:    {}s", state.cache.ttl().as_secs());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn fetch_handler(State(state): State<Arc<FetchState>>, body: Option<Json<Value>>) -> Response {
    let q = body
        .as_ref()
        .and_then(|Json(b)| b.get("q"))
        .map(|q| match q {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default();
    let params = json!({ "q": q });
    let key = ResponseCache::key_for(&params);

    match state.cache.get(&key).await {
        Ok(Some(data)) if is_present(&data) => {
            info!("Using cached data for {}", key);
            return Json(data).into_response();
        }
        Ok(_) => {}
        Err(e) => warn!("Cache unreadable, fetching upstream: {}", e),
    }

    match state.upstream.fetch_direct(&q).await {
        Ok(data) => {
            if let Err(e) = state.cache.put(&key, data.clone()).await {
                warn!("Failed to cache response for {}: {}", key, e);
            }
            Json(data).into_response()
        }
        Err(e) => {
            error!("Error fetching data from external API: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to fetch data from external API",
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// Empty payloads count as a miss.
fn is_present(data: &Value) -> bool {
    match data {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

async fn health_handler(State(state): State<Arc<FetchState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "cache_valid": state.cache.is_valid().await,
        "uptime_secs": state.started_at.elapsed().as_secs(),
    }))
}
