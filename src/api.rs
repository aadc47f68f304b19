use std::sync::{Arc, RwLock};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::batch::{BatchOutput, BatchProcessor, SeededPopularity};
use crate::config::EngineConfig;
use crate::error::EngineError;

#[derive(Clone)]
pub struct AppState {
    config: Arc<RwLock<EngineConfig>>,
}

impl AppState {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// Snapshot of the current config; each request clusters against its own copy.
    fn snapshot(&self) -> Result<EngineConfig, ApiError> {
        self.config
            .read()
            .map(|g| g.clone())
            .map_err(|_| ApiError::internal("config lock poisoned"))
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/process", post(process_batch))
        .route("/config", get(current_config))
        .route("/admin/reload-config", post(admin_reload_config))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// JSON error body with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Default, serde::Deserialize)]
struct ProcessQuery {
    /// RFC 3339 clock override; defaults to the current time.
    #[serde(default)]
    now: Option<String>,
    /// Seed for deterministic popularity values.
    #[serde(default)]
    seed: Option<u64>,
    /// "1" / "true" attaches score breakdowns.
    #[serde(default)]
    explain: Option<String>,
}

async fn process_batch(
    State(state): State<AppState>,
    Query(q): Query<ProcessQuery>,
    Json(body): Json<Value>,
) -> Result<Json<BatchOutput>, ApiError> {
    let now = match q.now.as_deref() {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, format!("invalid `now`: {e}")))?,
        None => Utc::now(),
    };
    let explain = matches!(q.explain.as_deref(), Some("1") | Some("true"));

    let cfg = state.snapshot()?;
    let processor = match q.seed {
        Some(seed) => BatchProcessor::with_popularity(&cfg, Box::new(SeededPopularity::new(seed))),
        None => BatchProcessor::new(&cfg),
    };
    let out = processor.explain(explain).process_value(body, now)?;
    Ok(Json(out))
}

async fn current_config(State(state): State<AppState>) -> Result<Json<EngineConfig>, ApiError> {
    Ok(Json(state.snapshot()?))
}

async fn admin_reload_config(State(state): State<AppState>) -> Result<String, ApiError> {
    let fresh = EngineConfig::from_env().map_err(|e| ApiError::internal(format!("{e:#}")))?;
    let mut guard = state
        .config
        .write()
        .map_err(|_| ApiError::internal("config lock poisoned"))?;
    *guard = fresh;
    tracing::info!(target: "config", "engine config reloaded");
    Ok("reloaded".to_string())
}
