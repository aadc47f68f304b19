//! Newsmap service — binary entrypoint.
//! Boots the Axum HTTP server with the batch dedup/scoring API and `/metrics`.

use newsmap_engine::api::{self, AppState};
use newsmap_engine::config::EngineConfig;
use newsmap_engine::metrics::Metrics;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - NEWSMAP_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("NEWSMAP_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("batch=info,config=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    // This enables NEWSMAP_CONFIG_PATH / NEWSMAP_SIMILARITY_THRESHOLD from .env.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let config = EngineConfig::from_env()?;
    let metrics = Metrics::init(&config)?;

    let router = api::create_router(AppState::new(config)).merge(metrics.router());

    Ok(router.into())
}
