//! Topic News Ranker — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, the metrics
//! recorder, and the background ingest scheduler.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use topic_news_ranker::api::{create_router, AppState};
use topic_news_ranker::ingest::config::load_config_default;
use topic_news_ranker::ingest::scheduler::spawn_ingest_scheduler;
use topic_news_ranker::metrics::Metrics;
use topic_news_ranker::store::{MemoryStore, SubjectStore, STORE_TTL};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - RANKER_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("RANKER_DEV_LOG")
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

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ingest=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments. This enables
    // NEWS_CONFIG_PATH / PUSH_API_TOKEN from .env.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let config = Arc::new(load_config_default().expect("Failed to load ingest config"));
    let store: Arc<dyn SubjectStore> = Arc::new(MemoryStore::new());
    let push_token = std::env::var("PUSH_API_TOKEN").ok();

    let metrics = Metrics::init(STORE_TTL.as_secs());

    // Background pull cycle; the push API shares the same store.
    let _ingest = spawn_ingest_scheduler(config, Arc::clone(&store));

    let state = AppState::new(store, push_token);
    let router = create_router(state).merge(metrics.router());

    Ok(router.into())
}
