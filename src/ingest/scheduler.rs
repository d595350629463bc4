// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::ingest::config::IngestConfig;
use crate::ingest::fetch::HttpFeedFetcher;
use crate::store::SubjectStore;

/// Spawn the periodic ingestion trigger. Each tick runs one full cycle over
/// every configured subject; subjects own disjoint store keys, so the cycle
/// needs no coordination with the push-API path beyond last-writer-wins.
pub fn spawn_ingest_scheduler(
    config: Arc<IngestConfig>,
    store: Arc<dyn SubjectStore>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let fetcher = HttpFeedFetcher::new(Duration::from_secs(config.fetch_timeout_secs));
        let mut ticker = tokio::time::interval(Duration::from_secs(config.interval_secs.max(1)));
        loop {
            ticker.tick().await;
            crate::ingest::run_cycle(&fetcher, store.as_ref(), &config).await;
            tracing::info!(
                target: "ingest",
                subjects = config.subjects.len(),
                "ingest tick complete"
            );
        }
    })
}
