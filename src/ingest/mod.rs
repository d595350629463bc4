// src/ingest/mod.rs
pub mod config;
pub mod fetch;
pub mod normalize;
pub mod parser;
pub mod scheduler;
pub mod types;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;

use crate::ingest::config::IngestConfig;
use crate::ingest::types::{Article, FeedFetcher};
use crate::store::{SubjectStore, STORE_TTL};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_feeds_fetched_total", "Feeds fetched and parsed.");
        describe_counter!(
            "ingest_feeds_skipped_total",
            "Feeds skipped due to fetch or parse-level faults."
        );
        describe_counter!(
            "ingest_items_parsed_total",
            "Raw items extracted from feed documents, before normalization."
        );
        describe_counter!(
            "ingest_items_kept_total",
            "Items surviving normalization across all feeds."
        );
        describe_counter!("ingest_runs_total", "Completed ingestion cycles.");
        describe_gauge!(
            "ingest_last_run_ts",
            "Unix ts when the ingest cycle last ran."
        );
    });
}

/// Outcome of one feed within a cycle. Skips carry a reason for logging and
/// observability but never abort the cycle; the next scheduled run is the
/// retry mechanism.
#[derive(Debug)]
pub enum FeedOutcome {
    Fetched(Vec<Article>),
    Skipped(String),
}

/// Display label for a feed's `source` field: the URL host when it parses,
/// the raw URL otherwise.
pub fn feed_label(feed_url: &str) -> String {
    url::Url::parse(feed_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| feed_url.to_string())
}

/// Fetch and parse every feed of one subject independently. A fetch fault
/// or an empty extraction skips that feed only.
pub async fn collect_subject_feeds(
    fetcher: &dyn FeedFetcher,
    feed_urls: &[String],
) -> Vec<(String, FeedOutcome)> {
    let mut outcomes = Vec::with_capacity(feed_urls.len());
    for url in feed_urls {
        let outcome = match fetcher.fetch(url).await {
            Ok(body) => {
                let raw = parser::detect(&body, &feed_label(url)).into_raw();
                counter!("ingest_items_parsed_total").increment(raw.len() as u64);
                let items = normalize::normalize_batch_now(raw);
                if items.is_empty() {
                    FeedOutcome::Skipped("no extractable items".to_string())
                } else {
                    FeedOutcome::Fetched(items)
                }
            }
            Err(e) => FeedOutcome::Skipped(format!("{e:#}")),
        };
        outcomes.push((url.clone(), outcome));
    }
    outcomes
}

/// Flatten the successful outcomes into one batch, logging and counting the
/// skips.
pub fn flatten_outcomes(subject: &str, outcomes: Vec<(String, FeedOutcome)>) -> Vec<Article> {
    let mut batch = Vec::new();
    for (feed, outcome) in outcomes {
        match outcome {
            FeedOutcome::Fetched(mut items) => {
                counter!("ingest_feeds_fetched_total").increment(1);
                batch.append(&mut items);
            }
            FeedOutcome::Skipped(reason) => {
                tracing::warn!(target: "ingest", subject = %subject, feed = %feed, reason = %reason, "feed skipped");
                counter!("ingest_feeds_skipped_total").increment(1);
            }
        }
    }
    batch
}

/// Ingest one subject: fetch all its feeds, merge the union against the
/// stored set, save with the fixed TTL.
pub async fn ingest_subject(
    fetcher: &dyn FeedFetcher,
    store: &dyn SubjectStore,
    subject: &str,
    feed_urls: &[String],
) -> anyhow::Result<usize> {
    let outcomes = collect_subject_feeds(fetcher, feed_urls).await;
    let batch = flatten_outcomes(subject, outcomes);
    counter!("ingest_items_kept_total").increment(batch.len() as u64);

    let existing = store.load(subject).await?;
    let ranked = crate::rank::merge(batch, existing);
    store.save(subject, &ranked, STORE_TTL).await?;
    Ok(ranked.len())
}

/// Run one full ingestion cycle over every configured subject. A store
/// fault for one subject is logged and does not stop the others.
pub async fn run_cycle(
    fetcher: &dyn FeedFetcher,
    store: &dyn SubjectStore,
    config: &IngestConfig,
) {
    ensure_metrics_described();

    for (subject, feed_urls) in &config.subjects {
        match ingest_subject(fetcher, store, subject, feed_urls).await {
            Ok(size) => {
                tracing::info!(target: "ingest", subject = %subject, size, "subject refreshed");
            }
            Err(e) => {
                tracing::warn!(target: "ingest", subject = %subject, error = ?e, "subject store error");
            }
        }
    }

    let now = chrono::Utc::now().timestamp().max(0) as u64;
    counter!("ingest_runs_total").increment(1);
    gauge!("ingest_last_run_ts").set(now as f64);
}
