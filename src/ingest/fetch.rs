// src/ingest/fetch.rs
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

use crate::ingest::types::FeedFetcher;

/// Feed fetcher backed by a shared reqwest client. The per-request timeout
/// comes from the ingest configuration, so one stalled feed cannot hold a
/// cycle hostage.
pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("feed http get {url}"))?;
        if !resp.status().is_success() {
            return Err(anyhow!("feed {url} returned {}", resp.status()));
        }
        resp.text().await.with_context(|| format!("feed body {url}"))
    }
}
