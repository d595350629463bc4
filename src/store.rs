// src/store.rs
//! Subject Store Adapter: ranked sets keyed by sanitized subject, with a
//! retention TTL applied on every write.
//!
//! The external key-value transport is out of scope; `SubjectStore` is the
//! seam, and `MemoryStore` is the shipped implementation holding the same
//! serialized payloads an external KV would hold.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::ingest::types::Article;
use crate::sanitize::sanitize;

/// Retention window; any subject not rewritten within it reads back empty.
pub const STORE_TTL: Duration = Duration::from_secs(604_800);

const KEY_PREFIX: &str = "news-";

/// Store entry key: fixed namespace prefix plus the sanitized subject.
pub fn subject_key(subject: &str) -> String {
    format!("{KEY_PREFIX}{}", sanitize(subject))
}

/// Reads and writes a subject's serialized ranked set. A missing or expired
/// key is "no prior data", never a fault; errors are transport-level only.
#[async_trait::async_trait]
pub trait SubjectStore: Send + Sync {
    async fn load(&self, subject: &str) -> Result<Vec<Article>>;
    async fn save(&self, subject: &str, items: &[Article], ttl: Duration) -> Result<()>;
}

struct Entry {
    payload: String,
    expires_at: Instant,
}

/// In-memory store with per-entry absolute expiry.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SubjectStore for MemoryStore {
    async fn load(&self, subject: &str) -> Result<Vec<Article>> {
        let key = subject_key(subject);
        let payload = {
            let mut map = self.entries.lock().expect("store mutex poisoned");
            match map.get(&key) {
                Some(entry) if entry.expires_at > Instant::now() => entry.payload.clone(),
                Some(_) => {
                    // Lazy expiry on read, like a KV with passive eviction.
                    map.remove(&key);
                    return Ok(Vec::new());
                }
                None => return Ok(Vec::new()),
            }
        };
        serde_json::from_str(&payload).with_context(|| format!("decoding stored set {key}"))
    }

    async fn save(&self, subject: &str, items: &[Article], ttl: Duration) -> Result<()> {
        let key = subject_key(subject);
        let payload = serde_json::to_string(items).context("encoding ranked set")?;
        let mut map = self.entries.lock().expect("store mutex poisoned");
        map.insert(
            key,
            Entry {
                payload,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}
