// src/ingest/types.rs
use anyhow::Result;

/// A validated article as stored and served. Field names are part of the
/// store's wire format — do not rename without migrating stored sets.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    /// Canonical identity; absolute http(s) URL.
    pub url: String,
    /// Feed or origin label; may be empty.
    pub source: String,
    /// RFC 3339 instant, millisecond precision, `Z` suffix.
    pub published_at: String,
    /// Sanitized topic metadata (not the partition key).
    pub subject: String,
}

/// Loosely-typed field bag as it arrives from feeds or the push API.
/// Each field accepts the spellings both feed dialects and older push
/// clients use; when a bag carries several spellings at once the first in
/// the chain wins. Missing and non-string fields default to empty.
#[derive(Debug, Clone, Default)]
pub struct RawArticle {
    pub title: String,
    /// `url`, or `link`.
    pub url: String,
    /// `source`, or `feed`.
    pub source: String,
    /// `publishedAt`, `pubDate`, `date`, `published`, or `updated`.
    pub published_at: String,
    /// `subject`, or `topic`.
    pub subject: String,
}

impl<'de> serde::Deserialize<'de> for RawArticle {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let map = serde_json::Map::deserialize(deserializer)?;
        let pick = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| map.get(*name).and_then(serde_json::Value::as_str))
                .unwrap_or_default()
                .to_string()
        };
        Ok(RawArticle {
            title: pick(&["title"]),
            url: pick(&["url", "link"]),
            source: pick(&["source", "feed"]),
            published_at: pick(&["publishedAt", "pubDate", "date", "published", "updated"]),
            subject: pick(&["subject", "topic"]),
        })
    }
}

/// Fetches one feed document. The implementation owns timeouts; callers
/// treat any error as a per-feed skip.
#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}
