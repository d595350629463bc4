// src/rank.rs
//! Ranked Merge Engine: dedupe, sort by recency, cap.
//!
//! Pure and deterministic. `merge(merge(a, b), vec![])` equals
//! `merge(a, b)` for already-capped inputs.

use std::collections::HashSet;

use crate::ingest::normalize::parse_instant;
use crate::ingest::types::Article;

/// Capacity of a subject's ranked set.
pub const MAX_RANKED_ITEMS: usize = 10;

/// Merge a freshly ingested batch with a subject's stored set.
///
/// New items come first in the concatenation, so on an identity collision
/// the just-ingested copy replaces the stored one. Dedupe keeps the first
/// occurrence; the sort is stable, so `publishedAt` ties preserve that
/// order. Result is `publishedAt`-descending and capped at ten.
pub fn merge(new_items: Vec<Article>, existing: Vec<Article>) -> Vec<Article> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<Article> = Vec::with_capacity(new_items.len() + existing.len());

    for item in new_items.into_iter().chain(existing) {
        if seen.insert(identity_key(&item)) {
            merged.push(item);
        }
    }

    merged.sort_by_key(|item| std::cmp::Reverse(sort_millis(&item.published_at)));
    merged.truncate(MAX_RANKED_ITEMS);
    merged
}

/// Identity key for dedupe. Normalization guarantees a non-empty `url`, but
/// stored sets written by older clients may not; an empty url keys by title.
fn identity_key(item: &Article) -> String {
    if item.url.is_empty() {
        item.title.clone()
    } else {
        item.url.clone()
    }
}

/// Comparison-only coercion: unparsable timestamps rank as epoch 0 (last).
/// The stored field is never rewritten here.
fn sort_millis(published_at: &str) -> i64 {
    parse_instant(published_at)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str, published_at: &str) -> Article {
        Article {
            title: format!("title {url}"),
            url: url.to_string(),
            source: "test".into(),
            published_at: published_at.to_string(),
            subject: "test".into(),
        }
    }

    #[test]
    fn new_item_overwrites_stored_copy_with_same_url() {
        let fresh = item("https://e.com/a", "2025-01-02T00:00:00.000Z");
        let stale = Article {
            title: "old title".into(),
            ..item("https://e.com/a", "2025-01-01T00:00:00.000Z")
        };
        let out = merge(vec![fresh.clone()], vec![stale]);
        assert_eq!(out, vec![fresh]);
    }

    #[test]
    fn unparsable_timestamps_sort_last() {
        let bad = item("https://e.com/bad", "garbage");
        let good = item("https://e.com/good", "2020-01-01T00:00:00.000Z");
        let out = merge(vec![bad.clone()], vec![good.clone()]);
        assert_eq!(out, vec![good, bad]);
    }

    #[test]
    fn ties_keep_dedupe_order() {
        let ts = "2025-03-03T03:03:03.000Z";
        let a = item("https://e.com/a", ts);
        let b = item("https://e.com/b", ts);
        let out = merge(vec![a.clone()], vec![b.clone()]);
        assert_eq!(out, vec![a, b]);
    }

    #[test]
    fn empty_url_items_key_by_title() {
        let mut a = item("", "2025-01-01T00:00:00.000Z");
        a.title = "same".into();
        let mut b = item("", "2025-01-02T00:00:00.000Z");
        b.title = "same".into();
        let out = merge(vec![a.clone()], vec![b]);
        assert_eq!(out, vec![a]);
    }
}
