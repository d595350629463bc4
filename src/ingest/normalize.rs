// src/ingest/normalize.rs
//! Field Normalizer: raw field bags in, validated `Article`s out.
//!
//! Field-level defects resolve by defaulting; only identity-invalid items
//! (empty title or non-http(s) URL) are dropped.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use time::format_description::well_known::Rfc2822;
use time::OffsetDateTime;

use crate::ingest::types::{Article, RawArticle};
use crate::sanitize::sanitize;

/// Max title length in chars; longer titles are cut, not dropped.
pub const MAX_TITLE_LEN: usize = 240;

/// Normalize a batch against a fixed `now` instant. Order-preserving among
/// survivors; items failing `title non-empty && url is http(s)` are dropped.
pub fn normalize_batch(raw: Vec<RawArticle>, now: DateTime<Utc>) -> Vec<Article> {
    raw.into_iter()
        .filter_map(|bag| normalize_one(bag, now))
        .collect()
}

/// Batch normalization against the current instant.
pub fn normalize_batch_now(raw: Vec<RawArticle>) -> Vec<Article> {
    normalize_batch(raw, Utc::now())
}

fn normalize_one(bag: RawArticle, now: DateTime<Utc>) -> Option<Article> {
    let title = cap_chars(bag.title.trim(), MAX_TITLE_LEN);
    if title.is_empty() {
        return None;
    }

    let url = bag.url.trim().to_string();
    if !is_http_url(&url) {
        return None;
    }

    Some(Article {
        title,
        url,
        source: bag.source.trim().to_string(),
        published_at: coerce_published(&bag.published_at, now),
        subject: sanitize(bag.subject.trim()),
    })
}

/// True when the value parses as an absolute `http` or `https` URL with a host.
pub fn is_http_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.has_host(),
        Err(_) => false,
    }
}

/// Coerce a raw date field to an RFC 3339 instant (millisecond precision,
/// `Z` suffix). Empty or unparsable values fall back to `now` — a missing
/// date is a defect, never an error.
pub fn coerce_published(raw: &str, now: DateTime<Utc>) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return to_iso_millis(now);
    }
    match parse_instant(raw) {
        Some(dt) => to_iso_millis(dt),
        None => to_iso_millis(now),
    }
}

/// Parse a calendar timestamp in the formats feeds actually emit:
/// RFC 3339 (Atom), RFC 2822 (RSS `pubDate`), then bare date/datetime forms.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc2822) {
        return Utc.timestamp_opt(dt.unix_timestamp(), dt.nanosecond()).single();
    }
    // Real feeds still emit the obsolete zone names ("GMT", "UT") the strict
    // RFC 2822 grammar deprecates; chrono accepts them.
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    None
}

fn to_iso_millis(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn cap_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        s.chars().take(max).collect()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn trims_title_and_formats_bare_date() {
        let raw = RawArticle {
            title: " Hi ".into(),
            url: "https://e.com".into(),
            published_at: "2025-01-01".into(),
            ..Default::default()
        };
        let out = normalize_batch(vec![raw], fixed_now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Hi");
        assert_eq!(out[0].published_at, "2025-01-01T00:00:00.000Z");
    }

    #[test]
    fn drops_empty_title_and_non_http_urls() {
        let bags = vec![
            RawArticle {
                title: "   ".into(),
                url: "https://e.com/a".into(),
                ..Default::default()
            },
            RawArticle {
                title: "No scheme".into(),
                url: "e.com/b".into(),
                ..Default::default()
            },
            RawArticle {
                title: "Wrong scheme".into(),
                url: "ftp://x".into(),
                ..Default::default()
            },
        ];
        assert!(normalize_batch(bags, fixed_now()).is_empty());
    }

    #[test]
    fn unparsable_date_defaults_to_now_and_item_is_kept() {
        let raw = RawArticle {
            title: "Kept".into(),
            url: "http://e.com/x".into(),
            published_at: "not a date".into(),
            ..Default::default()
        };
        let out = normalize_batch(vec![raw], fixed_now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].published_at, "2025-06-01T12:00:00.000Z");
    }

    #[test]
    fn rfc2822_pubdate_is_accepted() {
        let got = coerce_published("Wed, 01 Jan 2025 06:30:00 GMT", fixed_now());
        assert_eq!(got, "2025-01-01T06:30:00.000Z");
    }

    #[test]
    fn title_is_capped_not_dropped() {
        let raw = RawArticle {
            title: "x".repeat(500),
            url: "https://e.com/long".into(),
            ..Default::default()
        };
        let out = normalize_batch(vec![raw], fixed_now());
        assert_eq!(out[0].title.chars().count(), MAX_TITLE_LEN);
    }

    #[test]
    fn subject_metadata_is_sanitized() {
        let raw = RawArticle {
            title: "T".into(),
            url: "https://e.com/s".into(),
            subject: "US Economy".into(),
            ..Default::default()
        };
        let out = normalize_batch(vec![raw], fixed_now());
        assert_eq!(out[0].subject, "us-economy");
    }
}
