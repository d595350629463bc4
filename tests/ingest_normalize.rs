// tests/ingest_normalize.rs
use chrono::{TimeZone, Utc};

use topic_news_ranker::ingest::normalize::{normalize_batch, normalize_batch_now};
use topic_news_ranker::ingest::types::RawArticle;

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 5, 5, 5, 5).unwrap()
}

#[test]
fn trims_title_and_normalizes_bare_date() {
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
fn identity_invalid_items_never_survive() {
    let bags = vec![
        RawArticle {
            title: "".into(),
            url: "https://e.com/a".into(),
            ..Default::default()
        },
        RawArticle {
            title: "Ftp".into(),
            url: "ftp://x".into(),
            ..Default::default()
        },
        RawArticle {
            title: "Broken".into(),
            url: "http//nope".into(),
            ..Default::default()
        },
        RawArticle {
            title: "Good".into(),
            url: "https://e.com/good".into(),
            ..Default::default()
        },
    ];
    let out = normalize_batch(bags, fixed_now());
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].url, "https://e.com/good");
}

#[test]
fn unparsable_date_keeps_item_with_now_fallback() {
    let raw = RawArticle {
        title: "Kept".into(),
        url: "https://e.com/x".into(),
        published_at: "next Tuesday-ish".into(),
        ..Default::default()
    };
    let out = normalize_batch_now(vec![raw]);
    assert_eq!(out.len(), 1, "a bad date is a defect, not a drop");
    let parsed = chrono::DateTime::parse_from_rfc3339(&out[0].published_at)
        .expect("fallback must be valid RFC 3339");
    let age = Utc::now().signed_duration_since(parsed.with_timezone(&Utc));
    assert!(
        age.num_seconds().abs() < 60,
        "fallback should be the normalization instant"
    );
}

#[test]
fn raw_bags_accept_aliased_field_names() {
    let json = r#"[
        {"title": "A", "link": "https://e.com/a", "pubDate": "2025-01-01", "feed": "BBC", "topic": "World News"},
        {"title": "B", "url": "https://e.com/b", "updated": "2025-02-01T00:00:00Z"}
    ]"#;
    let bags: Vec<RawArticle> = serde_json::from_str(json).expect("aliases must deserialize");
    let out = normalize_batch(bags, fixed_now());
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].url, "https://e.com/a");
    assert_eq!(out[0].source, "BBC");
    assert_eq!(out[0].subject, "world-news");
    assert_eq!(out[1].published_at, "2025-02-01T00:00:00.000Z");
}

#[test]
fn order_is_preserved_among_survivors() {
    let bags = vec![
        RawArticle {
            title: "first".into(),
            url: "https://e.com/1".into(),
            ..Default::default()
        },
        RawArticle {
            title: "".into(),
            url: "https://e.com/dropped".into(),
            ..Default::default()
        },
        RawArticle {
            title: "second".into(),
            url: "https://e.com/2".into(),
            ..Default::default()
        },
    ];
    let out = normalize_batch(bags, fixed_now());
    let urls: Vec<&str> = out.iter().map(|a| a.url.as_str()).collect();
    assert_eq!(urls, vec!["https://e.com/1", "https://e.com/2"]);
}
