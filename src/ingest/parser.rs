// src/ingest/parser.rs
//! Tolerant RSS/Atom extraction.
//!
//! This is deliberately a schema-free scan, not a conforming XML parser:
//! a malformed tag degrades to partial or empty extraction instead of
//! aborting the whole feed. `parse_feed` never fails — documents matching
//! neither dialect yield an empty batch.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::ingest::normalize::normalize_batch;
use crate::ingest::types::{Article, RawArticle};

/// Detection outcome, in priority order: RSS `<item>` blocks win over Atom
/// `<entry>` blocks; a document with neither is `Empty`.
#[derive(Debug, Clone)]
pub enum ParsedFeed {
    Rss(Vec<RawArticle>),
    Atom(Vec<RawArticle>),
    Empty,
}

impl ParsedFeed {
    pub fn into_raw(self) -> Vec<RawArticle> {
        match self {
            ParsedFeed::Rss(v) | ParsedFeed::Atom(v) => v,
            ParsedFeed::Empty => Vec::new(),
        }
    }
}

fn re(cell: &'static OnceCell<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static feed regex"))
}

macro_rules! feed_re {
    ($pattern:expr) => {{
        static RE: OnceCell<Regex> = OnceCell::new();
        re(&RE, $pattern)
    }};
}

/// Extract raw field bags from a syndication document, tagging the dialect.
pub fn detect(document: &str, source_label: &str) -> ParsedFeed {
    let item_re = feed_re!(r"(?is)<item(?:\s[^>]*)?>(.*?)</item>");
    let rss: Vec<RawArticle> = item_re
        .captures_iter(document)
        .map(|c| rss_item_fields(c.get(1).map_or("", |m| m.as_str()), source_label))
        .collect();
    if !rss.is_empty() {
        return ParsedFeed::Rss(rss);
    }

    let entry_re = feed_re!(r"(?is)<entry(?:\s[^>]*)?>(.*?)</entry>");
    let atom: Vec<RawArticle> = entry_re
        .captures_iter(document)
        .map(|c| atom_entry_fields(c.get(1).map_or("", |m| m.as_str()), source_label))
        .collect();
    if !atom.is_empty() {
        return ParsedFeed::Atom(atom);
    }

    ParsedFeed::Empty
}

/// Parse a feed document and normalize the extracted bags against `now`.
pub fn parse_feed(document: &str, source_label: &str, now: DateTime<Utc>) -> Vec<Article> {
    normalize_batch(detect(document, source_label).into_raw(), now)
}

/// `parse_feed` against the current instant.
pub fn parse_feed_now(document: &str, source_label: &str) -> Vec<Article> {
    parse_feed(document, source_label, Utc::now())
}

fn rss_item_fields(fragment: &str, source_label: &str) -> RawArticle {
    let title = first_tag_text(fragment, feed_re!(r"(?is)<title(?:\s[^>]*)?>(.*?)</title>"));
    let url = first_tag_text(fragment, feed_re!(r"(?is)<link(?:\s[^>]*)?>(.*?)</link>"));
    let published = first_tag_text(fragment, feed_re!(r"(?is)<pubDate(?:\s[^>]*)?>(.*?)</pubDate>"))
        .or_else(|| first_tag_text(fragment, feed_re!(r"(?is)<dc:date(?:\s[^>]*)?>(.*?)</dc:date>")));

    RawArticle {
        title: title.unwrap_or_default(),
        url: url.unwrap_or_default(),
        source: source_label.to_string(),
        published_at: published.unwrap_or_default(),
        subject: String::new(),
    }
}

fn atom_entry_fields(fragment: &str, source_label: &str) -> RawArticle {
    let title = first_tag_text(fragment, feed_re!(r"(?is)<title(?:\s[^>]*)?>(.*?)</title>"));
    // Self-describing link: href lives in an attribute, the element is empty.
    let href = feed_re!(r#"(?is)<link\b[^>]*?href\s*=\s*["']([^"']+)["'][^>]*/?>"#)
        .captures(fragment)
        .and_then(|c| c.get(1))
        .map(|m| decode_entities(m.as_str().trim()));
    let url = href.or_else(|| first_tag_text(fragment, feed_re!(r"(?is)<id(?:\s[^>]*)?>(.*?)</id>")));
    let published = first_tag_text(fragment, feed_re!(r"(?is)<updated(?:\s[^>]*)?>(.*?)</updated>"))
        .or_else(|| {
            first_tag_text(fragment, feed_re!(r"(?is)<published(?:\s[^>]*)?>(.*?)</published>"))
        });

    RawArticle {
        title: title.unwrap_or_default(),
        url: url.unwrap_or_default(),
        source: source_label.to_string(),
        published_at: published.unwrap_or_default(),
        subject: String::new(),
    }
}

fn first_tag_text(fragment: &str, re: &Regex) -> Option<String> {
    re.captures(fragment)
        .and_then(|c| c.get(1))
        .map(|m| decode_entities(m.as_str().trim()))
}

/// Decode the five standard XML character references and nothing else.
/// `&amp;` goes last so `&amp;lt;` decodes exactly once.
fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
