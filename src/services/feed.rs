//! RSS/Atom feed fetching and parsing.
//!
//! Feeds in the wild are too messy for a strict XML model; this module
//! extracts the handful of elements the tools need (titles, links,
//! publication dates, body HTML) with a tolerant tag scanner, handling
//! both RSS 2.0 (`<channel>`/`<item>`) and Atom (`<feed>`/`<entry>`)
//! shapes. Dates are normalized to UTC; entries whose date cannot be
//! parsed carry `None` and are left to the caller to skip.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use super::FeedSource;

/// Errors from the feed collaborator.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed server answered {status}")]
    Status { status: u16 },

    #[error("failed to parse feed: {0}")]
    Parse(String),
}

/// One article from a feed.
#[derive(Debug, Clone)]
pub struct Article {
    pub title: String,
    pub link: String,
    /// Short summary or description, as raw HTML.
    pub summary: String,
    /// Body HTML: full content where the feed carries it, summary
    /// otherwise.
    pub content: String,
    /// Publication time in UTC; `None` when missing or unparseable.
    pub published: Option<DateTime<Utc>>,
}

/// A fetched feed: its title and articles in document order.
#[derive(Debug, Clone)]
pub struct FeedChannel {
    pub title: String,
    pub articles: Vec<Article>,
}

/// Parse an RSS 2.0 or Atom document.
pub fn parse_feed(xml: &str) -> Result<FeedChannel, FeedError> {
    if let Some(channel) = first_block(xml, "channel") {
        let title = element(channel, "title").unwrap_or_else(|| "Untitled Feed".to_string());
        let articles = blocks(channel, "item").into_iter().map(rss_item).collect();
        return Ok(FeedChannel { title, articles });
    }
    if let Some(feed) = first_block(xml, "feed") {
        // Atom nests <entry> titles inside the same <feed> block, so take
        // the first <title> before any entry.
        let head = feed.split("<entry").next().unwrap_or(feed);
        let title = element(head, "title").unwrap_or_else(|| "Untitled Feed".to_string());
        let articles = blocks(feed, "entry").into_iter().map(atom_entry).collect();
        return Ok(FeedChannel { title, articles });
    }
    Err(FeedError::Parse(
        "document is neither an RSS <channel> nor an Atom <feed>".to_string(),
    ))
}

fn rss_item(item: &str) -> Article {
    let summary = element(item, "description").unwrap_or_default();
    let content = element(item, "content:encoded").unwrap_or_else(|| summary.clone());
    Article {
        title: element(item, "title").unwrap_or_else(|| "No Title".to_string()),
        link: element(item, "link").unwrap_or_default(),
        summary,
        content,
        published: element(item, "pubDate").as_deref().and_then(parse_date),
    }
}

fn atom_entry(entry: &str) -> Article {
    let summary = element(entry, "summary").unwrap_or_default();
    let content = element(entry, "content").unwrap_or_else(|| summary.clone());
    let published = element(entry, "published")
        .or_else(|| element(entry, "updated"))
        .as_deref()
        .and_then(parse_date);
    Article {
        title: element(entry, "title").unwrap_or_else(|| "No Title".to_string()),
        link: attribute(entry, "link", "href").unwrap_or_default(),
        summary,
        content,
        published,
    }
}

/// Parse an RFC 2822 (RSS) or RFC 3339 (Atom) timestamp to UTC.
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

// ============================================================================
// Tag scanning
// ============================================================================

/// Position of `<tag ...>` in `xml`, tolerating attributes.
fn open_tag(xml: &str, tag: &str) -> Option<(usize, usize)> {
    let pattern = format!("<{tag}");
    let mut from = 0;
    while let Some(rel) = xml[from..].find(&pattern) {
        let start = from + rel;
        let after = xml[start + pattern.len()..].chars().next();
        if matches!(after, Some('>') | Some(' ') | Some('\t') | Some('\n') | Some('/')) {
            let close = xml[start..].find('>')?;
            return Some((start, start + close + 1));
        }
        from = start + pattern.len();
    }
    None
}

/// Inner text of the first `<tag>...</tag>` block, or `None`.
fn first_block<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let (_, open_end) = open_tag(xml, tag)?;
    if xml[..open_end].ends_with("/>") {
        return Some("");
    }
    let close = format!("</{tag}>");
    let body = &xml[open_end..];
    // Tolerate a missing close tag by taking the rest of the document.
    Some(body.find(&close).map_or(body, |end| &body[..end]))
}

/// All `<tag>...</tag>` blocks, in document order.
fn blocks<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
    let close = format!("</{tag}>");
    let mut found = Vec::new();
    let mut rest = xml;
    while let Some((_, open_end)) = open_tag(rest, tag) {
        let body = &rest[open_end..];
        match body.find(&close) {
            Some(end) => {
                found.push(&body[..end]);
                rest = &body[end + close.len()..];
            }
            None => break,
        }
    }
    found
}

/// Text content of the first `<tag>` element, CDATA unwrapped and trimmed.
fn element(xml: &str, tag: &str) -> Option<String> {
    let body = first_block(xml, tag)?;
    let body = body.trim();
    let body = body
        .strip_prefix("<![CDATA[")
        .and_then(|b| b.strip_suffix("]]>"))
        .unwrap_or(body);
    Some(body.trim().to_string())
}

/// Value of `attr` on the first `<tag ...>` element.
fn attribute(xml: &str, tag: &str, attr: &str) -> Option<String> {
    let (start, end) = open_tag(xml, tag)?;
    let opening = &xml[start..end];
    let needle = format!("{attr}=\"");
    let at = opening.find(&needle)? + needle.len();
    let rest = &opening[at..];
    rest.find('"').map(|q| rest[..q].to_string())
}

// ============================================================================
// Client
// ============================================================================

/// Fetches feeds over HTTP.
pub struct FeedClient {
    client: reqwest::Client,
}

impl FeedClient {
    pub fn new(timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch(&self, url: &str) -> Result<FeedChannel, FeedError> {
        debug!(%url, "fetching feed");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        let channel = parse_feed(&body)?;
        info!(title = %channel.title, articles = channel.articles.len(), "feed fetched");
        Ok(channel)
    }
}

// ============================================================================
// Tests
// ============================================================================
