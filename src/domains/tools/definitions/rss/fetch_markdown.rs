//! Feed-to-Markdown tool definition.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::core::protocol::ContentItem;
use crate::domains::tools::{
    ToolDescriptor, ToolError, ToolHandler, ToolResult, ValidatedArguments,
};
use crate::services::markdown::html_to_markdown;
use crate::services::FeedSource;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the feed fetch tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FetchRssToMarkdownParams {
    /// URL of the RSS or Atom feed. Must be http:// or https://.
    pub rss_url: String,

    /// Keep articles published on or after this date, interpreted as
    /// UTC. Accepts "YYYY-MM-DD", "YYYY-MM-DDTHH:MM:SS", or a full
    /// RFC 3339 timestamp. Mutually exclusive with `filter_last_days`.
    pub filter_since_date: Option<String>,

    /// Keep articles published within this many days, counted back from
    /// now. Must be positive. Mutually exclusive with
    /// `filter_since_date`.
    pub filter_last_days: Option<u32>,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Fetches a feed, filters its articles by publication date, and renders
/// the survivors as one Markdown document.
pub struct FetchRssToMarkdownTool {
    source: Arc<dyn FeedSource>,
}

impl FetchRssToMarkdownTool {
    pub const NAME: &'static str = "fetch_rss_to_markdown";

    pub const DESCRIPTION: &'static str = "Fetch an RSS or Atom feed and return its articles as \
        a single Markdown document. Exactly one date filter must be given: filter_since_date \
        keeps articles published on or after that date, filter_last_days keeps articles from the \
        last N days. Articles without a parseable publication date are skipped.";

    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self { source }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new::<FetchRssToMarkdownParams>(Self::NAME, Self::DESCRIPTION)
    }

    #[instrument(skip_all, fields(url = %params.rss_url))]
    async fn execute(&self, params: FetchRssToMarkdownParams) -> ToolResult {
        if !params.rss_url.starts_with("http://") && !params.rss_url.starts_with("https://") {
            return Err(ToolError::invalid_arguments(
                "rss_url must start with http:// or https://",
            ));
        }

        let cutoff = match (&params.filter_since_date, params.filter_last_days) {
            (Some(_), Some(_)) => {
                return Err(ToolError::invalid_arguments(
                    "Provide either filter_since_date or filter_last_days, not both",
                ));
            }
            (None, None) => {
                return Err(ToolError::invalid_arguments(
                    "Exactly one of filter_since_date or filter_last_days is required",
                ));
            }
            (Some(since), None) => parse_cutoff(since).ok_or_else(|| {
                ToolError::invalid_arguments(format!(
                    "Unparseable filter_since_date: {since:?} (expected YYYY-MM-DD or an ISO timestamp)"
                ))
            })?,
            (None, Some(days)) => {
                if days == 0 {
                    return Err(ToolError::invalid_arguments(
                        "filter_last_days must be greater than zero",
                    ));
                }
                Utc::now() - chrono::Duration::days(i64::from(days))
            }
        };

        let channel = self.source.fetch(&params.rss_url).await?;
        let (document, kept) = render_document(&channel.title, &channel.articles, cutoff);
        info!(
            articles = channel.articles.len(),
            kept,
            "feed rendered to markdown"
        );

        Ok(vec![ContentItem::text(document)])
    }
}

#[async_trait]
impl ToolHandler for FetchRssToMarkdownTool {
    async fn invoke(&self, args: ValidatedArguments) -> ToolResult {
        self.execute(args.parse()?).await
    }
}

/// Parse a user-supplied cutoff date. Bare dates mean midnight UTC.
fn parse_cutoff(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render the articles at or after `cutoff` as one Markdown document.
/// Returns the document and the number of articles kept.
fn render_document(
    feed_title: &str,
    articles: &[crate::services::feed::Article],
    cutoff: DateTime<Utc>,
) -> (String, usize) {
    let mut sections = Vec::new();
    for article in articles {
        // Undated articles cannot be placed against the cutoff; skip them.
        let Some(published) = article.published else {
            continue;
        };
        if published < cutoff {
            continue;
        }
        sections.push(format!(
            "## {}\n**Published:** {}\n**Link:** <{}>\n**Description:** {}\n\n**Content:**\n\n{}\n\n---",
            article.title,
            published.format("%Y-%m-%d %H:%M:%S UTC"),
            article.link,
            html_to_markdown(&article.summary),
            html_to_markdown(&article.content),
        ));
    }

    let kept = sections.len();
    let document = if sections.is_empty() {
        format!("# {feed_title}\n\nNo articles found matching the specified date filter.")
    } else {
        format!("# {feed_title}\n\n{}", sections.join("\n\n"))
    };
    (document, kept)
}

// ============================================================================
// Tests
// ============================================================================
