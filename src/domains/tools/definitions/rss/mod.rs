//! RSS feed tool definitions.

pub mod fetch_markdown;

pub use fetch_markdown::FetchRssToMarkdownTool;
