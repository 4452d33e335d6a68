//! RSS feed tool server entry point.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use toolhost::core::logging;
use toolhost::domains::tools::definitions::FetchRssToMarkdownTool;
use toolhost::domains::tools::ToolRegistry;
use toolhost::services::FeedClient;
use toolhost::{Config, ServerSession};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init(&config.logging.level);
    info!(
        "Starting {} v{} (rss2md)",
        config.server.name, config.server.version
    );

    let client = Arc::new(FeedClient::new(Duration::from_secs(
        config.rss.fetch_timeout_secs,
    ))?);

    let mut registry = ToolRegistry::new();
    registry.register(
        FetchRssToMarkdownTool::descriptor(),
        Arc::new(FetchRssToMarkdownTool::new(client)),
    )?;

    let mut session = ServerSession::new("rss2md-server", registry);
    session.run_stdio().await?;

    info!("Server shutting down");
    Ok(())
}
