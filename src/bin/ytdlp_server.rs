//! YouTube tool server entry point.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use toolhost::core::logging;
use toolhost::domains::tools::definitions::{YoutubeChaptersTool, YoutubeSubtitlesTool};
use toolhost::domains::tools::ToolRegistry;
use toolhost::services::ytdlp::YtDlp;
use toolhost::{Config, ServerSession};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init(&config.logging.level);
    info!(
        "Starting {} v{} (ytdlp)",
        config.server.name, config.server.version
    );

    let ytdlp = Arc::new(YtDlp::new(config.ytdlp.binary.clone()));

    let mut registry = ToolRegistry::new();
    registry.register(
        YoutubeChaptersTool::descriptor(),
        Arc::new(YoutubeChaptersTool::new(ytdlp.clone())),
    )?;
    registry.register(
        YoutubeSubtitlesTool::descriptor(),
        Arc::new(YoutubeSubtitlesTool::new(ytdlp)),
    )?;

    let mut session = ServerSession::new("ytdlp-server", registry);
    session.run_stdio().await?;

    info!("Server shutting down");
    Ok(())
}
