//! Mermaid Chart tool server entry point.
//!
//! The API token is required: without it every call would fail, so a
//! missing token aborts startup with a clear message.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use toolhost::core::logging;
use toolhost::domains::tools::definitions::RenderMermaidChartTool;
use toolhost::domains::tools::ToolRegistry;
use toolhost::services::MermaidChartClient;
use toolhost::{Config, ServerSession};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init(&config.logging.level);
    info!(
        "Starting {} v{} (mermaid)",
        config.server.name, config.server.version
    );

    let token = config
        .mermaid
        .access_token
        .as_deref()
        .ok_or_else(|| toolhost::Error::config("MERMAID_ACCESS_TOKEN is not set"))?;
    let client = Arc::new(MermaidChartClient::new(
        config.mermaid.base_url.clone(),
        token,
    )?);

    let mut registry = ToolRegistry::new();
    registry.register(
        RenderMermaidChartTool::descriptor(),
        Arc::new(RenderMermaidChartTool::new(
            client,
            config.mermaid.default_theme.clone(),
        )),
    )?;

    let mut session = ServerSession::new("mermaid-server", registry);
    session.run_stdio().await?;

    info!("Server shutting down");
    Ok(())
}
