//! Document template tool server entry point.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use toolhost::core::logging;
use toolhost::domains::tools::definitions::{
    ConvertToPdfTool, GetTemplateKeysTool, ProcessTemplateTool,
};
use toolhost::domains::tools::ToolRegistry;
use toolhost::services::PdfConverter;
use toolhost::{Config, ServerSession};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init(&config.logging.level);
    info!(
        "Starting {} v{} (template)",
        config.server.name, config.server.version
    );

    let converter = Arc::new(PdfConverter::new(config.template.soffice_binary.clone()));

    let mut registry = ToolRegistry::new();
    registry.register(ProcessTemplateTool::descriptor(), ProcessTemplateTool::new())?;
    registry.register(GetTemplateKeysTool::descriptor(), GetTemplateKeysTool::new())?;
    registry.register(
        ConvertToPdfTool::descriptor(),
        Arc::new(ConvertToPdfTool::new(converter)),
    )?;

    let mut session = ServerSession::new("template-server", registry);
    session.run_stdio().await?;

    info!("Server shutting down");
    Ok(())
}
