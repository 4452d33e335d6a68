//! PlantUML tool server entry point.
//!
//! Brings up the rendering container before listening: a server whose
//! backend is down would fail every call, so startup fails fast instead.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use toolhost::core::logging;
use toolhost::domains::tools::definitions::{
    CheckDockerTool, ConvertFormatTool, RenderDiagramTool,
};
use toolhost::domains::tools::ToolRegistry;
use toolhost::services::{DockerService, HealthCheck, PlantumlRenderer};
use toolhost::{Config, ServerSession};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init(&config.logging.level);
    info!(
        "Starting {} v{} (plantuml)",
        config.server.name, config.server.version
    );

    let docker = Arc::new(DockerService::new(&config.plantuml));
    docker.ensure_started().await?;
    let renderer = Arc::new(PlantumlRenderer::new(config.plantuml.server_url.clone()));

    let mut registry = ToolRegistry::new();
    registry.register(
        RenderDiagramTool::descriptor(),
        Arc::new(RenderDiagramTool::new(renderer.clone())),
    )?;
    registry.register(
        ConvertFormatTool::descriptor(),
        Arc::new(ConvertFormatTool::new(renderer)),
    )?;
    registry.register(
        CheckDockerTool::descriptor(),
        Arc::new(CheckDockerTool::new(docker)),
    )?;

    let mut session = ServerSession::new("plantuml-server", registry);
    session.run_stdio().await?;

    info!("Server shutting down");
    Ok(())
}
