//! Docker health-check tool definition.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::core::protocol::ContentItem;
use crate::domains::tools::{ToolDescriptor, ToolHandler, ToolResult, ValidatedArguments};
use crate::services::HealthCheck;

/// Parameters for the health-check tool. Takes nothing.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CheckDockerParams {}

/// Reports whether the rendering container is up.
pub struct CheckDockerTool {
    health: Arc<dyn HealthCheck>,
}

impl CheckDockerTool {
    pub const NAME: &'static str = "check_docker";

    pub const DESCRIPTION: &'static str =
        "Check whether Docker and the PlantUML rendering container are running.";

    pub fn new(health: Arc<dyn HealthCheck>) -> Self {
        Self { health }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new::<CheckDockerParams>(Self::NAME, Self::DESCRIPTION)
    }

    async fn execute(&self, _params: CheckDockerParams) -> ToolResult {
        let message = if self.health.is_ready().await {
            "Docker is running."
        } else {
            "Docker is not running."
        };
        Ok(vec![ContentItem::text(message)])
    }
}

#[async_trait]
impl ToolHandler for CheckDockerTool {
    async fn invoke(&self, args: ValidatedArguments) -> ToolResult {
        self.execute(args.parse()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::StartupError;

    struct FixedHealth(bool);

    #[async_trait]
    impl HealthCheck for FixedHealth {
        async fn is_ready(&self) -> bool {
            self.0
        }

        async fn ensure_started(&self) -> Result<(), StartupError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn reports_running_and_not_running() {
        let up = CheckDockerTool::new(Arc::new(FixedHealth(true)));
        let content = up.execute(CheckDockerParams {}).await.unwrap();
        assert!(matches!(&content[0], ContentItem::Text(t) if t == "Docker is running."));

        let down = CheckDockerTool::new(Arc::new(FixedHealth(false)));
        let content = down.execute(CheckDockerParams {}).await.unwrap();
        assert!(matches!(&content[0], ContentItem::Text(t) if t == "Docker is not running."));
    }
}
