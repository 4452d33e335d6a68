//! Diagram rendering tool definition.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::core::protocol::ContentItem;
use crate::domains::tools::{
    ToolDescriptor, ToolError, ToolHandler, ToolResult, ValidatedArguments,
};
use crate::services::{ContentResolver, OutputFormat, RenderBackend};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the diagram rendering tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RenderDiagramParams {
    /// Diagram source: a path to a .puml file, or the file's content
    /// base64-encoded.
    pub input: String,

    /// Where to write the rendered diagram. The file extension selects
    /// the output format (png, svg, pdf); PNG when unrecognized.
    pub output_path: String,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Renders PlantUML source through the rendering backend.
pub struct RenderDiagramTool {
    backend: Arc<dyn RenderBackend>,
}

impl RenderDiagramTool {
    /// Tool name as registered.
    pub const NAME: &'static str = "render_diagram";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Render a PlantUML diagram to PNG, SVG, or PDF. \
        Accepts a path to a .puml file or base64-encoded diagram source; the output format \
        follows the output path extension.";

    pub fn new(backend: Arc<dyn RenderBackend>) -> Self {
        Self { backend }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new::<RenderDiagramParams>(Self::NAME, Self::DESCRIPTION)
    }

    #[instrument(skip_all, fields(output = %params.output_path))]
    async fn execute(&self, params: RenderDiagramParams) -> ToolResult {
        let resolved = ContentResolver::resolve_input(&params.input, ".puml")?;
        let source = std::fs::read_to_string(resolved.path())?;
        if source.trim().is_empty() {
            return Err(ToolError::invalid_arguments("diagram source is empty"));
        }

        let format = OutputFormat::from_extension(&params.output_path);
        let bytes = self.backend.execute(&source, format).await?;

        let output = Path::new(&params.output_path);
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(output, &bytes)?;
        info!(bytes = bytes.len(), "diagram rendered");

        Ok(vec![
            ContentItem::text(format!("Diagram rendered to {}", params.output_path)),
            ContentItem::binary_reference(params.output_path),
        ])
    }
}

#[async_trait]
impl ToolHandler for RenderDiagramTool {
    async fn invoke(&self, args: ValidatedArguments) -> ToolResult {
        self.execute(args.parse()?).await
    }
}

// ============================================================================
// Tests
// ============================================================================
