//! Mermaid chart rendering tool definition.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::core::protocol::ContentItem;
use crate::domains::tools::{
    ToolDescriptor, ToolError, ToolHandler, ToolResult, ValidatedArguments,
};
use crate::services::ChartRenderer;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the chart rendering tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RenderMermaidChartParams {
    /// Mermaid diagram code to render.
    pub mermaid_code: String,

    /// Where to write the rendered PNG. ".png" is appended when missing.
    pub output_path: String,

    /// Rendering theme; the server default applies when absent.
    pub theme: Option<String>,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Renders Mermaid code to PNG through the Mermaid Chart API.
pub struct RenderMermaidChartTool {
    renderer: Arc<dyn ChartRenderer>,
    default_theme: String,
}

impl RenderMermaidChartTool {
    pub const NAME: &'static str = "render_mermaid_chart";

    pub const DESCRIPTION: &'static str = "Render a Mermaid diagram to a PNG file using the \
        Mermaid Chart service. The diagram is stored as a document in the account's first \
        project; the result reports the output path and the created document id.";

    pub fn new(renderer: Arc<dyn ChartRenderer>, default_theme: impl Into<String>) -> Self {
        Self {
            renderer,
            default_theme: default_theme.into(),
        }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new::<RenderMermaidChartParams>(Self::NAME, Self::DESCRIPTION)
    }

    #[instrument(skip_all, fields(output = %params.output_path))]
    async fn execute(&self, params: RenderMermaidChartParams) -> ToolResult {
        if params.mermaid_code.trim().is_empty() {
            return Err(ToolError::invalid_arguments("mermaid_code cannot be empty"));
        }
        if params.output_path.trim().is_empty() {
            return Err(ToolError::invalid_arguments("output_path cannot be empty"));
        }

        let theme = params.theme.as_deref().unwrap_or(&self.default_theme);
        let (png, document_id) = self.renderer.render_png(&params.mermaid_code, theme).await?;

        let mut output = PathBuf::from(&params.output_path);
        if output.extension().is_none_or(|ext| ext != "png") {
            let mut name = output.as_os_str().to_os_string();
            name.push(".png");
            output = PathBuf::from(name);
        }
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&output, &png)?;
        info!(bytes = png.len(), %document_id, "chart rendered");

        let output = output.to_string_lossy().into_owned();
        let summary = serde_json::json!({
            "output_path": output,
            "document_id": document_id,
        });
        Ok(vec![
            ContentItem::text(summary.to_string()),
            ContentItem::binary_reference(output),
        ])
    }
}

#[async_trait]
impl ToolHandler for RenderMermaidChartTool {
    async fn invoke(&self, args: ValidatedArguments) -> ToolResult {
        self.execute(args.parse()?).await
    }
}

// ============================================================================
// Tests
// ============================================================================
