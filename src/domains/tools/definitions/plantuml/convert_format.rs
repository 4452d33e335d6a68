//! Format conversion tool definition.
//!
//! Re-renders an existing diagram source into an explicitly requested
//! format, independent of any output file extension.

use std::path::{Path, PathBuf};
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

/// Parameters for the format conversion tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ConvertFormatParams {
    /// Diagram source: a path to a .puml file, or the file's content
    /// base64-encoded.
    pub input: String,

    /// Target format: "png", "svg", or "pdf".
    pub format: String,

    /// Where to write the result. Defaults to the input path with the
    /// target extension; required semantics differ for inline input, see
    /// the tool description.
    pub output_path: Option<String>,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Converts PlantUML source into an explicitly named format.
pub struct ConvertFormatTool {
    backend: Arc<dyn RenderBackend>,
}

impl ConvertFormatTool {
    pub const NAME: &'static str = "convert_format";

    pub const DESCRIPTION: &'static str = "Convert a PlantUML diagram to an explicit output \
        format (png, svg, or pdf). Without an output path the result lands next to the input \
        file; for base64 input the result is returned base64-encoded instead.";

    pub fn new(backend: Arc<dyn RenderBackend>) -> Self {
        Self { backend }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new::<ConvertFormatParams>(Self::NAME, Self::DESCRIPTION)
    }

    #[instrument(skip_all, fields(format = %params.format))]
    async fn execute(&self, params: ConvertFormatParams) -> ToolResult {
        let format = OutputFormat::parse(&params.format)
            .ok_or_else(|| ToolError::invalid_arguments(format!(
                "unsupported output format: {}",
                params.format
            )))?;

        let resolved = ContentResolver::resolve_input(&params.input, ".puml")?;
        let source = std::fs::read_to_string(resolved.path())?;
        if source.trim().is_empty() {
            return Err(ToolError::invalid_arguments("diagram source is empty"));
        }
        let bytes = self.backend.execute(&source, format).await?;

        let output_path = match params.output_path {
            Some(path) => Some(PathBuf::from(path)),
            None if resolved.is_temp() => None,
            None => Some(resolved.path().with_extension(format.extension())),
        };

        match output_path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                std::fs::write(&path, &bytes)?;
                let path = path.to_string_lossy().into_owned();
                info!(%path, bytes = bytes.len(), "diagram converted");
                Ok(vec![
                    ContentItem::text(format!("Diagram converted to {path}")),
                    ContentItem::binary_reference(path),
                ])
            }
            None => {
                // Inline input without a destination: hand the result back
                // inline too.
                let scratch = tempfile::Builder::new()
                    .suffix(&format!(".{}", format.extension()))
                    .tempfile()?;
                std::fs::write(scratch.path(), &bytes)?;
                let encoded = ContentResolver::encode_file(scratch.path())?;
                info!(bytes = bytes.len(), "diagram converted inline");
                Ok(vec![ContentItem::text(encoded)])
            }
        }
    }
}

#[async_trait]
impl ToolHandler for ConvertFormatTool {
    async fn invoke(&self, args: ValidatedArguments) -> ToolResult {
        self.execute(args.parse()?).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::plantuml::RenderError;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use std::io::Write;

    struct FakeBackend;

    #[async_trait]
    impl RenderBackend for FakeBackend {
        async fn execute(
            &self,
            _source: &str,
            _format: OutputFormat,
        ) -> Result<Vec<u8>, RenderError> {
            Ok(b"converted".to_vec())
        }
    }

    fn tool() -> ConvertFormatTool {
        ConvertFormatTool::new(Arc::new(FakeBackend))
    }

    #[tokio::test]
    async fn unknown_format_is_invalid_arguments() {
        let err = tool()
            .execute(ConvertFormatParams {
                input: STANDARD.encode(b"@startuml\n@enduml"),
                format: "jpeg".to_string(),
                output_path: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn path_input_defaults_to_a_sibling_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("flow.puml");
        std::fs::File::create(&input)
            .unwrap()
            .write_all(b"@startuml\nA -> B\n@enduml\n")
            .unwrap();

        let content = tool()
            .execute(ConvertFormatParams {
                input: input.to_string_lossy().into_owned(),
                format: "svg".to_string(),
                output_path: None,
            })
            .await
            .unwrap();

        let expected = dir.path().join("flow.svg");
        assert_eq!(std::fs::read(&expected).unwrap(), b"converted");
        assert!(matches!(&content[1], ContentItem::BinaryReference(p) if p.ends_with("flow.svg")));
    }

    #[tokio::test]
    async fn inline_input_without_destination_returns_base64() {
        let content = tool()
            .execute(ConvertFormatParams {
                input: STANDARD.encode(b"@startuml\nA -> B\n@enduml\n"),
                format: "png".to_string(),
                output_path: None,
            })
            .await
            .unwrap();

        let ContentItem::Text(encoded) = &content[0] else {
            panic!("expected inline text content");
        };
        assert_eq!(STANDARD.decode(encoded).unwrap(), b"converted");
    }
}
