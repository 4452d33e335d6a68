//! PDF conversion tool definition.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::core::protocol::ContentItem;
use crate::domains::tools::{ToolDescriptor, ToolHandler, ToolResult, ValidatedArguments};
use crate::services::{ContentResolver, DocumentConverter};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the PDF conversion tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ConvertToPdfParams {
    /// Document: a path to a document file, or its content base64-encoded.
    pub input: String,

    /// Where to write the PDF. Defaults to the input path with a .pdf
    /// extension; for base64 input the PDF is returned base64-encoded
    /// instead.
    pub output_path: Option<String>,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Converts documents to PDF through the converter collaborator.
pub struct ConvertToPdfTool {
    converter: Arc<dyn DocumentConverter>,
}

impl ConvertToPdfTool {
    pub const NAME: &'static str = "convert_to_pdf";

    pub const DESCRIPTION: &'static str = "Convert a document to PDF. Accepts a file path or \
        base64-encoded document content; without an output path the PDF lands next to the \
        input file, or is returned base64-encoded for base64 input.";

    pub fn new(converter: Arc<dyn DocumentConverter>) -> Self {
        Self { converter }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new::<ConvertToPdfParams>(Self::NAME, Self::DESCRIPTION)
    }

    #[instrument(skip_all)]
    async fn execute(&self, params: ConvertToPdfParams) -> ToolResult {
        let resolved = ContentResolver::resolve_input(&params.input, ".docx")?;

        let output_path = match params.output_path {
            Some(path) => Some(PathBuf::from(path)),
            None if resolved.is_temp() => None,
            None => Some(resolved.path().with_extension("pdf")),
        };

        match output_path {
            Some(output) => {
                self.converter.convert(resolved.path(), &output).await?;
                let output = output.to_string_lossy().into_owned();
                info!(path = %output, "document converted to PDF");
                Ok(vec![
                    ContentItem::text(format!("Document converted to {output}")),
                    ContentItem::binary_reference(output),
                ])
            }
            None => {
                let scratch = tempfile::Builder::new().suffix(".pdf").tempfile()?;
                self.converter.convert(resolved.path(), scratch.path()).await?;
                let encoded = ContentResolver::encode_file(scratch.path())?;
                info!(bytes = encoded.len(), "document converted to inline PDF");
                Ok(vec![ContentItem::text(encoded)])
            }
        }
    }
}

#[async_trait]
impl ToolHandler for ConvertToPdfTool {
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
    use crate::services::pdf::PdfError;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use std::path::Path;

    /// Writes a marker "PDF" wherever it is asked to.
    struct FakeConverter;

    #[async_trait]
    impl DocumentConverter for FakeConverter {
        async fn convert(&self, _input: &Path, output: &Path) -> Result<(), PdfError> {
            std::fs::write(output, b"%PDF-fake")?;
            Ok(())
        }
    }

    fn tool() -> ConvertToPdfTool {
        ConvertToPdfTool::new(Arc::new(FakeConverter))
    }

    #[tokio::test]
    async fn path_input_defaults_to_a_pdf_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.docx");
        std::fs::write(&input, b"document bytes").unwrap();

        let content = tool()
            .execute(ConvertToPdfParams {
                input: input.to_string_lossy().into_owned(),
                output_path: None,
            })
            .await
            .unwrap();

        let expected = dir.path().join("report.pdf");
        assert_eq!(std::fs::read(&expected).unwrap(), b"%PDF-fake");
        assert!(matches!(&content[1], ContentItem::BinaryReference(p) if p.ends_with("report.pdf")));
    }

    #[tokio::test]
    async fn inline_input_returns_the_pdf_base64_encoded() {
        let content = tool()
            .execute(ConvertToPdfParams {
                input: STANDARD.encode(b"document bytes"),
                output_path: None,
            })
            .await
            .unwrap();

        let ContentItem::Text(encoded) = &content[0] else {
            panic!("expected inline text content");
        };
        assert_eq!(STANDARD.decode(encoded).unwrap(), b"%PDF-fake");
    }
}
