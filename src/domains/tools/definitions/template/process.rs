//! Template processing tool definition.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::core::protocol::ContentItem;
use crate::domains::tools::{ToolDescriptor, ToolHandler, ToolResult, ValidatedArguments};
use crate::services::template;
use crate::services::ContentResolver;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the template processing tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ProcessTemplateParams {
    /// Template: a path to a template file, or its content base64-encoded.
    pub input: String,

    /// Values for `${key}` placeholders. Unknown placeholders stay as-is.
    #[serde(default)]
    pub replacements: HashMap<String, String>,

    /// Block decisions: `true` keeps a `<key>...</key>` block (markers
    /// removed), `false` removes it entirely.
    #[serde(default)]
    pub blocks: HashMap<String, bool>,

    /// Where to write the processed document. Without it the processed
    /// text is returned inline.
    pub output_path: Option<String>,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Fills template placeholders and resolves conditional blocks.
///
/// The tool has no collaborator handle; it exists as a unit struct so the
/// registration surface matches the other tools.
pub struct ProcessTemplateTool;

impl ProcessTemplateTool {
    pub const NAME: &'static str = "process_template";

    pub const DESCRIPTION: &'static str = "Fill a document template: substitute ${key} \
        placeholders and keep or remove <key>...</key> blocks. Accepts a file path or \
        base64-encoded template content; without an output path the processed text is \
        returned inline.";

    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new::<ProcessTemplateParams>(Self::NAME, Self::DESCRIPTION)
    }

    #[instrument(skip_all)]
    async fn execute(&self, params: ProcessTemplateParams) -> ToolResult {
        let resolved = ContentResolver::resolve_input(&params.input, ".txt")?;
        let text = std::fs::read_to_string(resolved.path())?;

        let processed = template::replace_keys(&text, &params.replacements);
        let processed = template::apply_blocks(&processed, &params.blocks);
        info!(
            replacements = params.replacements.len(),
            blocks = params.blocks.len(),
            "template processed"
        );

        match params.output_path {
            Some(output_path) => {
                let output = Path::new(&output_path);
                if let Some(parent) = output.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                std::fs::write(output, processed)?;
                Ok(vec![
                    ContentItem::text(format!("Template processed to {output_path}")),
                    ContentItem::binary_reference(output_path),
                ])
            }
            None => Ok(vec![ContentItem::text(processed)]),
        }
    }
}

#[async_trait]
impl ToolHandler for ProcessTemplateTool {
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
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    const TEMPLATE: &str = "Dear ${name},\n<offer>Special deal inside!</offer>\nBye ${name}.";

    fn text_of(content: &[ContentItem]) -> &str {
        match &content[0] {
            ContentItem::Text(t) => t,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn inline_template_comes_back_processed_inline() {
        let tool = ProcessTemplateTool;
        let content = tool
            .execute(ProcessTemplateParams {
                input: STANDARD.encode(TEMPLATE),
                replacements: [("name".to_string(), "Ada".to_string())].into(),
                blocks: [("offer".to_string(), false)].into(),
                output_path: None,
            })
            .await
            .unwrap();

        let text = text_of(&content);
        assert!(text.contains("Dear Ada,"));
        assert!(text.contains("Bye Ada."));
        assert!(!text.contains("Special deal"));
        assert!(!text.contains("${name}"));
    }

    #[tokio::test]
    async fn output_path_writes_the_processed_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("letter.txt");
        std::fs::write(&input, TEMPLATE).unwrap();
        let output = dir.path().join("out/letter.txt");

        let tool = ProcessTemplateTool;
        let content = tool
            .execute(ProcessTemplateParams {
                input: input.to_string_lossy().into_owned(),
                replacements: [("name".to_string(), "Ada".to_string())].into(),
                blocks: [("offer".to_string(), true)].into(),
                output_path: Some(output.to_string_lossy().into_owned()),
            })
            .await
            .unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains("Special deal inside!"));
        assert!(!written.contains("<offer>"));
        assert!(matches!(&content[1], ContentItem::BinaryReference(p) if p.ends_with("letter.txt")));
    }
}
