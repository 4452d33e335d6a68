//! Template key listing tool definition.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::instrument;

use crate::core::protocol::ContentItem;
use crate::domains::tools::{
    ToolDescriptor, ToolError, ToolHandler, ToolResult, ValidatedArguments,
};
use crate::services::template;
use crate::services::ContentResolver;

/// Parameters for the key listing tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetTemplateKeysParams {
    /// Template: a path to a template file, or its content base64-encoded.
    pub input: String,
}

/// Lists the `${key}` placeholders a template expects.
pub struct GetTemplateKeysTool;

impl GetTemplateKeysTool {
    pub const NAME: &'static str = "get_template_keys";

    pub const DESCRIPTION: &'static str = "List the ${key} placeholders found in a document \
        template, in order of first appearance, as a JSON array.";

    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new::<GetTemplateKeysParams>(Self::NAME, Self::DESCRIPTION)
    }

    #[instrument(skip_all)]
    async fn execute(&self, params: GetTemplateKeysParams) -> ToolResult {
        let resolved = ContentResolver::resolve_input(&params.input, ".txt")?;
        let text = std::fs::read_to_string(resolved.path())?;

        let keys = template::extract_keys(&text);
        let listing = serde_json::to_string(&keys)
            .map_err(|e| ToolError::internal(e.to_string()))?;
        Ok(vec![ContentItem::text(listing)])
    }
}

#[async_trait]
impl ToolHandler for GetTemplateKeysTool {
    async fn invoke(&self, args: ValidatedArguments) -> ToolResult {
        self.execute(args.parse()?).await
    }
}
