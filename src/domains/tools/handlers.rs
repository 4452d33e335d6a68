//! The handler capability every tool implements.

use async_trait::async_trait;

use super::registry::ValidatedArguments;
use super::ToolResult;

/// One registered tool's implementation.
///
/// `invoke` receives arguments that already passed schema validation and
/// returns either content or a classified [`super::ToolError`]. A handler
/// must translate every collaborator failure into an error here; nothing
/// may propagate past the dispatcher boundary. Handlers that create
/// scratch files or directories are responsible for releasing them on
/// every exit path (the services in this crate use drop guards for that).
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn invoke(&self, args: ValidatedArguments) -> ToolResult;
}
