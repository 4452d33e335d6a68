//! Dispatcher: resolves a tool name, validates arguments, invokes the
//! handler, and classifies every failure.
//!
//! This is the last line of defense before the transport. A handler error,
//! and even a handler panic, comes out the other side as a structured
//! failure outcome; the session keeps listening.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::core::protocol::{ErrorKind, Outcome};

use super::registry::{ToolDescriptor, ToolRegistry};

/// Drives calls against a read-only [`ToolRegistry`].
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Descriptors for the capability listing, in registration order.
    /// Always succeeds; an empty registry yields an empty listing.
    pub fn handle_list_capabilities(&self) -> Vec<&ToolDescriptor> {
        self.registry.describe()
    }

    /// Handle one tool call. Validation strictly precedes invocation, so
    /// an invalid call has no side effects.
    pub async fn handle_call(&self, tool_name: &str, arguments: &Map<String, Value>) -> Outcome {
        let Some(handler) = self.registry.handler(tool_name) else {
            warn!(tool = tool_name, "call for unregistered tool");
            return Outcome::failure(ErrorKind::UnknownTool, format!("unknown tool: {tool_name}"));
        };

        let validated = match self.registry.validate(tool_name, arguments) {
            Ok(v) => v,
            Err(e) => {
                debug!(tool = tool_name, violations = %e, "argument validation failed");
                return Outcome::failure(ErrorKind::InvalidArguments, e.to_string());
            }
        };

        match AssertUnwindSafe(handler.invoke(validated)).catch_unwind().await {
            Ok(Ok(content)) => Outcome::success(content),
            Ok(Err(err)) => {
                warn!(tool = tool_name, error = %err, "tool returned an error");
                Outcome::failure(err.kind(), err.to_string())
            }
            Err(_) => {
                error!(tool = tool_name, "tool handler panicked");
                Outcome::failure(
                    ErrorKind::InternalError,
                    format!("tool '{tool_name}' failed unexpectedly"),
                )
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
