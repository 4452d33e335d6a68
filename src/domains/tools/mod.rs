//! Tools domain: registry, dispatch, and the tool definitions.
//!
//! ## Adding a new tool
//!
//! 1. Create a file under `definitions/` with a params struct
//!    (`Deserialize + JsonSchema`, `deny_unknown_fields`), the tool struct,
//!    and a `ToolHandler` impl.
//! 2. Give it a `descriptor()` built via `ToolDescriptor::new::<Params>`.
//! 3. Register it in the server binary with `ToolRegistry::register`.
//!
//! The dispatch core never changes when a tool is added.

pub mod definitions;
mod dispatcher;
mod error;
mod handlers;
mod registry;

pub use dispatcher::Dispatcher;
pub use error::{ToolError, ToolResult};
pub use handlers::ToolHandler;
pub use registry::{
    DuplicateToolError, ToolDescriptor, ToolRegistry, ValidatedArguments, ValidationError,
    Violation,
};
