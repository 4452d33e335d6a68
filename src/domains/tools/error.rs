//! Tool-level error taxonomy.

use thiserror::Error;

use crate::core::protocol::ErrorKind;
use crate::services::docker::StartupError;
use crate::services::feed::FeedError;
use crate::services::mermaid_chart::MermaidError;
use crate::services::pdf::PdfError;
use crate::services::plantuml::RenderError;
use crate::services::resolver::ResolveError;
use crate::services::ytdlp::YtDlpError;

/// Result type returned by tool handlers.
pub type ToolResult = Result<Vec<crate::core::protocol::ContentItem>, ToolError>;

/// Errors a handler may surface. The dispatcher converts these into
/// failure outcomes; they never escape past its boundary.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments survived schema validation but are semantically unusable.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A backing subprocess, web service, or filesystem operation failed.
    #[error("Collaborator failure: {0}")]
    Collaborator(String),

    /// An unexpected fault inside the handler.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::Collaborator(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Wire classification for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArguments(_) => ErrorKind::InvalidArguments,
            Self::Collaborator(_) => ErrorKind::CollaboratorFailure,
            Self::Internal(_) => ErrorKind::InternalError,
        }
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        Self::Collaborator(err.to_string())
    }
}

impl From<ResolveError> for ToolError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Unresolvable => Self::InvalidArguments(err.to_string()),
            ResolveError::Io(_) => Self::Collaborator(err.to_string()),
        }
    }
}

impl From<RenderError> for ToolError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::UnsupportedFormat(_) => Self::InvalidArguments(err.to_string()),
            _ => Self::Collaborator(err.to_string()),
        }
    }
}

impl From<StartupError> for ToolError {
    fn from(err: StartupError) -> Self {
        Self::Collaborator(err.to_string())
    }
}

impl From<MermaidError> for ToolError {
    fn from(err: MermaidError) -> Self {
        Self::Collaborator(err.to_string())
    }
}

impl From<YtDlpError> for ToolError {
    fn from(err: YtDlpError) -> Self {
        Self::Collaborator(err.to_string())
    }
}

impl From<PdfError> for ToolError {
    fn from(err: PdfError) -> Self {
        Self::Collaborator(err.to_string())
    }
}

impl From<FeedError> for ToolError {
    fn from(err: FeedError) -> Self {
        Self::Collaborator(err.to_string())
    }
}
