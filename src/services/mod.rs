//! External collaborators the tools delegate to.
//!
//! Every service here wraps one external system (subprocess, web API,
//! filesystem) behind a narrow interface. Tools hold the trait objects
//! defined in this module so tests can substitute fakes.

use async_trait::async_trait;

pub mod docker;
pub mod feed;
pub mod markdown;
pub mod mermaid_chart;
pub mod pdf;
pub mod plantuml;
pub mod resolver;
pub mod template;
pub mod vtt;
pub mod ytdlp;

pub use docker::{DockerService, StartupError};
pub use feed::FeedClient;
pub use mermaid_chart::MermaidChartClient;
pub use pdf::PdfConverter;
pub use plantuml::{OutputFormat, PlantumlRenderer, RenderError};
pub use resolver::{ContentResolver, ResolvedInput};

/// Health of a backing service a server depends on.
///
/// Contract: `ensure_started` must be safe to call when the backing
/// resource already exists (including concurrently from another process)
/// and must not create duplicates.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Is the backing service up right now?
    async fn is_ready(&self) -> bool;

    /// Bring the backing service up, waiting until it answers.
    async fn ensure_started(&self) -> Result<(), StartupError>;
}

/// A rendering backend that turns diagram source into bytes.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    async fn execute(&self, source: &str, format: OutputFormat) -> Result<Vec<u8>, RenderError>;
}

/// Renders Mermaid diagram code to PNG through a chart service. The
/// second element of the result is the id of the document created along
/// the way.
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    async fn render_png(
        &self,
        code: &str,
        theme: &str,
    ) -> Result<(Vec<u8>, String), mermaid_chart::MermaidError>;
}

/// Source of video metadata and subtitles.
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn metadata(&self, url: &str) -> Result<ytdlp::VideoMetadata, ytdlp::YtDlpError>;

    async fn subtitles(
        &self,
        url: &str,
        language: &str,
    ) -> Result<(String, ytdlp::VideoMetadata), ytdlp::YtDlpError>;
}

/// Source of parsed RSS/Atom feeds.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<feed::FeedChannel, feed::FeedError>;
}

/// Converts a document file to PDF.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert(
        &self,
        input: &std::path::Path,
        output: &std::path::Path,
    ) -> Result<(), pdf::PdfError>;
}
