//! HTTP rendering backend against a local PlantUML server.
//!
//! The server (usually the Docker container managed by
//! [`super::DockerService`]) accepts diagram source via POST on its
//! format endpoints and answers with the rendered bytes.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use super::RenderBackend;

/// Output formats the PlantUML server can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
    Pdf,
}

impl OutputFormat {
    /// Parse a caller-supplied format name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Infer a format from an output file extension. PNG when the
    /// extension is missing or unknown.
    pub fn from_extension(path: &str) -> Self {
        match path.rsplit('.').next().map(str::to_lowercase).as_deref() {
            Some("svg") => Self::Svg,
            Some("pdf") => Self::Pdf,
            _ => Self::Png,
        }
    }

    /// Server endpoint for this format.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
        }
    }

    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        self.endpoint()
    }
}

/// Errors from the rendering backend.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("plantuml server answered {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Renders PlantUML source through the HTTP server.
pub struct PlantumlRenderer {
    client: reqwest::Client,
    base_url: String,
}

impl PlantumlRenderer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RenderBackend for PlantumlRenderer {
    async fn execute(&self, source: &str, format: OutputFormat) -> Result<Vec<u8>, RenderError> {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            format.endpoint()
        );
        debug!(%url, "rendering diagram");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(source.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RenderError::Status {
                status: status.as_u16(),
                detail: detail.chars().take(200).collect(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_formats_case_insensitively() {
        assert_eq!(OutputFormat::parse("PNG"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::parse("svg"), Some(OutputFormat::Svg));
        assert_eq!(OutputFormat::parse("Pdf"), Some(OutputFormat::Pdf));
        assert_eq!(OutputFormat::parse("jpeg"), None);
    }

    #[test]
    fn extension_inference_defaults_to_png() {
        assert_eq!(OutputFormat::from_extension("out.svg"), OutputFormat::Svg);
        assert_eq!(OutputFormat::from_extension("out.PDF"), OutputFormat::Pdf);
        assert_eq!(OutputFormat::from_extension("out.png"), OutputFormat::Png);
        assert_eq!(OutputFormat::from_extension("no_extension"), OutputFormat::Png);
    }
}
