//! Client for the Mermaid Chart REST API.
//!
//! Rendering a chart takes three calls: pick the user's first project,
//! create a document holding the diagram code, then fetch the rendered
//! PNG for the document version the create call reported.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::ChartRenderer;

/// Errors from the Mermaid Chart API.
#[derive(Debug, Error)]
pub enum MermaidError {
    #[error("access token cannot be empty")]
    MissingToken,

    #[error("no projects found; create a project in Mermaid Chart first")]
    NoProjects,

    #[error("Mermaid Chart API answered {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("API response is missing {0}")]
    MissingField(&'static str),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct Project {
    id: Option<String>,
}

/// Identity of a created document version.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRef {
    #[serde(rename = "documentID")]
    pub document_id: Option<String>,
    pub major: Option<i64>,
    pub minor: Option<i64>,
}

/// Authenticated Mermaid Chart API client.
#[derive(Debug)]
pub struct MermaidChartClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl MermaidChartClient {
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, MermaidError> {
        let access_token = access_token.into();
        if access_token.is_empty() {
            return Err(MermaidError::MissingToken);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            access_token,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, MermaidError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        Err(MermaidError::Api {
            status: status.as_u16(),
            detail: detail.chars().take(200).collect(),
        })
    }

    async fn first_project_id(&self) -> Result<String, MermaidError> {
        debug!("fetching projects");
        let response = self
            .client
            .get(self.url("/rest-api/projects"))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let projects: Vec<Project> = Self::check(response).await?.json().await?;
        info!(count = projects.len(), "projects found");
        projects
            .into_iter()
            .next()
            .ok_or(MermaidError::NoProjects)?
            .id
            .ok_or(MermaidError::MissingField("project id"))
    }

    async fn create_document(
        &self,
        project_id: &str,
        code: &str,
    ) -> Result<DocumentRef, MermaidError> {
        debug!(%project_id, "creating document");
        let endpoint = format!("/rest-api/projects/{project_id}/documents");
        let response = self
            .client
            .post(self.url(&endpoint))
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "code": code }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn fetch_png(
        &self,
        document_id: &str,
        major: i64,
        minor: i64,
        theme: &str,
    ) -> Result<Vec<u8>, MermaidError> {
        debug!(%document_id, major, minor, theme, "fetching rendered PNG");
        let endpoint =
            format!("/raw/{document_id}?version=v{major}.{minor}&theme={theme}&format=png");
        let response = self
            .client
            .get(self.url(&endpoint))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let bytes = Self::check(response).await?.bytes().await?;
        info!(bytes = bytes.len(), "PNG data received");
        Ok(bytes.to_vec())
    }

    /// Render `code` to PNG bytes. Returns the bytes and the id of the
    /// document created along the way.
    pub async fn render_png(
        &self,
        code: &str,
        theme: &str,
    ) -> Result<(Vec<u8>, String), MermaidError> {
        let project_id = self.first_project_id().await?;
        let document = self.create_document(&project_id, code).await?;

        let document_id = document
            .document_id
            .ok_or(MermaidError::MissingField("documentID"))?;
        let major = document.major.ok_or(MermaidError::MissingField("major"))?;
        let minor = document.minor.ok_or(MermaidError::MissingField("minor"))?;

        let png = self.fetch_png(&document_id, major, minor, theme).await?;
        Ok((png, document_id))
    }
}

#[async_trait]
impl ChartRenderer for MermaidChartClient {
    async fn render_png(&self, code: &str, theme: &str) -> Result<(Vec<u8>, String), MermaidError> {
        MermaidChartClient::render_png(self, code, theme).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_rejected_at_construction() {
        let err = MermaidChartClient::new("https://example.test", "").unwrap_err();
        assert!(matches!(err, MermaidError::MissingToken));
    }

    #[test]
    fn document_ref_parses_api_field_names() {
        let doc: DocumentRef =
            serde_json::from_str(r#"{"documentID":"d1","major":0,"minor":3}"#).unwrap();
        assert_eq!(doc.document_id.as_deref(), Some("d1"));
        assert_eq!(doc.major, Some(0));
        assert_eq!(doc.minor, Some(3));
    }
}
