//! Configuration for the tool servers.
//!
//! One `Config` covers every binary in the repository; each server reads
//! only the sections it needs. Values come from environment variables
//! (prefix `TOOLHOST_`, plus the collaborator-specific variables the
//! original deployments already use, like `MERMAID_ACCESS_TOKEN`).

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// PlantUML renderer collaborators (Docker container + HTTP server).
    pub plantuml: PlantumlConfig,

    /// Mermaid Chart API collaborator.
    pub mermaid: MermaidConfig,

    /// yt-dlp subprocess collaborator.
    pub ytdlp: YtdlpConfig,

    /// Document template collaborators.
    pub template: TemplateConfig,

    /// RSS/Atom feed collaborator.
    pub rss: RssConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name reported in logs.
    pub name: String,

    /// Version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    pub level: String,
}

/// PlantUML collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantumlConfig {
    /// Base URL of the rendering server.
    pub server_url: String,

    /// Name of the Docker container backing the server.
    pub container_name: String,

    /// Image to launch when the container does not exist.
    pub image: String,

    /// Host port the container publishes.
    pub port: u16,

    /// Seconds to wait for the container to become ready.
    pub startup_timeout_secs: u64,
}

/// Mermaid Chart API configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct MermaidConfig {
    /// Base URL of the Mermaid Chart API.
    pub base_url: String,

    /// Bearer token. Required at startup for the mermaid server.
    pub access_token: Option<String>,

    /// Theme used when a call does not specify one.
    pub default_theme: String,
}

/// Custom Debug implementation to redact the token from logs.
impl std::fmt::Debug for MermaidConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MermaidConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("default_theme", &self.default_theme)
            .finish()
    }
}

/// yt-dlp collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YtdlpConfig {
    /// Executable name or path.
    pub binary: String,
}

/// Document template collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// LibreOffice executable used for PDF conversion.
    pub soffice_binary: String,
}

/// RSS/Atom feed collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RssConfig {
    /// Seconds before a feed fetch is abandoned.
    pub fetch_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "toolhost".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            plantuml: PlantumlConfig {
                server_url: "http://localhost:8080".to_string(),
                container_name: "plantuml-server".to_string(),
                image: "plantuml/plantuml-server".to_string(),
                port: 8080,
                startup_timeout_secs: 30,
            },
            mermaid: MermaidConfig {
                base_url: "https://www.mermaidchart.com".to_string(),
                access_token: None,
                default_theme: "light".to_string(),
            },
            ytdlp: YtdlpConfig {
                binary: "yt-dlp".to_string(),
            },
            template: TemplateConfig {
                soffice_binary: "soffice".to_string(),
            },
            rss: RssConfig {
                fetch_timeout_secs: 15,
            },
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("TOOLHOST_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("TOOLHOST_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(url) = std::env::var("TOOLHOST_PLANTUML_URL") {
            config.plantuml.server_url = url;
        }

        if let Ok(container) = std::env::var("TOOLHOST_PLANTUML_CONTAINER") {
            config.plantuml.container_name = container;
        }

        if let Ok(image) = std::env::var("TOOLHOST_PLANTUML_IMAGE") {
            config.plantuml.image = image;
        }

        if let Ok(port) = std::env::var("TOOLHOST_PLANTUML_PORT") {
            match port.parse() {
                Ok(port) => config.plantuml.port = port,
                Err(_) => warn!("Ignoring invalid TOOLHOST_PLANTUML_PORT: {port}"),
            }
        }

        if let Ok(timeout) = std::env::var("TOOLHOST_PLANTUML_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => config.plantuml.startup_timeout_secs = secs,
                Err(_) => warn!("Ignoring invalid TOOLHOST_PLANTUML_TIMEOUT_SECS: {timeout}"),
            }
        }

        if let Ok(url) = std::env::var("TOOLHOST_MERMAID_URL") {
            config.mermaid.base_url = url;
        }

        if let Ok(token) = std::env::var("MERMAID_ACCESS_TOKEN") {
            config.mermaid.access_token = Some(token);
        }

        if let Ok(theme) = std::env::var("TOOLHOST_MERMAID_THEME") {
            config.mermaid.default_theme = theme;
        }

        if let Ok(binary) = std::env::var("TOOLHOST_YTDLP_BIN") {
            config.ytdlp.binary = binary;
        }

        if let Ok(binary) = std::env::var("TOOLHOST_SOFFICE_BIN") {
            config.template.soffice_binary = binary;
        }

        if let Ok(timeout) = std::env::var("TOOLHOST_RSS_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => config.rss.fetch_timeout_secs = secs,
                Err(_) => warn!("Ignoring invalid TOOLHOST_RSS_TIMEOUT_SECS: {timeout}"),
            }
        }

        config
    }
}
