//! Tool definitions module.
//!
//! Each tool is defined in its own file: the params struct that derives
//! the input schema, the tool struct holding its collaborators, and the
//! handler binding. The server binaries pick which tools to register.

pub mod mermaid;
pub mod plantuml;
pub mod rss;
pub mod template;
pub mod ytdlp;

pub use mermaid::RenderMermaidChartTool;
pub use plantuml::{CheckDockerTool, ConvertFormatTool, RenderDiagramTool};
pub use rss::FetchRssToMarkdownTool;
pub use template::{ConvertToPdfTool, GetTemplateKeysTool, ProcessTemplateTool};
pub use ytdlp::{YoutubeChaptersTool, YoutubeSubtitlesTool};
