//! PlantUML diagram tools.

pub mod check_docker;
pub mod convert_format;
pub mod render;

pub use check_docker::CheckDockerTool;
pub use convert_format::ConvertFormatTool;
pub use render::RenderDiagramTool;
