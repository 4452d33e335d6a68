//! Mermaid Chart tools.

pub mod render_chart;

pub use render_chart::RenderMermaidChartTool;
