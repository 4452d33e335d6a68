//! Document template tools.

pub mod convert_pdf;
pub mod keys;
pub mod process;

pub use convert_pdf::ConvertToPdfTool;
pub use keys::GetTemplateKeysTool;
pub use process::ProcessTemplateTool;
