//! PDF conversion via LibreOffice.
//!
//! `soffice --headless --convert-to pdf` chooses the output file name
//! itself, so conversion goes through a scratch directory and the
//! produced file is moved to the requested destination.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use super::DocumentConverter;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("conversion failed: {0}")]
    Failed(String),

    #[error("converter produced no output for {0}")]
    NoOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Converts documents to PDF through a LibreOffice subprocess.
pub struct PdfConverter {
    binary: String,
}

impl PdfConverter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Convert `input` and place the PDF at `output`.
    pub async fn convert(&self, input: &Path, output: &Path) -> Result<(), PdfError> {
        let scratch = tempfile::tempdir()?;
        debug!(input = %input.display(), output = %output.display(), "converting to PDF");

        let result = Command::new(&self.binary)
            .args(["--headless", "--convert-to", "pdf", "--outdir"])
            .arg(scratch.path())
            .arg(input)
            .output()
            .await
            .map_err(|source| PdfError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;
        if !result.status.success() {
            return Err(PdfError::Failed(
                String::from_utf8_lossy(&result.stderr).trim().to_string(),
            ));
        }

        let stem = input
            .file_stem()
            .ok_or_else(|| PdfError::NoOutput(input.display().to_string()))?;
        let produced = scratch.path().join(stem).with_extension("pdf");
        if !produced.exists() {
            return Err(PdfError::NoOutput(input.display().to_string()));
        }

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        // Rename fails across filesystems; copy is the portable move.
        std::fs::copy(&produced, output)?;
        Ok(())
    }
}

#[async_trait]
impl DocumentConverter for PdfConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), PdfError> {
        PdfConverter::convert(self, input, output).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_converter_reports_spawn_error() {
        let converter = PdfConverter::new("definitely-not-soffice");
        let err = converter
            .convert(Path::new("in.docx"), Path::new("out.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, PdfError::Spawn { .. }));
    }
}
