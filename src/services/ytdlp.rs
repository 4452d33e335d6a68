//! yt-dlp subprocess runner.
//!
//! Video metadata comes from `yt-dlp --dump-json`; subtitles are written
//! into a scoped temporary directory that is removed when the guard drops,
//! on the success and failure paths alike.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use super::VideoSource;

/// Errors from the yt-dlp collaborator.
#[derive(Debug, Error)]
pub enum YtDlpError {
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("yt-dlp failed: {0}")]
    Failed(String),

    #[error("yt-dlp produced invalid metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("no subtitles found for language '{0}'")]
    NoSubtitles(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One chapter from video metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoChapter {
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub title: String,
}

/// Metadata fields the tools care about.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub chapters: Option<Vec<VideoChapter>>,
}

/// Wrapper around the yt-dlp executable.
pub struct YtDlp {
    binary: String,
}

impl YtDlp {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String, YtDlpError> {
        debug!(binary = %self.binary, ?args, "running yt-dlp");
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|source| YtDlpError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(YtDlpError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Fetch video metadata without downloading anything.
    pub async fn metadata(&self, url: &str) -> Result<VideoMetadata, YtDlpError> {
        let stdout = self
            .run(&["--dump-json", "--no-download", "--quiet", url])
            .await?;
        Ok(serde_json::from_str(&stdout)?)
    }

    /// Raw metadata as JSON, for fields the typed struct does not carry.
    pub async fn metadata_value(&self, url: &str) -> Result<Value, YtDlpError> {
        let stdout = self
            .run(&["--dump-json", "--no-download", "--quiet", url])
            .await?;
        Ok(serde_json::from_str(&stdout)?)
    }

    /// Download subtitles (uploaded or auto-generated) for `language` and
    /// return the VTT content together with the video metadata.
    pub async fn subtitles(
        &self,
        url: &str,
        language: &str,
    ) -> Result<(String, VideoMetadata), YtDlpError> {
        let scratch = tempfile::tempdir()?;
        let template = scratch.path().join("subtitles");
        let template = template.to_string_lossy().into_owned();

        let stdout = self
            .run(&[
                "--skip-download",
                "--write-subs",
                "--write-auto-subs",
                "--sub-langs",
                language,
                "--sub-format",
                "vtt",
                "--dump-json",
                "--no-simulate",
                "--quiet",
                "-o",
                &template,
                url,
            ])
            .await?;
        let metadata: VideoMetadata = serde_json::from_str(&stdout)?;

        // yt-dlp names the file <template>.<lang>.vtt; fall back to any
        // .vtt in the scratch directory for language-variant suffixes
        // (e.g. en-US when en was asked for).
        let expected = scratch.path().join(format!("subtitles.{language}.vtt"));
        let path = if expected.exists() {
            expected
        } else {
            std::fs::read_dir(scratch.path())?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .find(|p| p.extension().is_some_and(|ext| ext == "vtt"))
                .ok_or_else(|| YtDlpError::NoSubtitles(language.to_string()))?
        };

        let content = std::fs::read_to_string(&path)?;
        info!(bytes = content.len(), "subtitles downloaded");
        Ok((content, metadata))
    }
}

#[async_trait]
impl VideoSource for YtDlp {
    async fn metadata(&self, url: &str) -> Result<VideoMetadata, YtDlpError> {
        YtDlp::metadata(self, url).await
    }

    async fn subtitles(
        &self,
        url: &str,
        language: &str,
    ) -> Result<(String, VideoMetadata), YtDlpError> {
        YtDlp::subtitles(self, url, language).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_parses_chapters_and_duration() {
        let raw = r#"{
            "title": "A Video",
            "duration": 120.0,
            "chapters": [
                {"start_time": 0.0, "title": "Intro"},
                {"start_time": 60.0, "title": "Main"}
            ]
        }"#;
        let metadata: VideoMetadata = serde_json::from_str(raw).unwrap();
        assert_eq!(metadata.title, "A Video");
        assert_eq!(metadata.duration, 120.0);
        let chapters = metadata.chapters.unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[1].title, "Main");
    }

    #[test]
    fn metadata_tolerates_missing_fields() {
        let metadata: VideoMetadata = serde_json::from_str("{}").unwrap();
        assert_eq!(metadata.title, "");
        assert_eq!(metadata.duration, 0.0);
        assert!(metadata.chapters.is_none());
    }

    #[tokio::test]
    async fn missing_binary_reports_spawn_error() {
        let ytdlp = YtDlp::new("definitely-not-a-real-binary");
        let err = ytdlp.metadata("https://example.test").await.unwrap_err();
        assert!(matches!(err, YtDlpError::Spawn { .. }));
    }
}
