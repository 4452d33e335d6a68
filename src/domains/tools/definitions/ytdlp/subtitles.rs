//! Subtitle extraction tool definition.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::core::protocol::ContentItem;
use crate::domains::tools::{ToolDescriptor, ToolHandler, ToolResult, ValidatedArguments};
use crate::services::vtt::{self, ChapterSpec};
use crate::services::VideoSource;

// ============================================================================
// Tool Parameters
// ============================================================================

/// One requested chapter boundary.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ChapterSelection {
    /// Chapter start, as "HH:MM:SS", "MM:SS", or seconds.
    pub start_time: String,

    /// Chapter heading used in the output.
    pub title: String,
}

fn default_language() -> String {
    "en".to_string()
}

/// Parameters for the subtitle extraction tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct YoutubeSubtitlesParams {
    /// URL of the video.
    pub url: String,

    /// Subtitle language code. Defaults to "en".
    #[serde(default = "default_language")]
    pub language: String,

    /// Chapters to extract. When empty the whole transcript is returned.
    #[serde(default)]
    pub chapters: Vec<ChapterSelection>,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Downloads captions and turns them into a readable transcript,
/// optionally grouped under requested chapters.
pub struct YoutubeSubtitlesTool {
    source: Arc<dyn VideoSource>,
}

impl YoutubeSubtitlesTool {
    pub const NAME: &'static str = "youtube_subtitles";

    pub const DESCRIPTION: &'static str = "Download the subtitles of a YouTube video (uploaded \
        or auto-generated) and return them as a cleaned transcript. Pass chapters to get the \
        text grouped into sections, one per requested chapter.";

    pub fn new(source: Arc<dyn VideoSource>) -> Self {
        Self { source }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new::<YoutubeSubtitlesParams>(Self::NAME, Self::DESCRIPTION)
    }

    #[instrument(skip_all, fields(language = %params.language))]
    async fn execute(&self, params: YoutubeSubtitlesParams) -> ToolResult {
        let (raw_vtt, metadata) = self.source.subtitles(&params.url, &params.language).await?;

        let selected: Vec<ChapterSpec> = params
            .chapters
            .iter()
            .map(|c| ChapterSpec {
                title: c.title.clone(),
                start_time: vtt::time_to_seconds(&c.start_time),
                end_time: None,
            })
            .collect();
        let all_chapters: Vec<ChapterSpec> = metadata
            .chapters
            .unwrap_or_default()
            .into_iter()
            .map(|c| ChapterSpec {
                title: c.title,
                start_time: c.start_time,
                end_time: None,
            })
            .collect();

        let transcript = vtt::group_by_chapters(&raw_vtt, &selected, &all_chapters, metadata.duration);
        info!(bytes = transcript.len(), "transcript produced");

        Ok(vec![ContentItem::text(transcript)])
    }
}

#[async_trait]
impl ToolHandler for YoutubeSubtitlesTool {
    async fn invoke(&self, args: ValidatedArguments) -> ToolResult {
        self.execute(args.parse()?).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ytdlp::{VideoChapter, VideoMetadata, YtDlpError};
    use std::sync::Mutex;

    const SAMPLE_VTT: &str = "\
WEBVTT

00:00:01.000 --> 00:00:03.000
welcome to the show.

00:01:05.000 --> 00:01:08.000
now the main part begins.
";

    struct FakeSource {
        languages: Mutex<Vec<String>>,
        metadata: VideoMetadata,
    }

    impl FakeSource {
        fn new(metadata: VideoMetadata) -> Self {
            Self {
                languages: Mutex::new(Vec::new()),
                metadata,
            }
        }
    }

    #[async_trait]
    impl VideoSource for FakeSource {
        async fn metadata(&self, _url: &str) -> Result<VideoMetadata, YtDlpError> {
            Ok(self.metadata.clone())
        }

        async fn subtitles(
            &self,
            _url: &str,
            language: &str,
        ) -> Result<(String, VideoMetadata), YtDlpError> {
            self.languages.lock().unwrap().push(language.to_string());
            Ok((SAMPLE_VTT.to_string(), self.metadata.clone()))
        }
    }

    fn metadata() -> VideoMetadata {
        VideoMetadata {
            title: "A Show".to_string(),
            duration: 120.0,
            chapters: Some(vec![
                VideoChapter {
                    start_time: 0.0,
                    title: "Welcome".to_string(),
                },
                VideoChapter {
                    start_time: 60.0,
                    title: "Main".to_string(),
                },
            ]),
        }
    }

    fn text_of(content: &[ContentItem]) -> &str {
        match &content[0] {
            ContentItem::Text(t) => t,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn language_defaults_to_english() {
        let params: YoutubeSubtitlesParams =
            serde_json::from_str(r#"{"url":"https://example.test/v"}"#).unwrap();
        assert_eq!(params.language, "en");
        assert!(params.chapters.is_empty());
    }

    #[tokio::test]
    async fn without_chapters_the_full_transcript_comes_back() {
        let source = Arc::new(FakeSource::new(metadata()));
        let tool = YoutubeSubtitlesTool::new(source.clone());

        let content = tool
            .execute(YoutubeSubtitlesParams {
                url: "https://example.test/v".to_string(),
                language: "en".to_string(),
                chapters: Vec::new(),
            })
            .await
            .unwrap();

        let text = text_of(&content);
        assert!(text.contains("welcome to the show."));
        assert!(text.contains("now the main part begins."));
        assert!(!text.contains("##"));
        assert_eq!(source.languages.lock().unwrap().as_slice(), &["en"]);
    }

    #[tokio::test]
    async fn requested_chapters_section_the_transcript() {
        let tool = YoutubeSubtitlesTool::new(Arc::new(FakeSource::new(metadata())));

        let content = tool
            .execute(YoutubeSubtitlesParams {
                url: "https://example.test/v".to_string(),
                language: "en".to_string(),
                chapters: vec![ChapterSelection {
                    start_time: "01:00".to_string(),
                    title: "Main".to_string(),
                }],
            })
            .await
            .unwrap();

        let text = text_of(&content);
        assert!(text.contains("## Main"));
        assert!(text.contains("now the main part begins."));
        assert!(!text.contains("welcome to the show."));
    }
}
