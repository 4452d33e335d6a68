//! Video chapter listing tool definition.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::core::protocol::ContentItem;
use crate::domains::tools::{ToolDescriptor, ToolHandler, ToolResult, ValidatedArguments};
use crate::services::vtt;
use crate::services::VideoSource;

/// Parameters for the chapter listing tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct YoutubeChaptersParams {
    /// URL of the video.
    pub url: String,
}

/// Lists the chapters of a video as `time - title` lines.
pub struct YoutubeChaptersTool {
    source: Arc<dyn VideoSource>,
}

impl YoutubeChaptersTool {
    pub const NAME: &'static str = "youtube_chapters";

    pub const DESCRIPTION: &'static str = "List the chapters of a YouTube video, one \
        'MM:SS - title' line per chapter. Videos without chapters yield a single line \
        carrying the video title.";

    pub fn new(source: Arc<dyn VideoSource>) -> Self {
        Self { source }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new::<YoutubeChaptersParams>(Self::NAME, Self::DESCRIPTION)
    }

    #[instrument(skip_all)]
    async fn execute(&self, params: YoutubeChaptersParams) -> ToolResult {
        let metadata = self.source.metadata(&params.url).await?;

        let chapters = metadata.chapters.unwrap_or_default();
        let listing = if chapters.is_empty() {
            // No chapter markers: the whole video is one chapter.
            format!("00:00 - {}", metadata.title)
        } else {
            chapters
                .iter()
                .map(|c| format!("{} - {}", vtt::format_time(c.start_time), c.title))
                .collect::<Vec<_>>()
                .join("\n")
        };
        info!(lines = listing.lines().count(), "chapters listed");

        Ok(vec![ContentItem::text(listing)])
    }
}

#[async_trait]
impl ToolHandler for YoutubeChaptersTool {
    async fn invoke(&self, args: ValidatedArguments) -> ToolResult {
        self.execute(args.parse()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ytdlp::{VideoChapter, VideoMetadata, YtDlpError};

    struct FakeSource {
        metadata: VideoMetadata,
    }

    #[async_trait]
    impl VideoSource for FakeSource {
        async fn metadata(&self, _url: &str) -> Result<VideoMetadata, YtDlpError> {
            Ok(self.metadata.clone())
        }

        async fn subtitles(
            &self,
            _url: &str,
            _language: &str,
        ) -> Result<(String, VideoMetadata), YtDlpError> {
            unimplemented!("not used by this tool")
        }
    }

    fn tool_with(metadata: VideoMetadata) -> YoutubeChaptersTool {
        YoutubeChaptersTool::new(Arc::new(FakeSource { metadata }))
    }

    fn text_of(content: &[ContentItem]) -> &str {
        match &content[0] {
            ContentItem::Text(t) => t,
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lists_chapters_with_formatted_start_times() {
        let tool = tool_with(VideoMetadata {
            title: "A Talk".to_string(),
            duration: 4000.0,
            chapters: Some(vec![
                VideoChapter {
                    start_time: 0.0,
                    title: "Intro".to_string(),
                },
                VideoChapter {
                    start_time: 3723.0,
                    title: "Questions".to_string(),
                },
            ]),
        });

        let content = tool
            .execute(YoutubeChaptersParams {
                url: "https://example.test/v".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(text_of(&content), "00:00 - Intro\n01:02:03 - Questions");
    }

    #[tokio::test]
    async fn falls_back_to_a_single_title_chapter() {
        let tool = tool_with(VideoMetadata {
            title: "No Chapters Here".to_string(),
            duration: 60.0,
            chapters: None,
        });

        let content = tool
            .execute(YoutubeChaptersParams {
                url: "https://example.test/v".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(text_of(&content), "00:00 - No Chapters Here");
    }
}
