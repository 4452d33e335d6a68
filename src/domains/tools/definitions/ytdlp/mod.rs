//! YouTube tools backed by yt-dlp.

pub mod chapters;
pub mod subtitles;

pub use chapters::YoutubeChaptersTool;
pub use subtitles::YoutubeSubtitlesTool;
