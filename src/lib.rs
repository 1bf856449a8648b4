/// YouTube Chapter Finder
///
/// Searches YouTube for videos whose descriptions carry chapter markers,
/// optionally keeps only Creative Commons videos or videos with captions in the
/// search language, and downloads the results with yt-dlp.

pub mod chapters;
pub mod config;
pub mod error;
pub mod filter;
pub mod results;
pub mod runner;
pub mod search;
pub mod youtube;
pub mod ytdlp;

// Re-export main types for easy access
pub use crate::chapters::{ChapterExtractor, ChapterList, ChapterTimestamp};
pub use crate::config::Config;
pub use crate::error::{Result, SearchError};
pub use crate::filter::{FilterFlags, VideoFilter};
pub use crate::results::{ResultStore, RunSettings};
pub use crate::runner::{RunSummary, SearchRunner};
pub use crate::search::{
    AcceptedVideo, Candidate, CaptionLanguages, CaptionProvider, MetadataProvider, SearchAggregator,
    SearchProvider, SearchRequest, SearchSession, SearchState,
};
pub use crate::youtube::YouTubeApi;
pub use crate::ytdlp::{MediaDownloader, YtDlp};
