/// Paginated chapter search
///
/// The aggregator drives a search session page by page, looks up each
/// candidate's description and keeps videos whose descriptions carry chapter
/// markers and which pass the license/caption filter. Transport is behind the
/// provider traits below so the loop can run against live services or against
/// recorded pages.

pub mod aggregator;

pub use aggregator::{SearchAggregator, SearchState};

use crate::chapters::ChapterList;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default number of result pages visited per query
pub const DEFAULT_PAGE_BUDGET: usize = 5;

/// A search result before filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub id: String,
    pub link: String,
    /// Human readable length as reported by the search provider (e.g. "12:34")
    pub duration: String,
    /// Snippet returned with the search result; the full text comes from the metadata provider
    #[serde(default)]
    pub description: String,
}

/// A candidate that has chapters and passed the filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedVideo {
    pub title: String,
    pub link: String,
    pub duration: String,
    pub chapters: ChapterList,
}

impl AcceptedVideo {
    pub fn from_candidate(candidate: &Candidate, chapters: ChapterList) -> Self {
        Self {
            title: candidate.title.clone(),
            link: candidate.link.clone(),
            duration: candidate.duration.clone(),
            chapters,
        }
    }
}

/// Parameters of a single query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Stop once this many videos are accepted
    pub target_count: usize,
    /// Search language, also the caption language checked
    pub language: String,
    /// Only accept Creative Commons licensed videos
    pub license_flag: bool,
    /// Only accept videos with captions in `language`
    pub caption_flag: bool,
    /// Maximum number of result pages to request
    pub page_budget: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, target_count: usize, language: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            target_count,
            language: language.into(),
            license_flag: false,
            caption_flag: false,
            page_budget: DEFAULT_PAGE_BUDGET,
        }
    }

    pub fn with_license_flag(mut self, enabled: bool) -> Self {
        self.license_flag = enabled;
        self
    }

    pub fn with_caption_flag(mut self, enabled: bool) -> Self {
        self.caption_flag = enabled;
        self
    }

    pub fn with_page_budget(mut self, pages: usize) -> Self {
        self.page_budget = pages;
        self
    }
}

/// Manual and automatic caption languages reported for a video
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionLanguages {
    pub manual: BTreeSet<String>,
    pub automatic: BTreeSet<String>,
}

impl CaptionLanguages {
    pub fn contains(&self, language: &str) -> bool {
        self.manual.contains(language) || self.automatic.contains(language)
    }
}

/// An open, paginated search
#[async_trait]
pub trait SearchSession: Send {
    /// Next page of candidates. An exhausted session yields empty pages.
    async fn next_page(&mut self) -> Result<Vec<Candidate>>;
}

/// Source of paginated search results
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn open_session(&self, query: &str, language: &str) -> Result<Box<dyn SearchSession>>;
}

/// Per-video metadata. Unknown ids and unreachable services fail with `SearchError::Upstream`.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn get_description(&self, video_id: &str) -> Result<String>;
    async fn get_license_status(&self, video_id: &str) -> Result<String>;
}

/// Caption availability. Failures are `SearchError::Extraction`.
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    async fn get_caption_languages(&self, video_id: &str) -> Result<CaptionLanguages>;
}
