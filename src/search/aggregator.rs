/// Bounded page-by-page search loop
use super::{AcceptedVideo, Candidate, MetadataProvider, SearchProvider, SearchRequest};
use crate::chapters::ChapterExtractor;
use crate::error::Result;
use crate::filter::{FilterFlags, VideoFilter};
use std::sync::Arc;
use tracing::{debug, info};

/// Loop counters, owned by one `search` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchState {
    pub page_count: usize,
    pub accepted_count: usize,
}

impl SearchState {
    /// Continue while pages remain in the budget and the target is not met
    pub fn should_continue(&self, page_budget: usize, target_count: usize) -> bool {
        self.page_count < page_budget && self.accepted_count < target_count
    }
}

/// Collects chaptered videos for a query
#[derive(Clone)]
pub struct SearchAggregator {
    search: Arc<dyn SearchProvider>,
    metadata: Arc<dyn MetadataProvider>,
    filter: VideoFilter,
    extractor: ChapterExtractor,
}

impl SearchAggregator {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        metadata: Arc<dyn MetadataProvider>,
        filter: VideoFilter,
        extractor: ChapterExtractor,
    ) -> Self {
        Self {
            search,
            metadata,
            filter,
            extractor,
        }
    }

    /// Run one query and return at most `target_count` accepted videos in
    /// search order.
    ///
    /// Candidates are processed one at a time. A failing license lookup or
    /// description fetch aborts the whole search; caption failures only reject
    /// the candidate.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<AcceptedVideo>> {
        let flags = FilterFlags {
            require_creative_commons: request.license_flag,
            require_caption: request.caption_flag,
        };

        let mut state = SearchState::default();
        let mut accepted = Vec::new();

        info!("🔍 Searching \"{}\" ({})", request.query, request.language);
        let mut session = self
            .search
            .open_session(&request.query, &request.language)
            .await?;

        while state.should_continue(request.page_budget, request.target_count) {
            let page = session.next_page().await?;
            debug!("Page {}: {} candidates", state.page_count + 1, page.len());

            for candidate in &page {
                if let Some(video) = self.evaluate(candidate, &request.language, flags).await? {
                    accepted.push(video);
                    state.accepted_count += 1;
                }
            }

            state.page_count += 1;
        }

        info!(
            "📄 Visited {} page(s), accepted {} video(s) for \"{}\"",
            state.page_count, state.accepted_count, request.query
        );

        accepted.truncate(request.target_count);
        Ok(accepted)
    }

    async fn evaluate(
        &self,
        candidate: &Candidate,
        language: &str,
        flags: FilterFlags,
    ) -> Result<Option<AcceptedVideo>> {
        let description = self.metadata.get_description(&candidate.id).await?;
        let chapters = self.extractor.extract(&description);

        if chapters.is_empty() {
            debug!("No chapters: {}", candidate.title);
            return Ok(None);
        }

        if !self.filter.accepts(&candidate.id, language, flags).await? {
            debug!("Filtered out: {}", candidate.title);
            return Ok(None);
        }

        debug!("✅ Accepted {} ({} chapters)", candidate.title, chapters.len());
        Ok(Some(AcceptedVideo::from_candidate(candidate, chapters)))
    }
}
