use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};
use yt_chapter_finder::{
    AcceptedVideo, Candidate, CaptionLanguages, CaptionProvider, ChapterExtractor, MetadataProvider,
    Result, SearchAggregator, SearchError, SearchProvider, SearchRequest, SearchSession, VideoFilter,
};

const CHAPTERED: &str = "My video\n\n0:00 Intro\n1:30 Topic\n10:05 Wrap\n\nThanks!";
const PLAIN: &str = "No chapters here, just a link: https://example.com";

/// Pre-recorded search pages; every session replays them from the start
struct RecordedSearch {
    pages: Vec<Vec<Candidate>>,
    pages_served: Arc<AtomicUsize>,
}

struct RecordedSession {
    pages: Vec<Vec<Candidate>>,
    next: usize,
    pages_served: Arc<AtomicUsize>,
}

#[async_trait]
impl SearchSession for RecordedSession {
    async fn next_page(&mut self) -> Result<Vec<Candidate>> {
        self.pages_served.fetch_add(1, Ordering::SeqCst);
        let page = self.pages.get(self.next).cloned().unwrap_or_default();
        self.next += 1;
        Ok(page)
    }
}

#[async_trait]
impl SearchProvider for RecordedSearch {
    async fn open_session(&self, _query: &str, _language: &str) -> Result<Box<dyn SearchSession>> {
        Ok(Box::new(RecordedSession {
            pages: self.pages.clone(),
            next: 0,
            pages_served: self.pages_served.clone(),
        }))
    }
}

/// Descriptions and licenses by video id; unknown ids are upstream errors
#[derive(Default)]
struct RecordedMetadata {
    descriptions: HashMap<String, String>,
    licenses: HashMap<String, String>,
    license_calls: AtomicUsize,
}

#[async_trait]
impl MetadataProvider for RecordedMetadata {
    async fn get_description(&self, video_id: &str) -> Result<String> {
        self.descriptions
            .get(video_id)
            .cloned()
            .ok_or_else(|| SearchError::Upstream(format!("unknown video {}", video_id)))
    }

    async fn get_license_status(&self, video_id: &str) -> Result<String> {
        self.license_calls.fetch_add(1, Ordering::SeqCst);
        self.licenses
            .get(video_id)
            .cloned()
            .ok_or_else(|| SearchError::Upstream(format!("license lookup failed for {}", video_id)))
    }
}

/// Videos in `with_german` have German automatic captions; ids in `broken` fail
#[derive(Default)]
struct RecordedCaptions {
    with_german: HashSet<String>,
    broken: HashSet<String>,
}

#[async_trait]
impl CaptionProvider for RecordedCaptions {
    async fn get_caption_languages(&self, video_id: &str) -> Result<CaptionLanguages> {
        if self.broken.contains(video_id) {
            return Err(SearchError::Extraction(format!("Video unavailable: {}", video_id)));
        }
        let mut languages = CaptionLanguages::default();
        languages.manual.insert("en".to_string());
        if self.with_german.contains(video_id) {
            languages.automatic.insert("de".to_string());
        }
        Ok(languages)
    }
}

fn candidate(id: &str) -> Candidate {
    Candidate {
        title: format!("Video {}", id),
        id: id.to_string(),
        link: format!("https://www.youtube.com/watch?v={}", id),
        duration: "12:34".to_string(),
        description: String::new(),
    }
}

struct Fixture {
    aggregator: SearchAggregator,
    pages_served: Arc<AtomicUsize>,
    metadata: Arc<RecordedMetadata>,
}

/// Builds an aggregator over `pages`. Ids starting with `c` have chapters,
/// ids starting with `x` are unknown to the metadata provider.
fn fixture(pages: Vec<Vec<&str>>, metadata: RecordedMetadata, captions: RecordedCaptions) -> Fixture {
    let mut metadata = metadata;
    for id in pages.iter().flatten().filter(|id| !id.starts_with('x')) {
        let text = if id.starts_with('c') { CHAPTERED } else { PLAIN };
        metadata
            .descriptions
            .entry(id.to_string())
            .or_insert_with(|| text.to_string());
    }

    let pages_served = Arc::new(AtomicUsize::new(0));
    let search = Arc::new(RecordedSearch {
        pages: pages
            .into_iter()
            .map(|page| page.into_iter().map(candidate).collect())
            .collect(),
        pages_served: pages_served.clone(),
    });
    let metadata = Arc::new(metadata);
    let filter = VideoFilter::new(metadata.clone(), Arc::new(captions));
    let aggregator = SearchAggregator::new(search, metadata.clone(), filter, ChapterExtractor::new());

    Fixture {
        aggregator,
        pages_served,
        metadata,
    }
}

fn ids(videos: &[AcceptedVideo]) -> Vec<String> {
    videos
        .iter()
        .map(|v| v.link.rsplit('=').next().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_accepts_only_chaptered_videos_in_order() {
    let fx = fixture(
        vec![vec!["c1", "p1", "c2"], vec!["p2", "c3"]],
        RecordedMetadata::default(),
        RecordedCaptions::default(),
    );

    let request = SearchRequest::new("rust", 10, "de").with_page_budget(2);
    let videos = assert_ok!(fx.aggregator.search(&request).await);

    assert_eq!(ids(&videos), vec!["c1", "c2", "c3"]);
    assert_eq!(videos[0].title, "Video c1");
    assert_eq!(videos[0].duration, "12:34");
    assert_eq!(videos[0].chapters, vec!["0:00", "1:30", "10:05"]);
}

#[tokio::test]
async fn test_result_truncated_to_target() {
    let fx = fixture(
        vec![vec!["c1", "c2", "c3", "c4"]],
        RecordedMetadata::default(),
        RecordedCaptions::default(),
    );

    let videos = fx.aggregator.search(&SearchRequest::new("rust", 2, "de")).await.unwrap();

    assert_eq!(ids(&videos), vec!["c1", "c2"]);
    assert_eq!(fx.pages_served.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stops_when_target_reached() {
    let fx = fixture(
        vec![vec!["c1", "c2"], vec!["c3"], vec!["c4"]],
        RecordedMetadata::default(),
        RecordedCaptions::default(),
    );

    let videos = fx.aggregator.search(&SearchRequest::new("rust", 2, "de")).await.unwrap();

    assert_eq!(videos.len(), 2);
    assert_eq!(fx.pages_served.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_page_budget_bounds_requests() {
    let pages = (0..10).map(|_| vec!["p1", "p2"]).collect();
    let fx = fixture(pages, RecordedMetadata::default(), RecordedCaptions::default());

    let request = SearchRequest::new("rust", 5, "de").with_page_budget(3);
    let videos = fx.aggregator.search(&request).await.unwrap();

    assert!(videos.is_empty());
    assert_eq!(fx.pages_served.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_exhausted_session_runs_out_the_budget() {
    let fx = fixture(vec![vec!["c1"]], RecordedMetadata::default(), RecordedCaptions::default());

    let videos = fx.aggregator.search(&SearchRequest::new("rust", 5, "de")).await.unwrap();

    assert_eq!(ids(&videos), vec!["c1"]);
    assert_eq!(fx.pages_served.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_zero_target_requests_nothing() {
    let fx = fixture(vec![vec!["c1"]], RecordedMetadata::default(), RecordedCaptions::default());

    let videos = fx.aggregator.search(&SearchRequest::new("rust", 0, "de")).await.unwrap();

    assert!(videos.is_empty());
    assert_eq!(fx.pages_served.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_license_flag_keeps_creative_commons() {
    let mut metadata = RecordedMetadata::default();
    metadata.licenses.insert("c1".to_string(), "youtube".to_string());
    metadata.licenses.insert("c2".to_string(), "creativeCommon".to_string());

    let fx = fixture(vec![vec!["c1", "p1", "c2"]], metadata, RecordedCaptions::default());

    let request = SearchRequest::new("rust", 10, "de")
        .with_license_flag(true)
        .with_page_budget(1);
    let videos = fx.aggregator.search(&request).await.unwrap();

    assert_eq!(ids(&videos), vec!["c2"]);
    // Plain descriptions are rejected before any license lookup.
    assert_eq!(fx.metadata.license_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_license_error_fails_the_search() {
    let mut metadata = RecordedMetadata::default();
    metadata.licenses.insert("c1".to_string(), "creativeCommon".to_string());

    let fx = fixture(vec![vec!["c1", "c2"]], metadata, RecordedCaptions::default());

    let request = SearchRequest::new("rust", 10, "de").with_license_flag(true);
    let err = assert_err!(fx.aggregator.search(&request).await);

    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_license_not_checked_without_flag() {
    let fx = fixture(vec![vec!["c1", "c2"]], RecordedMetadata::default(), RecordedCaptions::default());

    let videos = fx.aggregator.search(&SearchRequest::new("rust", 10, "de")).await.unwrap();

    assert_eq!(videos.len(), 2);
    assert_eq!(fx.metadata.license_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_caption_flag_excludes_failed_lookups() {
    let captions = RecordedCaptions {
        with_german: ["c1", "c3"].iter().map(|s| s.to_string()).collect(),
        broken: ["c3"].iter().map(|s| s.to_string()).collect(),
    };

    let fx = fixture(vec![vec!["c1", "c2", "c3", "c4"]], RecordedMetadata::default(), captions);

    let request = SearchRequest::new("rust", 10, "de")
        .with_caption_flag(true)
        .with_page_budget(1);
    let videos = assert_ok!(fx.aggregator.search(&request).await);

    assert_eq!(ids(&videos), vec!["c1"]);
}

#[tokio::test]
async fn test_both_flags_required() {
    let mut metadata = RecordedMetadata::default();
    for id in ["c1", "c2", "c3"] {
        metadata.licenses.insert(id.to_string(), "creativeCommon".to_string());
    }
    metadata.licenses.insert("c4".to_string(), "youtube".to_string());

    let captions = RecordedCaptions {
        with_german: ["c2", "c4"].iter().map(|s| s.to_string()).collect(),
        broken: HashSet::new(),
    };

    let fx = fixture(vec![vec!["c1", "c2", "c3", "c4"]], metadata, captions);

    let request = SearchRequest::new("rust", 10, "de")
        .with_license_flag(true)
        .with_caption_flag(true);
    let videos = fx.aggregator.search(&request).await.unwrap();

    assert_eq!(ids(&videos), vec!["c2"]);
}

#[tokio::test]
async fn test_description_error_fails_the_search() {
    let fx = fixture(vec![vec!["c1", "x1"]], RecordedMetadata::default(), RecordedCaptions::default());

    let err = fx.aggregator.search(&SearchRequest::new("rust", 10, "de")).await.unwrap_err();
    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_repeated_search_is_identical() {
    let mut metadata = RecordedMetadata::default();
    metadata.licenses.insert("c1".to_string(), "creativeCommon".to_string());
    metadata.licenses.insert("c3".to_string(), "creativeCommon".to_string());
    metadata.licenses.insert("c4".to_string(), "youtube".to_string());

    let fx = fixture(
        vec![vec!["c1", "p1"], vec!["c3", "c4"], vec!["p2"]],
        metadata,
        RecordedCaptions::default(),
    );

    let request = SearchRequest::new("rust", 10, "de").with_license_flag(true);
    let first = fx.aggregator.search(&request).await.unwrap();
    let second = fx.aggregator.search(&request).await.unwrap();

    assert_eq!(ids(&first), vec!["c1", "c3"]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_length_and_page_bounds_across_parameters() {
    let pages: Vec<Vec<&str>> = vec![
        vec!["c1", "c2", "p1"],
        vec!["c3"],
        vec![],
        vec!["c4", "c5", "c6"],
        vec!["p2", "c7"],
        vec!["c8"],
    ];

    for target in 0..9 {
        for budget in 0..8 {
            let fx = fixture(pages.clone(), RecordedMetadata::default(), RecordedCaptions::default());
            let request = SearchRequest::new("rust", target, "de").with_page_budget(budget);
            let videos = fx.aggregator.search(&request).await.unwrap();

            assert!(videos.len() <= target);
            assert!(fx.pages_served.load(Ordering::SeqCst) <= budget);

            // Accepted videos are a prefix of the chaptered candidates in search order.
            let expected: Vec<String> = pages
                .iter()
                .flatten()
                .filter(|id| id.starts_with('c'))
                .take(videos.len())
                .map(|id| id.to_string())
                .collect();
            assert_eq!(ids(&videos), expected);
        }
    }
}
