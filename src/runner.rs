use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::results::{ResultStore, RunSettings};
use crate::search::{AcceptedVideo, SearchAggregator, SearchRequest};
use crate::ytdlp::MediaDownloader;

/// Outcome of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Videos in the result set (found now or reused)
    pub total: usize,
    /// True when an existing results.json was reused instead of searching
    pub reused: bool,
    pub downloaded: usize,
    pub failed_downloads: usize,
}

/// Runs queries one after another and handles persistence and downloads
pub struct SearchRunner {
    aggregator: SearchAggregator,
    store: ResultStore,
    downloader: Arc<dyn MediaDownloader>,
    query_timeout: Option<Duration>,
}

impl SearchRunner {
    pub fn new(
        aggregator: SearchAggregator,
        store: ResultStore,
        downloader: Arc<dyn MediaDownloader>,
    ) -> Self {
        Self {
            aggregator,
            store,
            downloader,
            query_timeout: None,
        }
    }

    /// Abort a query that runs longer than `timeout`
    pub fn with_query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub async fn run(&self, settings: &RunSettings) -> Result<RunSummary> {
        let start_time = Instant::now();
        self.store.initialize().await?;

        let mut summary = RunSummary::default();

        // Overwrite never reads the old results
        let existing = if settings.overwrite {
            None
        } else {
            self.store.load().await?
        };

        let videos = match existing {
            Some(videos) => {
                info!("♻️ Reusing previous results from {}", self.store.results_path().display());
                summary.reused = true;
                videos
            }
            None => {
                self.store.write_settings(settings).await?;
                let videos = self.search_all(settings).await?;
                self.store.save(&videos).await?;
                videos
            }
        };
        summary.total = videos.len();

        if settings.download {
            for video in &videos {
                match self
                    .downloader
                    .download(video, self.store.dir(), &settings.language)
                    .await
                {
                    Ok(()) => summary.downloaded += 1,
                    Err(e) => {
                        warn!("❌ Download failed for {}: {}", video.title, e);
                        summary.failed_downloads += 1;
                    }
                }
            }
        }

        info!("🎉 Run completed in {:.2}s", start_time.elapsed().as_secs_f64());
        Ok(summary)
    }

    async fn search_all(&self, settings: &RunSettings) -> Result<Vec<AcceptedVideo>> {
        let mut videos = Vec::new();

        for query in &settings.queries {
            let request = SearchRequest::new(
                query.as_str(),
                settings.target_count,
                settings.language.as_str(),
            )
            .with_license_flag(settings.creative_commons)
            .with_caption_flag(settings.caption)
            .with_page_budget(settings.page_budget);

            let found = self.search_one(&request).await?;
            info!("For query \"{}\", {} videos are found.", query, found.len());
            videos.extend(found);
        }

        info!("Total {} videos are found.", videos.len());
        Ok(videos)
    }

    async fn search_one(&self, request: &SearchRequest) -> Result<Vec<AcceptedVideo>> {
        let search = self.aggregator.search(request);

        let found = match self.query_timeout {
            Some(timeout) => tokio::time::timeout(timeout, search).await.map_err(|_| {
                anyhow!("Query \"{}\" timed out after {:?}", request.query, timeout)
            })??,
            None => search.await?,
        };

        Ok(found)
    }
}
