/// Persistence of search results and run settings
use crate::error::Result;
use crate::search::AcceptedVideo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const RESULTS_FILE: &str = "results.json";
pub const SETTINGS_LOG_FILE: &str = "logs.json";

/// Settings of one run, written next to the results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    pub queries: Vec<String>,
    pub data_dir: PathBuf,
    pub target_count: usize,
    pub language: String,
    pub creative_commons: bool,
    pub caption: bool,
    pub download: bool,
    pub overwrite: bool,
    pub page_budget: usize,
    pub min_chapters: usize,
    #[serde(default = "Utc::now")]
    pub started_at: DateTime<Utc>,
}

/// Reads and writes `results.json` and `logs.json` in the data directory
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn results_path(&self) -> PathBuf {
        self.dir.join(RESULTS_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_LOG_FILE)
    }

    /// Create the data directory if needed
    pub async fn initialize(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    pub fn has_results(&self) -> bool {
        self.results_path().exists()
    }

    /// Load previously saved results, `None` when there are none
    pub async fn load(&self) -> Result<Option<Vec<AcceptedVideo>>> {
        let path = self.results_path();
        if !path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path).await?;
        let videos: Vec<AcceptedVideo> = serde_json::from_str(&content)?;
        info!("📚 Loaded {} videos from {}", videos.len(), path.display());
        Ok(Some(videos))
    }

    pub async fn save(&self, videos: &[AcceptedVideo]) -> Result<()> {
        let path = self.results_path();
        tokio::fs::write(&path, serde_json::to_string_pretty(videos)?).await?;
        info!("💾 Saved {} videos to {}", videos.len(), path.display());
        Ok(())
    }

    pub async fn write_settings(&self, settings: &RunSettings) -> Result<()> {
        tokio::fs::write(self.settings_path(), serde_json::to_string_pretty(settings)?).await?;
        Ok(())
    }
}
