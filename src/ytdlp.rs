/// yt-dlp backed caption lookup and media download
use crate::config::YtDlpConfig;
use crate::error::{Result, SearchError};
use crate::search::{AcceptedVideo, CaptionLanguages, CaptionProvider};
use crate::youtube::watch_url;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Subset of `yt-dlp --dump-single-json` output
#[derive(Debug, Deserialize)]
struct InfoJson {
    #[serde(default)]
    subtitles: Option<HashMap<String, Value>>,
    #[serde(default)]
    automatic_captions: Option<HashMap<String, Value>>,
}

/// Fetches accepted videos to disk
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Download `video` and its subtitles in `language` into `output_dir`
    async fn download(&self, video: &AcceptedVideo, output_dir: &Path, language: &str) -> Result<()>;
}

/// Wrapper around the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    config: YtDlpConfig,
}

impl YtDlp {
    pub fn new(config: YtDlpConfig) -> Self {
        Self { config }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.config.binary);
        command.args(&self.config.extra_args);
        command.kill_on_drop(true);
        command
    }

    fn download_args(&self, link: &str, output_dir: &Path, language: &str) -> Vec<String> {
        let template: PathBuf = output_dir.join("%(id)s.%(ext)s");
        vec![
            "--write-subs".to_string(),
            "--write-auto-subs".to_string(),
            "--sub-langs".to_string(),
            language.to_string(),
            "--no-overwrites".to_string(),
            "--no-progress".to_string(),
            "-f".to_string(),
            self.config.format.clone(),
            "-o".to_string(),
            template.to_string_lossy().into_owned(),
            link.to_string(),
        ]
    }
}

#[async_trait]
impl CaptionProvider for YtDlp {
    async fn get_caption_languages(&self, video_id: &str) -> Result<CaptionLanguages> {
        let output = self
            .command()
            .args(["--dump-single-json", "--skip-download", "--no-warnings"])
            .arg(watch_url(video_id))
            .output()
            .await
            .map_err(|e| {
                SearchError::Extraction(format!("Failed to run {}: {}", self.config.binary, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SearchError::Extraction(format!(
                "yt-dlp failed for {} ({}): {}",
                video_id,
                output.status,
                stderr.trim()
            )));
        }

        let languages = parse_caption_languages(&output.stdout)?;
        debug!(
            "Captions for {}: manual {:?}, automatic {} language(s)",
            video_id,
            languages.manual,
            languages.automatic.len()
        );
        Ok(languages)
    }
}

#[async_trait]
impl MediaDownloader for YtDlp {
    async fn download(&self, video: &AcceptedVideo, output_dir: &Path, language: &str) -> Result<()> {
        info!("⬇️ Downloading... {}", video.title);

        let output = self
            .command()
            .args(self.download_args(&video.link, output_dir, language))
            .output()
            .await
            .map_err(|e| SearchError::Download(format!("Failed to run {}: {}", self.config.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SearchError::Download(format!(
                "{} ({}): {}",
                video.link,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

fn parse_caption_languages(stdout: &[u8]) -> Result<CaptionLanguages> {
    let info: InfoJson = serde_json::from_slice(stdout)
        .map_err(|e| SearchError::Extraction(format!("Invalid yt-dlp JSON: {}", e)))?;

    Ok(CaptionLanguages {
        manual: info.subtitles.unwrap_or_default().into_keys().collect(),
        automatic: info.automatic_captions.unwrap_or_default().into_keys().collect(),
    })
}
