use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the chapter finder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Search loop settings
    pub search: SearchConfig,

    /// YouTube Data API settings
    pub youtube: YouTubeConfig,

    /// yt-dlp settings for captions and downloads
    pub ytdlp: YtDlpConfig,

    /// Output and logging settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Queries used when no query is given on the command line
    pub default_queries: Vec<String>,

    /// Target number of videos per query
    pub target_count: usize,

    /// Search and caption language
    pub language: String,

    /// Maximum result pages visited per query
    pub page_budget: usize,

    /// Minimum timestamps for a description to count as chaptered
    pub min_chapters: usize,

    /// Optional wall-clock limit per query (seconds)
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// Data API key
    pub api_key: Option<String>,

    /// Base URL of the Data API
    pub api_base_url: String,

    /// Results per search page (1-50)
    pub results_per_page: u32,

    /// HTTP request timeout in seconds
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YtDlpConfig {
    /// yt-dlp executable name or path
    pub binary: String,

    /// Download format selector
    pub format: String,

    /// Extra arguments passed to every invocation (cookies, proxy, ...)
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for results.json, logs.json and downloads
    pub data_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_queries: Vec::new(),
            target_count: 20,
            language: "de".to_string(),
            page_budget: crate::search::DEFAULT_PAGE_BUDGET,
            min_chapters: crate::chapters::DEFAULT_MIN_CHAPTERS,
            timeout_seconds: None,
        }
    }
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            results_per_page: 20,
            request_timeout_seconds: 30,
        }
    }
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            format: "mp4".to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/"),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, falling back to
    /// defaults plus environment overrides
    pub fn load() -> Result<Self> {
        let config_paths = ["yt-chapter-finder.toml", "config/yt-chapter-finder.toml"];

        for path in &config_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Self::from_env()
    }

    /// Load configuration from a specific TOML file; env vars still override
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let mut config: Config = toml::from_str(&config_str)
            .map_err(|e| anyhow!("Failed to parse config {}: {}", path.display(), e))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());

        config.apply_env();
        Ok(config)
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(api_key) = std::env::var("YT_CHAPTER_FINDER_API_KEY") {
            self.youtube.api_key = Some(api_key);
        }

        if let Ok(data_dir) = std::env::var("YT_CHAPTER_FINDER_DATA_DIR") {
            self.output.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(language) = std::env::var("YT_CHAPTER_FINDER_LANGUAGE") {
            self.search.language = language;
        }

        if let Ok(log_level) = std::env::var("YT_CHAPTER_FINDER_LOG_LEVEL") {
            self.output.log_level = log_level;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.as_ref().display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.search.page_budget == 0 {
            return Err(anyhow!("page_budget must be greater than 0"));
        }

        if self.search.min_chapters == 0 {
            return Err(anyhow!("min_chapters must be greater than 0"));
        }

        if self.search.language.trim().is_empty() {
            return Err(anyhow!("language must not be empty"));
        }

        if !(1..=50).contains(&self.youtube.results_per_page) {
            return Err(anyhow!("results_per_page must be between 1 and 50"));
        }

        if self.ytdlp.binary.trim().is_empty() {
            return Err(anyhow!("yt-dlp binary must not be empty"));
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Chapter Finder Configuration:\n\
            - Target per query: {}\n\
            - Language: {}\n\
            - Page budget: {}\n\
            - Minimum chapters: {}\n\
            - API key: {}\n\
            - Data directory: {}",
            self.search.target_count,
            self.search.language,
            self.search.page_budget,
            self.search.min_chapters,
            if self.youtube.api_key.is_some() { "set" } else { "not set" },
            self.output.data_dir.display()
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.youtube.api_key = Some(api_key.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.config.search.language = language.into();
        self
    }

    pub fn with_target_count(mut self, count: usize) -> Self {
        self.config.search.target_count = count;
        self
    }

    pub fn with_page_budget(mut self, pages: usize) -> Self {
        self.config.search.page_budget = pages;
        self
    }

    pub fn with_min_chapters(mut self, min_chapters: usize) -> Self {
        self.config.search.min_chapters = min_chapters;
        self
    }

    pub fn with_data_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.data_dir = dir;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
