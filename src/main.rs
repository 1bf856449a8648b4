use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use yt_chapter_finder::{
    ChapterExtractor, Config, ResultStore, RunSettings, SearchAggregator, SearchRunner, VideoFilter,
    YouTubeApi, YtDlp,
};

fn cli() -> Command {
    Command::new("YouTube Chapter Finder")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Search and download videos with chapter function for given queries")
        .arg(
            Arg::new("query")
                .short('q')
                .long("query")
                .value_name("QUERY")
                .help("Single search query to overwrite default search terms"),
        )
        .arg(
            Arg::new("filepath")
                .short('f')
                .long("filepath")
                .value_name("DIR")
                .help("File path where the search result should be stored"),
        )
        .arg(
            Arg::new("number")
                .short('n')
                .long("number")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize))
                .help("Number of videos to search per query"),
        )
        .arg(
            Arg::new("language")
                .short('l')
                .long("language")
                .value_name("LANG")
                .help("Search language, default german"),
        )
        .arg(
            Arg::new("pages")
                .short('p')
                .long("pages")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize))
                .help("Number of result pages to visit per query"),
        )
        .arg(
            Arg::new("creative-common")
                .short('c')
                .long("creative-common")
                .help("If specified, searches only Creative Common videos")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("caption")
                .short('t')
                .long("caption")
                .help("If specified, searches videos with captions")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("download")
                .short('d')
                .long("download")
                .help("If specified, downloads found videos")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("overwrite")
                .short('w')
                .long("overwrite")
                .help("If specified, starts search from scratch and overwrites existing results")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Configuration file (TOML)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config_result = match matches.get_one::<String>("config") {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    };

    let default_filter = match &config_result {
        _ if matches.get_flag("verbose") => "yt_chapter_finder=debug,info".to_string(),
        Ok(config) => format!("yt_chapter_finder={},warn", config.output.log_level),
        Err(_) => "yt_chapter_finder=info,warn".to_string(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let mut config = match config_result {
        Ok(config) => config,
        Err(e) if matches.contains_id("config") => return Err(e),
        Err(e) => {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }
    };

    if let Some(language) = matches.get_one::<String>("language") {
        config.search.language = language.clone();
    }
    if let Some(number) = matches.get_one::<usize>("number") {
        config.search.target_count = *number;
    }
    if let Some(pages) = matches.get_one::<usize>("pages") {
        config.search.page_budget = *pages;
    }
    if let Some(filepath) = matches.get_one::<String>("filepath") {
        config.output.data_dir = PathBuf::from(filepath);
    }
    config.validate()?;

    let queries = match matches.get_one::<String>("query") {
        Some(query) => vec![query.clone()],
        None => config.search.default_queries.clone(),
    };

    let settings = RunSettings {
        queries,
        data_dir: config.output.data_dir.clone(),
        target_count: config.search.target_count,
        language: config.search.language.clone(),
        creative_commons: matches.get_flag("creative-common"),
        caption: matches.get_flag("caption"),
        download: matches.get_flag("download"),
        overwrite: matches.get_flag("overwrite"),
        page_budget: config.search.page_budget,
        min_chapters: config.search.min_chapters,
        started_at: chrono::Utc::now(),
    };

    let store = ResultStore::new(&settings.data_dir);
    let needs_search = settings.overwrite || !store.has_results();
    if needs_search {
        if settings.queries.is_empty() {
            return Err(anyhow!("No search queries: pass --query or set search.default_queries"));
        }
        if config.youtube.api_key.is_none() {
            return Err(anyhow!(
                "YouTube API key required: set youtube.api_key or YT_CHAPTER_FINDER_API_KEY"
            ));
        }
    }

    info!("🚀 YouTube Chapter Finder starting...");
    info!("{}", config.summary());
    info!("🔎 Queries: {:?}", settings.queries);
    info!("🔧 CC only: {}, captions: {}", settings.creative_commons, settings.caption);

    let api = Arc::new(YouTubeApi::new(config.youtube.clone())?);
    let ytdlp = Arc::new(YtDlp::new(config.ytdlp.clone()));
    let filter = VideoFilter::new(api.clone(), ytdlp.clone());
    let aggregator = SearchAggregator::new(
        api.clone(),
        api,
        filter,
        ChapterExtractor::with_min_chapters(config.search.min_chapters),
    );

    let runner = SearchRunner::new(aggregator, store, ytdlp)
        .with_query_timeout(config.search.timeout_seconds.map(Duration::from_secs));

    let summary = runner.run(&settings).await?;

    info!("✅ Videos: {}{}", summary.total, if summary.reused { " (reused)" } else { "" });
    if settings.download {
        info!("⬇️ Downloaded: {}", summary.downloaded);
        info!("❌ Failed downloads: {}", summary.failed_downloads);
    }

    Ok(())
}
