/// YouTube Data API v3 search and metadata provider
use crate::config::YouTubeConfig;
use crate::error::{Result, SearchError};
use crate::search::{Candidate, MetadataProvider, SearchProvider, SearchSession};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchListResponse {
    next_page_token: Option<String>,
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    snippet: Option<Snippet>,
    status: Option<VideoStatus>,
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
struct VideoStatus {
    license: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

/// Data API client, authenticated with an API key
#[derive(Clone)]
pub struct YouTubeApi {
    client: Client,
    config: YouTubeConfig,
}

impl YouTubeApi {
    /// The API key is checked per request, so a keyless client can be built
    /// for runs that never reach the API.
    pub fn new(config: YouTubeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| SearchError::Config("YouTube API key not configured".to_string()))?;
        let base = format!("{}/{}", self.config.api_base_url.trim_end_matches('/'), resource);
        let mut url = Url::parse(&base)
            .map_err(|e| SearchError::Config(format!("Invalid API base URL {}: {}", base, e)))?;

        url.query_pairs_mut()
            .extend_pairs(params.iter().copied())
            .append_pair("key", api_key);

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url.path());
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SearchError::Upstream(format!("YouTube API error {}: {}", status, text)));
        }

        Ok(response.json().await?)
    }

    async fn fetch_video(&self, video_id: &str, part: &str) -> Result<VideoResource> {
        let url = self.endpoint("videos", &[("part", part), ("id", video_id)])?;
        let response: VideoListResponse = self.get_json(url).await?;

        response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::Upstream(format!("Video not found: {}", video_id)))
    }

    /// Formatted durations keyed by video id
    async fn fetch_durations(&self, video_ids: &[String]) -> Result<HashMap<String, String>> {
        if video_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids = video_ids.join(",");
        let url = self.endpoint("videos", &[("part", "contentDetails"), ("id", ids.as_str())])?;
        let response: VideoListResponse = self.get_json(url).await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|video| {
                let duration = video.content_details?.duration?;
                Some((video.id, format_iso_duration(&duration).unwrap_or(duration)))
            })
            .collect())
    }

    async fn search_page(
        &self,
        query: &str,
        language: &str,
        page_token: Option<&str>,
    ) -> Result<SearchListResponse> {
        let max_results = self.config.results_per_page.to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("type", "video"),
            ("q", query),
            ("relevanceLanguage", language),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let url = self.endpoint("search", &params)?;
        self.get_json(url).await
    }
}

#[async_trait]
impl SearchProvider for YouTubeApi {
    async fn open_session(&self, query: &str, language: &str) -> Result<Box<dyn SearchSession>> {
        Ok(Box::new(YouTubeSearchSession {
            api: self.clone(),
            query: query.to_string(),
            language: language.to_string(),
            next_token: None,
            exhausted: false,
        }))
    }
}

#[async_trait]
impl MetadataProvider for YouTubeApi {
    async fn get_description(&self, video_id: &str) -> Result<String> {
        let video = self.fetch_video(video_id, "snippet").await?;
        video
            .snippet
            .map(|snippet| snippet.description)
            .ok_or_else(|| SearchError::Upstream(format!("No snippet for video {}", video_id)))
    }

    async fn get_license_status(&self, video_id: &str) -> Result<String> {
        let video = self.fetch_video(video_id, "status").await?;
        video
            .status
            .and_then(|status| status.license)
            .ok_or_else(|| SearchError::Upstream(format!("No license status for video {}", video_id)))
    }
}

/// Page cursor over `search.list`
pub struct YouTubeSearchSession {
    api: YouTubeApi,
    query: String,
    language: String,
    next_token: Option<String>,
    exhausted: bool,
}

#[async_trait]
impl SearchSession for YouTubeSearchSession {
    async fn next_page(&mut self) -> Result<Vec<Candidate>> {
        if self.exhausted {
            return Ok(Vec::new());
        }

        let response = self
            .api
            .search_page(&self.query, &self.language, self.next_token.as_deref())
            .await?;

        self.next_token = response.next_page_token;
        self.exhausted = self.next_token.is_none();

        let hits: Vec<(String, Snippet)> = response
            .items
            .into_iter()
            .filter_map(|item| Some((item.id.video_id?, item.snippet?)))
            .collect();

        let ids: Vec<String> = hits.iter().map(|(id, _)| id.clone()).collect();
        let durations = self.api.fetch_durations(&ids).await?;

        Ok(hits
            .into_iter()
            .map(|(id, snippet)| Candidate {
                title: unescape_html(&snippet.title),
                link: watch_url(&id),
                duration: durations.get(&id).cloned().unwrap_or_default(),
                description: unescape_html(&snippet.description),
                id,
            })
            .collect())
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Format an ISO-8601 duration (`PT1H2M3S`) the way YouTube displays it (`1:02:03`)
pub fn format_iso_duration(iso: &str) -> Option<String> {
    let re = Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").ok()?;
    let caps = re.captures(iso)?;

    let field = |index: usize| -> u64 {
        caps.get(index)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    let hours = field(1) * 24 + field(2);
    let minutes = field(3);
    let seconds = field(4);

    if hours > 0 {
        Some(format!("{}:{:02}:{:02}", hours, minutes, seconds))
    } else {
        Some(format!("{}:{:02}", minutes, seconds))
    }
}

/// Search snippets come HTML-escaped
fn unescape_html(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
