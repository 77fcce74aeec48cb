//! YouTube Data API v3 client for educational video search.

use super::{default_duration, default_view_count, Video, VideoQuery};
use crate::config::{TrustedChannel, YoutubeSettings};
use crate::error::{FocusTubeError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Search ordering supported by the `search` endpoint.
#[derive(Debug, Clone, Copy)]
enum SearchOrder {
    Relevance,
    ViewCount,
}

impl SearchOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SearchOrder::Relevance => "relevance",
            SearchOrder::ViewCount => "viewCount",
        }
    }
}

/// Client for the YouTube Data API.
pub struct YoutubeClient {
    http: reqwest::Client,
    api_key: Option<String>,
    settings: YoutubeSettings,
}

impl YoutubeClient {
    /// Create a client; the API key is resolved once from env or config.
    pub fn new(settings: &YoutubeSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        let api_key = settings.resolve_api_key();
        if api_key.is_none() {
            warn!("YouTube API key not found. Video search will not work.");
        }

        Ok(Self {
            http,
            api_key,
            settings: settings.clone(),
        })
    }

    /// Whether an API key is available.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// The educational channel whitelist.
    pub fn trusted_channels(&self) -> &[TrustedChannel] {
        &self.settings.trusted_channels
    }

    /// Search for educational videos.
    #[instrument(skip(self), fields(q = %query.q))]
    pub async fn search(&self, query: &VideoQuery) -> Result<Vec<Video>> {
        let text = query.search_text(&self.settings.educational_keywords);
        let channel = query
            .channels
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        self.search_videos(
            &text,
            SearchOrder::Relevance,
            self.settings.max_results,
            channel,
            query.duration.map(|d| d.as_str()),
        )
        .await
    }

    /// Popular educational videos for one of the configured trending queries.
    ///
    /// `seed` selects the query; callers pass something time-derived to rotate topics.
    #[instrument(skip(self))]
    pub async fn trending(&self, seed: usize) -> Result<Vec<Video>> {
        let topic = self.trending_query(seed).ok_or_else(|| {
            FocusTubeError::Config("No trending queries configured".to_string())
        })?;
        let text = format!("{} education", topic);
        info!("Fetching trending videos for '{}'", topic);

        self.search_videos(
            &text,
            SearchOrder::ViewCount,
            self.settings.trending_results,
            None,
            None,
        )
        .await
    }

    /// The trending query picked by `seed`.
    pub fn trending_query(&self, seed: usize) -> Option<&str> {
        let queries = &self.settings.trending_queries;
        if queries.is_empty() {
            return None;
        }
        Some(queries[seed % queries.len()].as_str())
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            FocusTubeError::Config(
                "YouTube API key not configured. Please set YOUTUBE_API_KEY environment variable."
                    .to_string(),
            )
        })
    }

    async fn search_videos(
        &self,
        text: &str,
        order: SearchOrder,
        max_results: u32,
        channel_id: Option<&str>,
        video_duration: Option<&str>,
    ) -> Result<Vec<Video>> {
        let key = self.api_key()?;
        let url = self.search_url(key, text, order, max_results, channel_id, video_duration)?;

        let response: SearchResponse = self.get_json(url).await?;
        let items: Vec<SearchItem> = response
            .items
            .into_iter()
            .filter(|item| item.id.video_id.is_some())
            .collect();

        if items.is_empty() {
            debug!("Search returned no videos");
            return Ok(Vec::new());
        }

        let ids: Vec<&str> = items
            .iter()
            .filter_map(|item| item.id.video_id.as_deref())
            .collect();

        // Missing details only cost us duration and view count.
        let details = match self.fetch_details(key, &ids).await {
            Ok(details) => details,
            Err(e) => {
                warn!("Failed to fetch video details: {}", e);
                HashMap::new()
            }
        };

        let videos = merge_details(items, &details);
        debug!("Search returned {} videos", videos.len());
        Ok(videos)
    }

    async fn fetch_details(&self, key: &str, ids: &[&str]) -> Result<HashMap<String, VideoDetails>> {
        let url = self.endpoint("videos", &[
            ("part", "contentDetails,statistics"),
            ("id", &ids.join(",")),
            ("key", key),
        ])?;

        let response: VideosResponse = self.get_json(url).await?;
        Ok(response
            .items
            .into_iter()
            .map(|d| (d.id.clone(), d))
            .collect())
    }

    fn search_url(
        &self,
        key: &str,
        text: &str,
        order: SearchOrder,
        max_results: u32,
        channel_id: Option<&str>,
        video_duration: Option<&str>,
    ) -> Result<Url> {
        let max_results = max_results.to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("type", "video"),
            ("q", text),
            ("key", key),
            ("maxResults", max_results.as_str()),
            ("order", order.as_str()),
            ("safeSearch", "strict"),
            ("videoEmbeddable", "true"),
        ];
        if let Some(channel_id) = channel_id {
            params.push(("channelId", channel_id));
        }
        if let Some(duration) = video_duration {
            params.push(("videoDuration", duration));
        }

        self.endpoint("search", &params)
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let base = format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path);
        Url::parse_with_params(&base, params)
            .map_err(|e| FocusTubeError::Config(format!("Invalid YouTube base URL: {}", e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FocusTubeError::YouTube(format!("{} - {}", status, body.trim())));
        }

        Ok(response.json().await?)
    }
}

/// Combine search snippets with per-video details, keeping search order.
fn merge_details(items: Vec<SearchItem>, details: &HashMap<String, VideoDetails>) -> Vec<Video> {
    items
        .into_iter()
        .filter_map(|item| {
            let id = item.id.video_id?;
            let detail = details.get(&id);
            let snippet = item.snippet;

            Some(Video {
                thumbnail: snippet.thumbnails.best_url(),
                title: snippet.title,
                description: snippet.description,
                channel: snippet.channel_title,
                published_at: snippet.published_at,
                duration: detail
                    .and_then(|d| d.content_details.as_ref())
                    .and_then(|c| c.duration.clone())
                    .unwrap_or_else(default_duration),
                view_count: detail
                    .and_then(|d| d.statistics.as_ref())
                    .and_then(|s| s.view_count.clone())
                    .unwrap_or_else(default_view_count),
                id,
            })
        })
        .collect()
}

// === Data API response types ===

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    #[serde(default)]
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Snippet {
    title: String,
    description: String,
    channel_title: String,
    published_at: String,
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Thumbnails {
    medium: Option<Thumbnail>,
    high: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

impl Thumbnails {
    fn best_url(&self) -> String {
        [&self.medium, &self.high, &self.default]
            .into_iter()
            .flatten()
            .map(|t| t.url.clone())
            .next()
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoDetails {
    id: String,
    content_details: Option<ContentDetails>,
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
}
