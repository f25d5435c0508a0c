//! YouTube Data API v3 client behind the `VideoSearch` seam

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::error::{AnalyzerError, Result};

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

/// One candidate item returned by the search endpoint
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel: String,
    pub published_at: DateTime<Utc>,
    pub thumbnail: String,
}

/// Per-item statistics returned by the videos endpoint
#[derive(Debug, Clone, Default)]
pub struct VideoStatistics {
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
}

/// External video-search interface consumed by the miner.
///
/// Implementations must surface quota and authentication failures as the
/// corresponding typed errors so per-window mining can stay all-or-nothing.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Search for videos published after the given cutoff, ordered by
    /// view count
    async fn search(
        &self,
        query: &str,
        published_after: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<SearchHit>>;

    /// Fetch statistics for the given video ids
    async fn statistics(&self, ids: &[String]) -> Result<HashMap<String, VideoStatistics>>;
}

/// YouTube Data API v3 client
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    max_retries: u32,
}

impl YouTubeClient {
    /// Create a client from search configuration.
    ///
    /// Fails with `MissingCredential` when no API key is configured.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(AnalyzerError::MissingCredential("YOUTUBE_API_KEY"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key,
            max_retries: config.max_retries,
        })
    }

    /// Issue a GET request, retrying transient failures with exponential
    /// backoff before surfacing the last error
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match self.try_get_json(url, params).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = Duration::from_secs(2_u64.pow(attempt));
                    warn!("Search request attempt {} failed, retrying in {:?}", attempt + 1, delay);
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| AnalyzerError::MiningFailed("all search attempts failed".to_string())))
    }

    async fn try_get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_api_error(status.as_u16(), &body));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl VideoSearch for YouTubeClient {
    async fn search(
        &self,
        query: &str,
        published_after: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<SearchHit>> {
        let cutoff = published_after.to_rfc3339_opts(SecondsFormat::Secs, true);
        let max = max_results.to_string();
        debug!("Searching videos for '{}' published after {}", query, cutoff);

        let response: SearchResponse = self
            .get_json(
                SEARCH_URL,
                &[
                    ("part", "id,snippet"),
                    ("q", query),
                    ("type", "video"),
                    ("order", "viewCount"),
                    ("publishedAfter", cutoff.as_str()),
                    ("maxResults", max.as_str()),
                ],
            )
            .await?;

        let hits = response
            .items
            .into_iter()
            .filter_map(|item| {
                let id = item.id.video_id?;
                let snippet = item.snippet?;
                Some(SearchHit {
                    id,
                    title: snippet.title,
                    description: snippet.description,
                    channel: snippet.channel_title,
                    published_at: snippet.published_at,
                    thumbnail: snippet.thumbnails.and_then(|t| t.high).map(|h| h.url).unwrap_or_default(),
                })
            })
            .collect();

        Ok(hits)
    }

    async fn statistics(&self, ids: &[String]) -> Result<HashMap<String, VideoStatistics>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let joined = ids.join(",");
        debug!("Fetching statistics for {} videos", ids.len());

        let response: VideosResponse = self
            .get_json(VIDEOS_URL, &[("part", "statistics"), ("id", joined.as_str())])
            .await?;

        let stats = response
            .items
            .into_iter()
            .map(|item| {
                let statistics = item.statistics.unwrap_or_default();
                (
                    item.id,
                    VideoStatistics {
                        view_count: parse_count(statistics.view_count),
                        like_count: parse_count(statistics.like_count),
                        comment_count: parse_count(statistics.comment_count),
                    },
                )
            })
            .collect();

        Ok(stats)
    }
}

/// The API reports counts as decimal strings
fn parse_count(value: Option<String>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Map a Google API error body to the analyzer taxonomy
fn map_api_error(status: u16, body: &str) -> AnalyzerError {
    let reason = serde_json::from_str::<ApiErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.errors.into_iter().next())
        .map(|e| e.reason)
        .unwrap_or_default();

    if reason.contains("quota") || reason.contains("Limit") {
        return AnalyzerError::QuotaExceeded(reason);
    }

    match status {
        400 | 401 | 403 => AnalyzerError::Authentication(if reason.is_empty() {
            format!("HTTP {}", status)
        } else {
            reason
        }),
        _ => AnalyzerError::MiningFailed(format!("HTTP {}: {}", status, reason)),
    }
}

// Wire format of the YouTube Data API v3 responses

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    description: String,
    #[serde(rename = "channelTitle")]
    channel_title: String,
    #[serde(rename = "publishedAt")]
    published_at: DateTime<Utc>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize, Default)]
struct Statistics {
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<String>,
    #[serde(rename = "commentCount")]
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorItem {
    #[serde(default)]
    reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_error_mapping() {
        let body = r#"{"error":{"code":403,"message":"quota","errors":[{"reason":"quotaExceeded"}]}}"#;
        assert!(matches!(map_api_error(403, body), AnalyzerError::QuotaExceeded(_)));
    }

    #[test]
    fn test_daily_limit_error_mapping() {
        let body = r#"{"error":{"code":403,"errors":[{"reason":"dailyLimitExceeded"}]}}"#;
        assert!(matches!(map_api_error(403, body), AnalyzerError::QuotaExceeded(_)));
    }

    #[test]
    fn test_auth_error_mapping() {
        let body = r#"{"error":{"code":400,"errors":[{"reason":"keyInvalid"}]}}"#;
        assert!(matches!(map_api_error(400, body), AnalyzerError::Authentication(_)));
    }

    #[test]
    fn test_server_error_is_transient() {
        let error = map_api_error(503, "");
        assert!(matches!(error, AnalyzerError::MiningFailed(_)));
        assert!(error.is_transient());
    }

    #[test]
    fn test_parse_count_handles_missing_values() {
        assert_eq!(parse_count(Some("1234".to_string())), 1234);
        assert_eq!(parse_count(Some("not a number".to_string())), 0);
        assert_eq!(parse_count(None), 0);
    }

    #[test]
    fn test_search_response_deserialization() {
        let body = r#"{
            "items": [{
                "id": {"videoId": "abc123"},
                "snippet": {
                    "title": "Morning Meditation",
                    "description": "Guided practice",
                    "channelTitle": "Calm Minds",
                    "publishedAt": "2025-05-01T08:00:00Z",
                    "thumbnails": {"high": {"url": "https://i.ytimg.com/vi/abc123/hq.jpg"}}
                }
            }]
        }"#;

        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].id.video_id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_statistics_response_deserialization() {
        let body = r#"{"items":[{"id":"abc123","statistics":{"viewCount":"1000","likeCount":"50","commentCount":"7"}}]}"#;
        let parsed: VideosResponse = serde_json::from_str(body).unwrap();
        let stats = parsed.items[0].statistics.as_ref().unwrap();
        assert_eq!(stats.view_count.as_deref(), Some("1000"));
    }
}
