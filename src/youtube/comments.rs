/// Top-level comment retrieval through the YouTube Data API v3
use super::VideoId;
use crate::config::YouTubeConfig;
use crate::error::{AnalyzerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// API page size ceiling for commentThreads.list
pub const MAX_RESULTS_LIMIT: u32 = 100;

/// One page of raw top-level comment text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentPage {
    /// Comment display text in API order
    pub comments: Vec<String>,
    /// The API reported a next page; only the first page is ever read
    pub has_more: bool,
}

/// Source of raw comments for a video
#[async_trait]
pub trait CommentSource: Send + Sync {
    async fn fetch_comments(&self, video_id: &VideoId) -> Result<CommentPage>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadListResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    text_display: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: u16,
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    reason: Option<String>,
}

/// Parse a commentThreads.list response body
pub fn parse_comment_threads(body: &str) -> Result<CommentPage> {
    let response: CommentThreadListResponse = serde_json::from_str(body)
        .map_err(|e| AnalyzerError::FetchFailure(format!("unexpected comment API response: {}", e)))?;

    let comments = response
        .items
        .into_iter()
        .map(|thread| thread.snippet.top_level_comment.snippet.text_display)
        .collect();

    Ok(CommentPage {
        comments,
        has_more: response.next_page_token.is_some(),
    })
}

/// Turn an API error body into a readable message, falling back to the raw text
fn describe_api_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) => {
            let reasons: Vec<String> = parsed
                .error
                .errors
                .into_iter()
                .filter_map(|e| e.reason)
                .collect();
            if reasons.is_empty() {
                format!("YouTube API error {}: {}", parsed.error.code, parsed.error.message)
            } else {
                format!(
                    "YouTube API error {} ({}): {}",
                    parsed.error.code,
                    reasons.join(", "),
                    parsed.error.message
                )
            }
        }
        Err(_) => format!("YouTube API error {}: {}", status, body.trim()),
    }
}

/// YouTube Data API comment fetcher
#[derive(Clone)]
pub struct CommentFetcher {
    client: Client,
    api_base_url: String,
    api_key: String,
    max_results: u32,
}

impl CommentFetcher {
    /// Create a new fetcher; the API key must be present
    pub fn new(config: &YouTubeConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AnalyzerError::Config("YouTube Data API key not configured".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AnalyzerError::Config(format!("failed to build HTTP client: {}", e)))?;

        let max_results = config.max_results.clamp(1, MAX_RESULTS_LIMIT);
        if max_results != config.max_results {
            warn!("max_results {} out of range, using {}", config.max_results, max_results);
        }

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key,
            max_results,
        })
    }

    /// Build the commentThreads.list request URL
    pub fn request_url(&self, video_id: &VideoId) -> Result<Url> {
        let max_results = self.max_results.to_string();
        Url::parse_with_params(
            &format!("{}/commentThreads", self.api_base_url),
            &[
                ("part", "snippet"),
                ("videoId", video_id.as_str()),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ],
        )
        .map_err(|e| AnalyzerError::Config(format!("invalid YouTube API base URL: {}", e)))
    }
}

#[async_trait]
impl CommentSource for CommentFetcher {
    async fn fetch_comments(&self, video_id: &VideoId) -> Result<CommentPage> {
        info!("💬 Fetching up to {} comments for video {}", self.max_results, video_id);

        let url = self.request_url(video_id)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AnalyzerError::FetchFailure(describe_api_error(status, &body)));
        }

        let page = parse_comment_threads(&body)?;
        debug!("Comment API returned {} items (more available: {})", page.comments.len(), page.has_more);

        if page.has_more {
            info!("📄 More comments exist beyond the first page; only {} were retrieved", page.comments.len());
        }

        Ok(page)
    }
}
