/// Thumbnail URL resolution with a single fallback step
use super::VideoId;
use crate::config::ThumbnailConfig;
use crate::error::{AnalyzerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

const PRIMARY_IMAGE: &str = "maxresdefault.jpg";
const FALLBACK_IMAGE: &str = "hqdefault.jpg";

/// Existence check for a remote image
#[async_trait]
pub trait ThumbnailProbe: Send + Sync {
    async fn is_available(&self, url: &str) -> bool;
}

/// Probe that issues an HTTP GET and accepts any success status
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| AnalyzerError::Config(format!("failed to build thumbnail HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ThumbnailProbe for HttpProbe {
    async fn is_available(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Thumbnail probe for {} failed: {}", url, e);
                false
            }
        }
    }
}

/// Resolves the best available thumbnail for a video
pub struct ThumbnailResolver {
    base_url: String,
    enabled: bool,
    probe: Box<dyn ThumbnailProbe>,
}

impl ThumbnailResolver {
    /// Create a resolver that probes over HTTP
    pub fn new(config: &ThumbnailConfig) -> Result<Self> {
        let probe = HttpProbe::new(config.timeout_seconds)?;
        Ok(Self::with_probe(config, Box::new(probe)))
    }

    pub fn with_probe(config: &ThumbnailConfig, probe: Box<dyn ThumbnailProbe>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            enabled: config.enabled,
            probe,
        }
    }

    pub fn primary_url(&self, video_id: &VideoId) -> String {
        format!("{}/{}/{}", self.base_url, video_id, PRIMARY_IMAGE)
    }

    pub fn fallback_url(&self, video_id: &VideoId) -> String {
        format!("{}/{}/{}", self.base_url, video_id, FALLBACK_IMAGE)
    }

    /// Return the high-resolution thumbnail when it exists, else the fallback.
    ///
    /// The fallback is never probed.
    pub async fn resolve(&self, video_id: &VideoId) -> Result<String> {
        if !self.enabled {
            return Err(AnalyzerError::ThumbnailUnavailable("thumbnail resolution disabled".to_string()));
        }
        if self.base_url.is_empty() {
            return Err(AnalyzerError::ThumbnailUnavailable("no thumbnail base URL configured".to_string()));
        }

        let primary = self.primary_url(video_id);
        if self.probe.is_available(&primary).await {
            info!("🖼️ Using high-resolution thumbnail for {}", video_id);
            return Ok(primary);
        }

        debug!("Primary thumbnail unavailable for {}, falling back", video_id);
        Ok(self.fallback_url(video_id))
    }
}
