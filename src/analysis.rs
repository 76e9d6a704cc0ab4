use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AnalyzerError, Result};
use crate::sentiment::{create_classifier, SentimentClassifier};
use crate::session::{CommentRecord, SentimentFilter, Session, Summary};
use crate::youtube::{extract_video_id, CommentFetcher, CommentSource, ThumbnailResolver, VideoId};

/// Failure messages kept per run; the count is always exact
const MAX_REPORTED_FAILURES: usize = 5;

/// Result of one analyze action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub video_id: VideoId,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub thumbnail_error: Option<String>,
    /// Comments returned by the API this run
    pub fetched: usize,
    /// Comments classified and recorded this run
    pub classified: usize,
    /// Comments dropped because classification failed
    pub skipped: usize,
    pub failures: Vec<String>,
    /// The API has comments beyond the single page that was read
    pub has_more_comments: bool,
    /// Summary over every record in the session
    pub summary: Summary,
    pub filter: SentimentFilter,
    /// Session records matching `filter`, in original order
    pub comments: Vec<CommentRecord>,
    pub generated_at: DateTime<Utc>,
    pub processing_seconds: f64,
}

impl AnalysisReport {
    pub fn is_degraded(&self) -> bool {
        self.skipped > 0
    }
}

/// Fetch, classify and aggregate pipeline
pub struct Analyzer {
    source: Box<dyn CommentSource>,
    classifier: Box<dyn SentimentClassifier>,
    thumbnails: Option<ThumbnailResolver>,
    concurrency: usize,
}

impl Analyzer {
    pub fn new(source: Box<dyn CommentSource>, classifier: Box<dyn SentimentClassifier>) -> Self {
        Self {
            source,
            classifier,
            thumbnails: None,
            concurrency: 1,
        }
    }

    /// Build the production pipeline from configuration
    pub async fn from_config(config: &Config) -> Result<Self> {
        let source = CommentFetcher::new(&config.youtube)?;
        let classifier = create_classifier(&config.classifier).await?;
        let thumbnails = ThumbnailResolver::new(&config.thumbnails)?;

        info!(
            "🔧 Analyzer ready: {:?} classifier, {} comment(s) in flight",
            classifier.provider_type(),
            config.classifier.concurrency
        );

        Ok(Self::new(Box::new(source), classifier)
            .with_thumbnails(thumbnails)
            .with_concurrency(config.classifier.concurrency))
    }

    pub fn with_thumbnails(mut self, resolver: ThumbnailResolver) -> Self {
        self.thumbnails = Some(resolver);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Run one analyze action against `session`.
    ///
    /// An invalid URL or a failed fetch leaves the session untouched. Comments
    /// that fail classification are skipped and counted in the report.
    pub async fn analyze(
        &self,
        video_url: &str,
        session: &mut Session,
        filter: SentimentFilter,
    ) -> Result<AnalysisReport> {
        let start_time = Instant::now();

        let video_id = extract_video_id(video_url)
            .ok_or_else(|| AnalyzerError::InvalidUrl(video_url.trim().to_string()))?;

        info!("🚀 Analyzing comments for video {}", video_id);

        let (page, thumbnail) = tokio::join!(
            self.source.fetch_comments(&video_id),
            self.resolve_thumbnail(&video_id)
        );
        let page = page?;

        let (thumbnail_url, thumbnail_error) = match thumbnail {
            Ok(url) => (Some(url), None),
            Err(e) => {
                debug!("Continuing without thumbnail: {}", e);
                (None, Some(e.to_string()))
            }
        };

        session.begin_run(&video_id);

        let fetched = page.comments.len();
        let classifier = self.classifier.as_ref();
        let outcomes: Vec<_> = stream::iter(page.comments)
            .map(|text| async move {
                let outcome = classifier.classify(&text).await;
                (text, outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut classified = 0;
        let mut skipped = 0;
        let mut failures = Vec::new();

        for (text, outcome) in outcomes {
            match outcome {
                Ok(label) => {
                    session.record(CommentRecord::new(text, label, video_id.clone()));
                    classified += 1;
                }
                Err(e) => {
                    warn!("Skipping comment: {}", e);
                    skipped += 1;
                    if failures.len() < MAX_REPORTED_FAILURES {
                        failures.push(e.to_string());
                    }
                }
            }
        }

        let aggregate = session.aggregate(filter);

        info!(
            "✅ Classified {}/{} comments for {} ({} skipped)",
            classified, fetched, video_id, skipped
        );

        Ok(AnalysisReport {
            video_id,
            video_url: video_url.trim().to_string(),
            thumbnail_url,
            thumbnail_error,
            fetched,
            classified,
            skipped,
            failures,
            has_more_comments: page.has_more,
            summary: aggregate.summary,
            filter: aggregate.filter,
            comments: aggregate.comments,
            generated_at: Utc::now(),
            processing_seconds: start_time.elapsed().as_secs_f64(),
        })
    }

    async fn resolve_thumbnail(&self, video_id: &VideoId) -> Result<String> {
        match &self.thumbnails {
            Some(resolver) => resolver.resolve(video_id).await,
            None => Err(AnalyzerError::ThumbnailUnavailable("no thumbnail resolver configured".to_string())),
        }
    }
}
