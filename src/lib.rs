/// YouTube Comment Sentiment Analyzer
///
/// Fetches top-level comments for a YouTube video, classifies each one as
/// positive or negative and aggregates the results over a session.

pub mod error;
pub mod config;
pub mod youtube;
pub mod sentiment;
pub mod session;
pub mod analysis;
pub mod report;

// Re-export main types for easy access
pub use crate::error::{AnalyzerError, Result};
pub use crate::config::{Config, ConfigBuilder, OutputFormat};
pub use crate::youtube::{extract_video_id, CommentFetcher, CommentPage, CommentSource, ThumbnailResolver, VideoId};
pub use crate::sentiment::{create_classifier, ClassifierConfig, ClassifierProvider, Sentiment, SentimentClassifier};
pub use crate::session::{aggregate, CommentRecord, RunPolicy, SentimentFilter, Session, Summary};
pub use crate::analysis::{AnalysisReport, Analyzer};
