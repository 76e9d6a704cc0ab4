/// Error types surfaced by the analysis pipeline

/// Result type for analyzer operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Every failure here is user-visible and non-fatal to the session
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    #[error("Invalid YouTube video URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch comments: {0}")]
    FetchFailure(String),

    #[error("Failed to classify comment: {0}")]
    ClassificationFailure(String),

    #[error("Thumbnail unavailable: {0}")]
    ThumbnailUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Request URLs may carry API keys in the query string, so they are stripped
impl From<reqwest::Error> for AnalyzerError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            AnalyzerError::FetchFailure(format!("request timed out: {}", err))
        } else {
            AnalyzerError::FetchFailure(err.to_string())
        }
    }
}
