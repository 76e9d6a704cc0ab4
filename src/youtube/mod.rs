/// YouTube integration module
///
/// This module resolves video identifiers from URLs, fetches top-level comments
/// through the YouTube Data API and resolves video thumbnails.

pub mod url_parser;
pub mod comments;
pub mod thumbnail;

// Re-export main types
pub use url_parser::extract_video_id;
pub use comments::{CommentFetcher, CommentPage, CommentSource};
pub use thumbnail::{HttpProbe, ThumbnailProbe, ThumbnailResolver};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Short token uniquely identifying a video
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
