/// Video identifier extraction from user-supplied URLs
use super::VideoId;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

fn video_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"v=([a-zA-Z0-9_-]+)").expect("video id pattern is valid"))
}

/// Extract the video identifier following the first `v=` marker.
///
/// This is a substring search rather than a URL parse, so any string carrying
/// `v=<token>` matches. Returns `None` when no token is present.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let id = video_id_pattern()
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| VideoId::new(m.as_str()));

    match &id {
        Some(id) => debug!("Extracted video id {} from {}", id, input),
        None => debug!("No video id found in {}", input),
    }

    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url() {
        let id = extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_url_without_marker() {
        assert!(extract_video_id("https://example.com/video").is_none());
        assert!(extract_video_id("").is_none());
        assert!(extract_video_id("https://youtu.be/dQw4w9WgXcQ").is_none());
    }

    #[test]
    fn test_token_stops_at_next_parameter() {
        let id = extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLrAXtmRdnEQy").unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");

        let id = extract_video_id("https://www.youtube.com/watch?feature=share&v=a-b_C9&t=30").unwrap();
        assert_eq!(id.as_str(), "a-b_C9");
    }

    #[test]
    fn test_first_marker_wins() {
        let id = extract_video_id("https://www.youtube.com/watch?v=first&v=second").unwrap();
        assert_eq!(id.as_str(), "first");
    }

    #[test]
    fn test_empty_token_is_not_found() {
        assert!(extract_video_id("https://www.youtube.com/watch?v=&x=1").is_none());
    }
}
