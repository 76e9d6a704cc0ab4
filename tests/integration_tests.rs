use async_trait::async_trait;
use std::collections::HashMap;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};
use yt_sentiment_analyzer::config::{ThumbnailConfig, YouTubeConfig};
use yt_sentiment_analyzer::sentiment::providers::{ChatClassifier, HuggingFaceClassifier};
use yt_sentiment_analyzer::youtube::ThumbnailProbe;
use yt_sentiment_analyzer::{
    AnalyzerError, Analyzer, ClassifierProvider, CommentFetcher, CommentPage, CommentSource, RunPolicy, Sentiment,
    ClassifierConfig, SentimentClassifier, SentimentFilter, Session, ThumbnailResolver, VideoId,
};

/// Comment source keyed by video id
struct FixtureSource {
    pages: HashMap<String, Vec<String>>,
}

impl FixtureSource {
    fn new(pages: Vec<(&str, Vec<&str>)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(id, comments)| (id.to_string(), comments.into_iter().map(String::from).collect()))
                .collect(),
        }
    }
}

#[async_trait]
impl CommentSource for FixtureSource {
    async fn fetch_comments(&self, video_id: &VideoId) -> yt_sentiment_analyzer::Result<CommentPage> {
        self.pages
            .get(video_id.as_str())
            .map(|comments| CommentPage {
                comments: comments.clone(),
                has_more: false,
            })
            .ok_or_else(|| AnalyzerError::FetchFailure(format!("YouTube API error 404: video {} not found", video_id)))
    }
}

/// Classifier with a fixed answer per comment text
struct ScriptedClassifier {
    labels: HashMap<String, Sentiment>,
}

impl ScriptedClassifier {
    fn new(labels: &[(&str, Sentiment)]) -> Self {
        Self {
            labels: labels.iter().map(|(t, l)| (t.to_string(), *l)).collect(),
        }
    }
}

#[async_trait]
impl SentimentClassifier for ScriptedClassifier {
    async fn classify(&self, text: &str) -> yt_sentiment_analyzer::Result<Sentiment> {
        self.labels
            .get(text)
            .copied()
            .ok_or_else(|| AnalyzerError::ClassificationFailure(format!("no label for '{}'", text)))
    }

    fn provider_type(&self) -> ClassifierProvider {
        ClassifierProvider::Lexicon
    }
}

struct UnavailableProbe;

#[async_trait]
impl ThumbnailProbe for UnavailableProbe {
    async fn is_available(&self, _url: &str) -> bool {
        false
    }
}

const FIVE_COMMENTS: [(&str, Sentiment); 5] = [
    ("Best song ever", Sentiment::Positive),
    ("Still a classic", Sentiment::Positive),
    ("Got rickrolled, not amused", Sentiment::Negative),
    ("Timeless", Sentiment::Positive),
    ("Overplayed", Sentiment::Negative),
];

fn five_comment_analyzer() -> Analyzer {
    let texts: Vec<&str> = FIVE_COMMENTS.iter().map(|(t, _)| *t).collect();
    Analyzer::new(
        Box::new(FixtureSource::new(vec![("dQw4w9WgXcQ", texts)])),
        Box::new(ScriptedClassifier::new(&FIVE_COMMENTS)),
    )
    .with_thumbnails(ThumbnailResolver::with_probe(
        &ThumbnailConfig::default(),
        Box::new(UnavailableProbe),
    ))
}

#[tokio::test]
async fn test_end_to_end_five_comments() {
    let analyzer = five_comment_analyzer();
    let mut session = Session::default();

    let report = analyzer
        .analyze("https://www.youtube.com/watch?v=dQw4w9WgXcQ", &mut session, SentimentFilter::Positive)
        .await;
    let report = assert_ok!(report);

    assert_eq!(report.summary.total, 5);
    assert_eq!(report.summary.positive, 3);
    assert_eq!(report.summary.negative, 2);
    assert_eq!(format!("{:.2}", report.summary.positive_percent), "60.00");
    assert_eq!(format!("{:.2}", report.summary.negative_percent), "40.00");

    let texts: Vec<&str> = report.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["Best song ever", "Still a classic", "Timeless"]);
    assert!(report.comments.iter().all(|c| c.classification == Sentiment::Positive));

    assert_eq!(
        report.thumbnail_url.as_deref(),
        Some("https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
    );
}

#[tokio::test]
async fn test_filters_over_same_session() {
    let analyzer = five_comment_analyzer();
    let mut session = Session::default();
    assert_ok!(
        analyzer
            .analyze("https://www.youtube.com/watch?v=dQw4w9WgXcQ", &mut session, SentimentFilter::None)
            .await
    );

    let all = session.aggregate(SentimentFilter::None);
    let positive = session.aggregate(SentimentFilter::Positive);
    let negative = session.aggregate(SentimentFilter::Negative);

    assert_eq!(all.comments.len(), positive.comments.len() + negative.comments.len());
    assert_eq!(all.comments, session.records());
    assert_eq!(positive.summary, negative.summary);
}

#[tokio::test]
async fn test_append_policy_concatenates_videos() {
    let analyzer = Analyzer::new(
        Box::new(FixtureSource::new(vec![("first", vec!["great"]), ("second", vec!["awful", "nice"])])),
        Box::new(ScriptedClassifier::new(&[
            ("great", Sentiment::Positive),
            ("awful", Sentiment::Negative),
            ("nice", Sentiment::Positive),
        ])),
    );
    let mut session = Session::new(RunPolicy::Append);

    assert_ok!(analyzer.analyze("watch?v=first", &mut session, SentimentFilter::None).await);
    let report = assert_ok!(analyzer.analyze("watch?v=second", &mut session, SentimentFilter::None).await);

    assert_eq!(report.classified, 2);
    assert_eq!(report.summary.total, 3);
    let texts: Vec<&str> = report.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["great", "awful", "nice"]);
}

#[tokio::test]
async fn test_reset_per_video_policy() {
    let analyzer = Analyzer::new(
        Box::new(FixtureSource::new(vec![("first", vec!["great"]), ("second", vec!["awful"])])),
        Box::new(ScriptedClassifier::new(&[
            ("great", Sentiment::Positive),
            ("awful", Sentiment::Negative),
        ])),
    );
    let mut session = Session::new(RunPolicy::ResetPerVideo);

    assert_ok!(analyzer.analyze("watch?v=first", &mut session, SentimentFilter::None).await);
    let report = assert_ok!(analyzer.analyze("watch?v=second", &mut session, SentimentFilter::None).await);

    assert_eq!(report.summary.total, 1);
    assert_eq!(report.comments[0].video_id.as_str(), "second");
}

#[tokio::test]
async fn test_fetch_failure_is_reported_and_session_kept() {
    let analyzer = Analyzer::new(
        Box::new(FixtureSource::new(vec![("known", vec!["great"])])),
        Box::new(ScriptedClassifier::new(&[("great", Sentiment::Positive)])),
    );
    let mut session = Session::new(RunPolicy::ResetPerVideo);
    assert_ok!(analyzer.analyze("watch?v=known", &mut session, SentimentFilter::None).await);

    let err = assert_err!(analyzer.analyze("watch?v=missing", &mut session, SentimentFilter::None).await);
    assert!(matches!(err, AnalyzerError::FetchFailure(_)));
    assert_eq!(session.len(), 1);
}

#[tokio::test]
async fn test_empty_video_reports_zero_percent() {
    let analyzer = Analyzer::new(
        Box::new(FixtureSource::new(vec![("quiet", vec![])])),
        Box::new(ScriptedClassifier::new(&[])),
    );
    let mut session = Session::default();

    let report = assert_ok!(analyzer.analyze("watch?v=quiet", &mut session, SentimentFilter::None).await);
    assert_eq!(report.summary.total, 0);
    assert_eq!(report.summary.positive_percent, 0.0);
    assert_eq!(report.summary.negative_percent, 0.0);
}

/// Consume request headers and any Content-Length body before replying
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        request.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&request);
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            if request.len() >= end + 4 + content_length {
                return;
            }
        }
    }
}

/// Serve one canned HTTP response on a local port and return the base URL
async fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}", addr)
}

fn local_fetcher(base_url: String) -> CommentFetcher {
    CommentFetcher::new(&YouTubeConfig {
        api_key: Some("test-key".to_string()),
        api_base_url: base_url,
        max_results: 100,
        timeout_seconds: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn test_fetcher_reads_comment_threads() {
    let body = r#"{"items":[
        {"snippet":{"topLevelComment":{"snippet":{"textDisplay":"first!"}}}},
        {"snippet":{"topLevelComment":{"snippet":{"textDisplay":"great explanation"}}}}
    ]}"#;
    let fetcher = local_fetcher(serve_once("200 OK", body).await);

    let page = assert_ok!(fetcher.fetch_comments(&VideoId::new("abc")).await);
    assert_eq!(page.comments, vec!["first!", "great explanation"]);
    assert!(!page.has_more);
}

#[tokio::test]
async fn test_fetcher_surfaces_api_errors() {
    let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","errors":[{"reason":"keyInvalid"}]}}"#;
    let fetcher = local_fetcher(serve_once("400 Bad Request", body).await);

    let err = assert_err!(fetcher.fetch_comments(&VideoId::new("abc")).await);
    match err {
        AnalyzerError::FetchFailure(message) => assert!(message.contains("keyInvalid")),
        other => panic!("expected FetchFailure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetcher_errors_do_not_echo_api_key() {
    let fetcher = CommentFetcher::new(&YouTubeConfig {
        api_key: Some("SECRET-KEY-123".to_string()),
        api_base_url: "http://127.0.0.1:9".to_string(),
        max_results: 100,
        timeout_seconds: 2,
    })
    .unwrap();

    let err = assert_err!(fetcher.fetch_comments(&VideoId::new("abc")).await);
    assert!(matches!(err, AnalyzerError::FetchFailure(_)));
    assert!(!err.to_string().contains("SECRET-KEY-123"));
}

fn local_classifier_config(provider: ClassifierProvider, endpoint: String) -> ClassifierConfig {
    ClassifierConfig {
        provider,
        endpoint: Some(endpoint),
        api_key: Some("hf-token".to_string()),
        timeout_seconds: 5,
        ..ClassifierConfig::default()
    }
}

#[tokio::test]
async fn test_huggingface_classifier_takes_top_label() {
    let body = r#"[[{"label":"NEGATIVE","score":0.03},{"label":"POSITIVE","score":0.97}]]"#;
    let base = serve_once("200 OK", body).await;
    let classifier = HuggingFaceClassifier::new(local_classifier_config(
        ClassifierProvider::HuggingFace,
        format!("{}/models/distilbert", base),
    ))
    .unwrap();

    let label = assert_ok!(classifier.classify("Never gonna give you up").await);
    assert_eq!(label, Sentiment::Positive);
}

#[tokio::test]
async fn test_huggingface_classifier_surfaces_api_errors() {
    let body = r#"{"error":"Model distilbert is currently loading"}"#;
    let base = serve_once("503 Service Unavailable", body).await;
    let classifier = HuggingFaceClassifier::new(local_classifier_config(
        ClassifierProvider::HuggingFace,
        format!("{}/models/distilbert", base),
    ))
    .unwrap();

    let err = assert_err!(classifier.classify("Never gonna give you up").await);
    match err {
        AnalyzerError::ClassificationFailure(message) => assert!(message.contains("currently loading")),
        other => panic!("expected ClassificationFailure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chat_classifier_reads_reply_label() {
    let body = r#"{"choices":[{"message":{"role":"assistant","content":"NEGATIVE"}}]}"#;
    let base = serve_once("200 OK", body).await;
    let classifier = ChatClassifier::lmstudio(local_classifier_config(
        ClassifierProvider::LMStudio,
        format!("{}/v1/chat/completions", base),
    ))
    .unwrap();

    let label = assert_ok!(classifier.classify("Overplayed").await);
    assert_eq!(label, Sentiment::Negative);
}
