use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::sentiment::{ClassifierConfig, ClassifierProvider};
use crate::session::{RunPolicy, SentimentFilter};

/// Configuration for the YouTube comment sentiment analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Comment API settings
    pub youtube: YouTubeConfig,

    /// Thumbnail resolution settings
    pub thumbnails: ThumbnailConfig,

    /// Sentiment classifier settings
    pub classifier: ClassifierConfig,

    /// Session accumulator settings
    pub session: SessionConfig,

    /// Output and logging settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// YouTube Data API v3 key
    pub api_key: Option<String>,

    /// API base URL
    pub api_base_url: String,

    /// Comments requested per video (1..=100, single page)
    pub max_results: u32,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Resolve thumbnails at all
    pub enabled: bool,

    /// Image host base URL; the video id and file name are appended
    pub base_url: String,

    /// Probe timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Append to or reset earlier results on each run
    pub run_policy: RunPolicy,

    /// Filter used when none is given
    pub default_filter: SentimentFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Report format
    pub format: OutputFormat,

    /// Log level
    pub log_level: String,

    /// Truncate comment text in text reports (0 = no limit)
    pub max_comment_chars: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    JSON,
}

impl Config {
    /// Load configuration from the first config file found, else the environment
    pub fn load() -> Result<Self> {
        let mut config_paths = vec![
            PathBuf::from("yt-sentiment.toml"),
            PathBuf::from("config/yt-sentiment.toml"),
        ];
        if let Ok(home) = std::env::var("HOME") {
            config_paths.push(PathBuf::from(home).join(".config/yt-sentiment/config.toml"));
        }
        config_paths.push(PathBuf::from("/etc/yt-sentiment/config.toml"));

        Self::load_first(&config_paths)
    }

    /// A file that exists but does not parse is an error, never skipped
    fn load_first(config_paths: &[PathBuf]) -> Result<Self> {
        for path in config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                let config: Config = toml::from_str(&config_str)
                    .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))?;
                tracing::info!("📄 Loaded configuration from: {}", path.display());
                return Ok(config.with_env_overrides());
            }
        }

        Self::from_env()
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&config_str)
            .map_err(|e| anyhow!("Failed to parse config {}: {}", path.display(), e))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config.with_env_overrides())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::default().with_env_overrides())
    }

    /// Override with environment variables
    fn with_env_overrides(mut self) -> Self {
        if let Ok(api_key) = std::env::var("YT_SENTIMENT_API_KEY") {
            self.youtube.api_key = Some(api_key);
        }

        if let Ok(provider) = std::env::var("YT_SENTIMENT_CLASSIFIER") {
            match provider.parse::<ClassifierProvider>() {
                Ok(provider) => self.classifier.provider = provider,
                Err(e) => tracing::warn!("Ignoring YT_SENTIMENT_CLASSIFIER: {}", e),
            }
        }

        if let Ok(key) = std::env::var("YT_SENTIMENT_CLASSIFIER_KEY") {
            self.classifier.api_key = Some(key);
        }

        if let Ok(max_results) = std::env::var("YT_SENTIMENT_MAX_RESULTS") {
            match max_results.parse() {
                Ok(max_results) => self.youtube.max_results = max_results,
                Err(e) => tracing::warn!("Ignoring YT_SENTIMENT_MAX_RESULTS '{}': {}", max_results, e),
            }
        }

        if let Ok(log_level) = std::env::var("YT_SENTIMENT_LOG_LEVEL") {
            self.output.log_level = log_level;
        }

        self
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.youtube.max_results) {
            return Err(anyhow!("max_results must be between 1 and 100"));
        }

        if self.youtube.timeout_seconds == 0 || self.thumbnails.timeout_seconds == 0 {
            return Err(anyhow!("timeouts must be greater than 0"));
        }

        if self.classifier.concurrency == 0 {
            return Err(anyhow!("classifier concurrency must be greater than 0"));
        }

        match self.classifier.provider {
            ClassifierProvider::OpenAI | ClassifierProvider::Gemini => {
                if self.classifier.api_key.is_none() {
                    return Err(anyhow!("API key required for {:?} classifier", self.classifier.provider));
                }
            }
            ClassifierProvider::LMStudio => {
                if self.classifier.endpoint.is_none() {
                    return Err(anyhow!("API endpoint required for LMStudio classifier"));
                }
            }
            _ => {}
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "YouTube Sentiment Analyzer Configuration:\n\
            - API Key: {}\n\
            - Max Results: {}\n\
            - Classifier: {:?} ({})\n\
            - Concurrency: {}\n\
            - Run Policy: {:?}\n\
            - Thumbnails Enabled: {}",
            if self.youtube.api_key.is_some() { "set" } else { "missing" },
            self.youtube.max_results,
            self.classifier.provider,
            self.classifier.model,
            self.classifier.concurrency,
            self.session.run_policy,
            self.thumbnails.enabled
        )
    }
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            max_results: 100,
            timeout_seconds: 30,
        }
    }
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://img.youtube.com/vi".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            youtube: YouTubeConfig::default(),
            thumbnails: ThumbnailConfig::default(),
            classifier: ClassifierConfig::default(),
            session: SessionConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            run_policy: RunPolicy::Append,
            default_filter: SentimentFilter::None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            log_level: "info".to_string(),
            max_comment_chars: 0,
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.youtube.api_key = Some(api_key);
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.config.youtube.max_results = max_results;
        self
    }

    pub fn with_classifier(mut self, provider: ClassifierProvider) -> Self {
        if self.config.classifier.provider != provider {
            self.config.classifier.model = ClassifierConfig::default_model(provider).to_string();
        }
        self.config.classifier.provider = provider;
        self
    }

    pub fn with_classifier_key(mut self, key: String) -> Self {
        self.config.classifier.api_key = Some(key);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.config.classifier.concurrency = concurrency;
        self
    }

    pub fn with_run_policy(mut self, policy: RunPolicy) -> Self {
        self.config.session.run_policy = policy;
        self
    }

    pub fn enable_thumbnails(mut self, enable: bool) -> Self {
        self.config.thumbnails.enabled = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
