pub mod providers;
pub mod lexicon;

use crate::error::{AnalyzerError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub use lexicon::{LexiconClassifier, SentimentLexicon};

/// Binary sentiment label
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
        }
    }

    /// Parse a model label such as `POSITIVE`, `negative` or `LABEL_1`
    pub fn from_label(label: &str) -> Result<Self> {
        match label.trim().to_uppercase().as_str() {
            "POSITIVE" | "POS" | "LABEL_1" => Ok(Sentiment::Positive),
            "NEGATIVE" | "NEG" | "LABEL_0" => Ok(Sentiment::Negative),
            other => Err(AnalyzerError::ClassificationFailure(format!(
                "unrecognized sentiment label '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment classifier provider types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClassifierProvider {
    HuggingFace,
    LMStudio,
    OpenAI,
    Gemini,
    Lexicon,
}

impl FromStr for ClassifierProvider {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(ClassifierProvider::HuggingFace),
            "lmstudio" => Ok(ClassifierProvider::LMStudio),
            "openai" => Ok(ClassifierProvider::OpenAI),
            "gemini" => Ok(ClassifierProvider::Gemini),
            "lexicon" => Ok(ClassifierProvider::Lexicon),
            other => Err(AnalyzerError::Config(format!("unknown classifier provider '{}'", other))),
        }
    }
}

/// Classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Provider to use
    pub provider: ClassifierProvider,

    /// API endpoint override (required for LMStudio)
    pub endpoint: Option<String>,

    /// API key or access token
    pub api_key: Option<String>,

    /// Model to use
    pub model: String,

    /// Maximum tokens to generate (chat providers only)
    pub max_tokens: u32,

    /// Temperature for generation (chat providers only)
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Comments classified in flight at once (1 = strictly sequential)
    pub concurrency: usize,

    /// Word list file for the lexicon provider
    pub lexicon_file: Option<PathBuf>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: ClassifierProvider::HuggingFace,
            endpoint: None,
            api_key: None,
            model: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            max_tokens: 8,
            temperature: 0.0,
            timeout_seconds: 30,
            concurrency: 1,
            lexicon_file: None,
        }
    }
}

impl ClassifierConfig {
    /// Default model name for a provider
    pub fn default_model(provider: ClassifierProvider) -> &'static str {
        match provider {
            ClassifierProvider::HuggingFace => "distilbert-base-uncased-finetuned-sst-2-english",
            ClassifierProvider::LMStudio => "local-model",
            ClassifierProvider::OpenAI => "gpt-4o-mini",
            ClassifierProvider::Gemini => "gemini-1.5-flash",
            ClassifierProvider::Lexicon => "lexicon",
        }
    }
}

/// Opaque text classifier: one comment in, one label out
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Sentiment>;
    fn provider_type(&self) -> ClassifierProvider;
}

/// Reject input no model can label
pub(crate) fn ensure_classifiable(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(AnalyzerError::ClassificationFailure("comment is empty".to_string()));
    }
    Ok(())
}

/// Create classifier instance based on configuration
pub async fn create_classifier(config: &ClassifierConfig) -> Result<Box<dyn SentimentClassifier>> {
    match config.provider {
        ClassifierProvider::HuggingFace => Ok(Box::new(providers::HuggingFaceClassifier::new(config.clone())?)),
        ClassifierProvider::LMStudio => Ok(Box::new(providers::ChatClassifier::lmstudio(config.clone())?)),
        ClassifierProvider::OpenAI => Ok(Box::new(providers::ChatClassifier::openai(config.clone())?)),
        ClassifierProvider::Gemini => Ok(Box::new(providers::GeminiClassifier::new(config.clone())?)),
        ClassifierProvider::Lexicon => {
            let lexicon = match &config.lexicon_file {
                Some(path) => SentimentLexicon::from_file(path).await?,
                None => SentimentLexicon::new(),
            };
            Ok(Box::new(LexiconClassifier::new(lexicon)))
        }
    }
}
