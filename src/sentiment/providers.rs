use super::{ensure_classifiable, ClassifierConfig, ClassifierProvider, Sentiment, SentimentClassifier};
use crate::error::{AnalyzerError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const HUGGINGFACE_API_BASE: &str = "https://api-inference.huggingface.co/models";
const OPENAI_CHAT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const CLASSIFICATION_PROMPT: &str = "You are a sentiment classifier for YouTube comments. \
Classify the sentiment of the comment you are given. \
Answer with exactly one word: POSITIVE or NEGATIVE.";

fn build_client(timeout_seconds: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| AnalyzerError::Config(format!("failed to build HTTP client: {}", e)))
}

/// Gemini passes its key in the query string; keep URLs out of error text
fn classification_error(provider: &str, err: reqwest::Error) -> AnalyzerError {
    AnalyzerError::ClassificationFailure(format!("{} request failed: {}", provider, err.without_url()))
}

async fn check_status(provider: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(AnalyzerError::ClassificationFailure(format!(
            "{} API error {}: {}",
            provider, status, text
        )));
    }
    Ok(response)
}

/// Pick the label a chat model answered with.
///
/// Whichever of POSITIVE / NEGATIVE appears first in the reply wins.
pub fn parse_chat_label(reply: &str) -> Result<Sentiment> {
    let upper = reply.to_uppercase();
    match (upper.find("POSITIVE"), upper.find("NEGATIVE")) {
        (Some(p), Some(n)) if n < p => Ok(Sentiment::Negative),
        (Some(_), _) => Ok(Sentiment::Positive),
        (None, Some(_)) => Ok(Sentiment::Negative),
        (None, None) => Err(AnalyzerError::ClassificationFailure(format!(
            "model reply carried no sentiment label: '{}'",
            reply.trim()
        ))),
    }
}

/// Hugging Face Inference API text-classification provider
pub struct HuggingFaceClassifier {
    config: ClassifierConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct HuggingFaceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// The API nests results per input; a single input may come back flat
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HuggingFaceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

/// Take the top-ranked label from a text-classification response body
pub fn top_label(body: &str) -> Result<Sentiment> {
    let parsed: HuggingFaceResponse = serde_json::from_str(body).map_err(|e| {
        AnalyzerError::ClassificationFailure(format!("unexpected classifier response: {}", e))
    })?;

    let ranked = match parsed {
        HuggingFaceResponse::Nested(mut outer) => {
            if outer.is_empty() {
                Vec::new()
            } else {
                outer.swap_remove(0)
            }
        }
        HuggingFaceResponse::Flat(flat) => flat,
    };

    let top = ranked
        .into_iter()
        .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or_else(|| AnalyzerError::ClassificationFailure("classifier returned no labels".to_string()))?;

    Sentiment::from_label(&top.label)
}

impl HuggingFaceClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        let client = build_client(config.timeout_seconds)?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        self.config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("{}/{}", HUGGINGFACE_API_BASE, self.config.model))
    }
}

#[async_trait]
impl SentimentClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<Sentiment> {
        ensure_classifiable(text)?;

        let endpoint = self.endpoint();
        debug!("Sending classification request to Hugging Face at {}", endpoint);

        let mut request = self.client.post(&endpoint).json(&HuggingFaceRequest { inputs: text });
        if let Some(token) = &self.config.api_key {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classification_error("Hugging Face", e))?;
        let response = check_status("Hugging Face", response).await?;
        let body = response
            .text()
            .await
            .map_err(|e| classification_error("Hugging Face", e))?;

        top_label(&body)
    }

    fn provider_type(&self) -> ClassifierProvider {
        ClassifierProvider::HuggingFace
    }
}

/// Chat message for LLM communication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// OpenAI-compatible chat completion provider (LMStudio and OpenAI)
pub struct ChatClassifier {
    config: ClassifierConfig,
    client: reqwest::Client,
    endpoint: String,
    provider: ClassifierProvider,
}

impl ChatClassifier {
    pub fn lmstudio(config: ClassifierConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| AnalyzerError::Config("LMStudio endpoint not configured".to_string()))?;
        let client = build_client(config.timeout_seconds)?;

        Ok(Self {
            config,
            client,
            endpoint,
            provider: ClassifierProvider::LMStudio,
        })
    }

    pub fn openai(config: ClassifierConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(AnalyzerError::Config("OpenAI API key required".to_string()));
        }
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| OPENAI_CHAT_ENDPOINT.to_string());
        let client = build_client(config.timeout_seconds)?;

        Ok(Self {
            config,
            client,
            endpoint,
            provider: ClassifierProvider::OpenAI,
        })
    }

    fn provider_name(&self) -> &'static str {
        match self.provider {
            ClassifierProvider::OpenAI => "OpenAI",
            _ => "LMStudio",
        }
    }
}

#[async_trait]
impl SentimentClassifier for ChatClassifier {
    async fn classify(&self, text: &str) -> Result<Sentiment> {
        ensure_classifiable(text)?;

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: CLASSIFICATION_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let name = self.provider_name();
        debug!("Sending classification request to {} at {}", name, self.endpoint);

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = builder.send().await.map_err(|e| classification_error(name, e))?;
        let response = check_status(name, response).await?;
        let chat_response: ChatResponse = response.json().await.map_err(|e| classification_error(name, e))?;

        let reply = chat_response
            .choices
            .first()
            .ok_or_else(|| AnalyzerError::ClassificationFailure(format!("No response from {}", name)))?
            .message
            .content
            .clone();

        parse_chat_label(&reply)
    }

    fn provider_type(&self) -> ClassifierProvider {
        self.provider
    }
}

/// Gemini provider implementation
pub struct GeminiClassifier {
    config: ClassifierConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

impl GeminiClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(AnalyzerError::Config("Gemini API key required".to_string()));
        }
        let client = build_client(config.timeout_seconds)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl SentimentClassifier for GeminiClassifier {
    async fn classify(&self, text: &str) -> Result<Sentiment> {
        ensure_classifiable(text)?;

        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| AnalyzerError::Config("Gemini API key not configured".to_string()))?;

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: format!("{}\n\nComment: {}", CLASSIFICATION_PROMPT, text),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            },
        };

        let base = self.config.endpoint.as_deref().unwrap_or(GEMINI_API_BASE);
        let url = format!("{}/{}:generateContent?key={}", base, self.config.model, api_key);

        debug!("Sending classification request to Gemini API");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| classification_error("Gemini", e))?;
        let response = check_status("Gemini", response).await?;
        let gemini_response: GeminiResponse = response.json().await.map_err(|e| classification_error("Gemini", e))?;

        let reply = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| AnalyzerError::ClassificationFailure("No response from Gemini".to_string()))?;

        parse_chat_label(&reply)
    }

    fn provider_type(&self) -> ClassifierProvider {
        ClassifierProvider::Gemini
    }
}
