use super::{ensure_classifiable, ClassifierProvider, Sentiment, SentimentClassifier};
use crate::error::{AnalyzerError, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Word lists for offline sentiment scoring
#[derive(Debug, Clone)]
pub struct SentimentLexicon {
    positive: HashSet<String>,
    negative: HashSet<String>,
    /// Words that flip the polarity of the word right after them
    negations: HashSet<String>,
}

impl SentimentLexicon {
    /// Create a lexicon with the default word lists
    pub fn new() -> Self {
        let mut lexicon = Self {
            positive: HashSet::new(),
            negative: HashSet::new(),
            negations: HashSet::new(),
        };

        lexicon.load_default_words();
        lexicon
    }

    /// Load a lexicon from a word list file, on top of the defaults.
    ///
    /// The file holds `[positive]`, `[negative]` and `[negation]` sections with
    /// one word per line. `#` starts a comment line.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await.map_err(|e| {
            AnalyzerError::Config(format!("Failed to read lexicon {}: {}", path.as_ref().display(), e))
        })?;
        let mut lexicon = Self::new();
        lexicon.parse_words_file(&content)?;
        info!("📚 Loaded sentiment lexicon from: {}", path.as_ref().display());
        Ok(lexicon)
    }

    pub fn add_positive(&mut self, word: &str) {
        self.positive.insert(word.to_lowercase());
    }

    pub fn add_negative(&mut self, word: &str) {
        self.negative.insert(word.to_lowercase());
    }

    /// Net polarity of a text: positive words minus negative words
    pub fn score(&self, text: &str) -> i32 {
        let mut score = 0;
        let mut negate = false;

        for token in tokenize(text) {
            if self.negations.contains(&token) {
                negate = true;
                continue;
            }

            let polarity = if self.positive.contains(&token) {
                1
            } else if self.negative.contains(&token) {
                -1
            } else {
                0
            };

            score += if negate { -polarity } else { polarity };
            negate = false;
        }

        score
    }

    /// Label a text; a zero score counts as positive
    pub fn label(&self, text: &str) -> Sentiment {
        if self.score(text) < 0 {
            Sentiment::Negative
        } else {
            Sentiment::Positive
        }
    }

    pub fn word_counts(&self) -> (usize, usize) {
        (self.positive.len(), self.negative.len())
    }

    fn parse_words_file(&mut self, content: &str) -> Result<()> {
        let mut section: Option<&str> = None;

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                section = Some(match &line[1..line.len() - 1] {
                    "positive" => "positive",
                    "negative" => "negative",
                    "negation" => "negation",
                    other => {
                        return Err(AnalyzerError::Config(format!(
                            "unknown lexicon section '{}' on line {}",
                            other,
                            line_no + 1
                        )))
                    }
                });
                continue;
            }

            let word = line.to_lowercase();
            match section {
                Some("positive") => {
                    self.positive.insert(word);
                }
                Some("negative") => {
                    self.negative.insert(word);
                }
                Some(_) => {
                    self.negations.insert(word);
                }
                None => warn!("Lexicon word '{}' outside any section, ignoring", line),
            }
        }

        Ok(())
    }

    fn load_default_words(&mut self) {
        let positive = [
            "amazing", "awesome", "beautiful", "best", "brilliant", "cool", "enjoy", "enjoyed",
            "excellent", "fantastic", "favorite", "fun", "funny", "genius", "good", "great",
            "happy", "helpful", "incredible", "informative", "inspiring", "interesting", "legend",
            "like", "love", "loved", "masterpiece", "nice", "perfect", "thank", "thanks",
            "useful", "wonderful", "wow",
        ];
        let negative = [
            "annoying", "awful", "bad", "boring", "clickbait", "cringe", "disappointed",
            "disappointing", "dislike", "dumb", "fake", "garbage", "hate", "hated", "horrible",
            "lame", "misleading", "poor", "ridiculous", "sad", "scam", "stupid", "terrible",
            "trash", "ugly", "useless", "waste", "worse", "worst", "wrong",
        ];
        let negations = ["not", "no", "never", "don't", "didn't", "isn't", "wasn't", "can't"];

        self.positive.extend(positive.iter().map(|w| w.to_string()));
        self.negative.extend(negative.iter().map(|w| w.to_string()));
        self.negations.extend(negations.iter().map(|w| w.to_string()));
    }
}

impl Default for SentimentLexicon {
    fn default() -> Self {
        Self::new()
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Offline classifier backed by a [`SentimentLexicon`]
pub struct LexiconClassifier {
    lexicon: SentimentLexicon,
}

impl LexiconClassifier {
    pub fn new(lexicon: SentimentLexicon) -> Self {
        Self { lexicon }
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<Sentiment> {
        ensure_classifiable(text)?;
        Ok(self.lexicon.label(text))
    }

    fn provider_type(&self) -> ClassifierProvider {
        ClassifierProvider::Lexicon
    }
}
