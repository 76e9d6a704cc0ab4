use crate::error::AnalyzerError;
use crate::sentiment::Sentiment;
use crate::youtube::VideoId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// A classified comment; immutable once recorded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentRecord {
    /// Comment display text
    pub text: String,

    /// Sentiment label assigned by the classifier
    pub classification: Sentiment,

    /// Video the comment was fetched from
    pub video_id: VideoId,

    /// When the comment was classified
    pub classified_at: DateTime<Utc>,
}

impl CommentRecord {
    pub fn new(text: String, classification: Sentiment, video_id: VideoId) -> Self {
        Self {
            text,
            classification,
            video_id,
            classified_at: Utc::now(),
        }
    }
}

/// Sentiment filter applied when listing comments
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SentimentFilter {
    #[default]
    None,
    Positive,
    Negative,
}

impl SentimentFilter {
    pub fn matches(&self, sentiment: Sentiment) -> bool {
        match self {
            SentimentFilter::None => true,
            SentimentFilter::Positive => sentiment == Sentiment::Positive,
            SentimentFilter::Negative => sentiment == Sentiment::Negative,
        }
    }
}

impl FromStr for SentimentFilter {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" | "all" => Ok(SentimentFilter::None),
            "positive" | "pos" => Ok(SentimentFilter::Positive),
            "negative" | "neg" => Ok(SentimentFilter::Negative),
            other => Err(AnalyzerError::Config(format!(
                "unknown sentiment filter '{}' (expected none, positive or negative)",
                other
            ))),
        }
    }
}

impl fmt::Display for SentimentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SentimentFilter::None => "None",
            SentimentFilter::Positive => "Positive",
            SentimentFilter::Negative => "Negative",
        };
        f.write_str(name)
    }
}

/// What happens to earlier results when a new video is analyzed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunPolicy {
    /// Keep every earlier record and append the new ones
    #[default]
    Append,
    /// Drop earlier records before each analysis run
    ResetPerVideo,
}

/// Counts and percentages over a set of comment records
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    /// 0.0 when there are no records
    pub positive_percent: f64,
    /// 0.0 when there are no records
    pub negative_percent: f64,
}

impl Summary {
    pub fn from_records(records: &[CommentRecord]) -> Self {
        let positive = records
            .iter()
            .filter(|r| r.classification == Sentiment::Positive)
            .count();
        let negative = records
            .iter()
            .filter(|r| r.classification == Sentiment::Negative)
            .count();
        let total = records.len();

        Self {
            total,
            positive,
            negative,
            positive_percent: percentage(positive, total),
            negative_percent: percentage(negative, total),
        }
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Summary of all records plus the filtered listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Aggregate {
    pub summary: Summary,
    pub filter: SentimentFilter,
    pub comments: Vec<CommentRecord>,
}

/// Summarize `records` and list those matching `filter` in their original order
pub fn aggregate(records: &[CommentRecord], filter: SentimentFilter) -> Aggregate {
    Aggregate {
        summary: Summary::from_records(records),
        filter,
        comments: filter_records(records, filter),
    }
}

pub fn filter_records(records: &[CommentRecord], filter: SentimentFilter) -> Vec<CommentRecord> {
    records
        .iter()
        .filter(|r| filter.matches(r.classification))
        .cloned()
        .collect()
}

/// Session accumulator of classified comments
///
/// Owned by whoever drives the analysis and passed in by `&mut`. Records are
/// only ever appended; the whole session can be reset.
#[derive(Debug, Clone, Default)]
pub struct Session {
    records: Vec<CommentRecord>,
    policy: RunPolicy,
    runs: usize,
}

impl Session {
    pub fn new(policy: RunPolicy) -> Self {
        Self {
            records: Vec::new(),
            policy,
            runs: 0,
        }
    }

    pub fn policy(&self) -> RunPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: RunPolicy) {
        self.policy = policy;
    }

    /// Called at the start of each analysis run
    pub fn begin_run(&mut self, video_id: &VideoId) {
        if self.policy == RunPolicy::ResetPerVideo && !self.records.is_empty() {
            debug!("Resetting session before analyzing {}", video_id);
            self.records.clear();
        }
        self.runs += 1;
    }

    pub fn record(&mut self, record: CommentRecord) {
        self.records.push(record);
    }

    /// Drop every record
    pub fn reset(&mut self) {
        info!("🧹 Session reset ({} records dropped)", self.records.len());
        self.records.clear();
        self.runs = 0;
    }

    pub fn records(&self) -> &[CommentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of analysis runs since creation or the last reset
    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn aggregate(&self, filter: SentimentFilter) -> Aggregate {
        aggregate(&self.records, filter)
    }
}
