use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use uuid::Uuid;

/// Inclusive bounds for `StructuredSummary::sentiment_score`.
pub const SENTIMENT_RANGE: RangeInclusive<i32> = -10..=10;

/// One configured syndication feed. Immutable for a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub category: String,
    pub url: String,
    /// Label stored as `original_source`; falls back to the feed's domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FeedSource {
    pub fn new(category: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            url: url.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Readable text pulled out of a publisher page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArticle {
    pub title: String,
    pub body: String,
}

/// LLM-produced summary of one article, already validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructuredSummary {
    pub summary: String,
    pub key_stats: String,
    pub sentiment_score: i32,
    pub tags: Vec<String>,
}

impl StructuredSummary {
    pub fn sentiment_in_range(&self) -> bool {
        SENTIMENT_RANGE.contains(&self.sentiment_score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentBand {
    Bearish,
    Neutral,
    Bullish,
}

impl SentimentBand {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s < 0 => SentimentBand::Bearish,
            0 => SentimentBand::Neutral,
            _ => SentimentBand::Bullish,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentBand::Bearish => "bearish",
            SentimentBand::Neutral => "neutral",
            SentimentBand::Bullish => "bullish",
        }
    }
}

/// Primary key of a stored row. Tables created by the bundled migration use
/// UUIDs; older Supabase tables were created with an `int8` identity column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Uuid(Uuid),
    Int(i64),
}

impl From<Uuid> for RecordId {
    fn from(id: Uuid) -> Self {
        RecordId::Uuid(id)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Uuid(id) => write!(f, "{}", id),
            RecordId::Int(id) => write!(f, "{}", id),
        }
    }
}

/// Row as written by the pipeline; `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNewsRecord {
    pub title: String,
    pub url: String,
    pub content_summary: String,
    pub original_source: String,
    pub sentiment_score: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub category: String,
}

/// Persisted news row. `url` is unique; rows are never updated by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub id: RecordId,
    pub title: String,
    pub url: String,
    pub content_summary: String,
    pub original_source: String,
    pub sentiment_score: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl NewsRecord {
    pub fn from_new(
        record: NewNewsRecord,
        id: impl Into<RecordId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: record.title,
            url: record.url,
            content_summary: record.content_summary,
            original_source: record.original_source,
            sentiment_score: record.sentiment_score,
            tags: record.tags,
            category: record.category,
            created_at,
        }
    }
}
