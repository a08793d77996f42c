use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub use interfaces::defs::{
    FeedSource, NewNewsRecord, NewsRecord, RawArticle, RecordId, SentimentBand, StructuredSummary,
};

/// Browser identity used for article downloads; some publishers refuse bot agents.
pub const MOBILE_USER_AGENT: &str =
    "Mozilla/5.0 (Linux; Android 10) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Mobile Safari/537.36";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_redirects: usize,
    pub max_body_mb: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: MOBILE_USER_AGENT.to_string(),
            timeout_seconds: 10,
            max_redirects: 5,
            max_body_mb: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Article body budget in characters, applied before the LLM request.
    pub max_body_chars: usize,
    /// Language the model must write `summary` and `key_stats` in.
    pub language: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_body_chars: 8000,
            language: "Simplified Chinese".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Entries taken from the top of each feed per run.
    pub max_entries_per_feed: usize,
    /// Pause after every saved entry.
    pub politeness_interval: Duration,
    /// Extra attempts for a feed document download; 0 means a single attempt.
    pub feed_retries: u32,
    pub feed_retry_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_entries_per_feed: 5,
            politeness_interval: Duration::from_secs(2),
            feed_retries: 0,
            feed_retry_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<FeedItem>,
}

/// One entry of a syndication feed, minimally a link and a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub url: String,
    pub title: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl FeedItem {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            published_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    Extraction,
    SchemaValidation,
    Storage,
    Feed,
    Config,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Network => "network",
            FailureKind::Extraction => "extraction",
            FailureKind::SchemaValidation => "schema",
            FailureKind::Storage => "storage",
            FailureKind::Feed => "feed",
            FailureKind::Config => "config",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Extraction failure: {0}")]
    Extraction(String),

    #[error("Schema validation failure: {0}")]
    SchemaValidation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IngestError {
    pub fn kind(&self) -> FailureKind {
        match self {
            IngestError::Http(_) | IngestError::Network(_) => FailureKind::Network,
            IngestError::Parse(_) | IngestError::InvalidUrl(_) => FailureKind::Feed,
            IngestError::Extraction(_) => FailureKind::Extraction,
            IngestError::SchemaValidation(_) | IngestError::Serialization(_) => {
                FailureKind::SchemaValidation
            }
            IngestError::Database(_) | IngestError::Migration(_) | IngestError::Storage(_) => {
                FailureKind::Storage
            }
            IngestError::Config(_) | IngestError::Io(_) => FailureKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
