//! Shared news data model.
//!
//! Downstream readers (the dashboard, the chat assistant) only ever read
//! `NewsRecord` rows. They split `content_summary` back into its two halves
//! with `content::split_content_summary` and own any highlighting of the
//! `{{...}}` spans inside `key_stats`.

pub mod content;
pub mod defs;

pub use content::{compose_content_summary, highlight_spans, split_content_summary, KEY_STATS_SEPARATOR};
pub use defs::{
    FeedSource, NewNewsRecord, NewsRecord, RawArticle, RecordId, SentimentBand, StructuredSummary,
    SENTIMENT_RANGE,
};
