use crate::store::{InsertOutcome, NewsStore};
use crate::types::{FeedSource, NewNewsRecord, Result, StructuredSummary};
use interfaces::content::compose_content_summary;
use std::sync::Arc;
use tracing::info;

/// Builds the row for a summarized article
pub fn build_record(
    title: &str,
    url: &str,
    summary: &StructuredSummary,
    original_source: &str,
    feed: &FeedSource,
) -> NewNewsRecord {
    NewNewsRecord {
        title: title.to_string(),
        url: url.to_string(),
        content_summary: compose_content_summary(&summary.summary, &summary.key_stats),
        original_source: original_source.to_string(),
        sentiment_score: Some(summary.sentiment_score),
        tags: Some(summary.tags.clone()),
        category: feed.category.clone(),
    }
}

/// Insert-only writer. Errors go back to the caller, which skips the entry.
pub struct PersistenceWriter {
    store: Arc<dyn NewsStore>,
}

impl PersistenceWriter {
    pub fn new(store: Arc<dyn NewsStore>) -> Self {
        Self { store }
    }

    pub async fn save(&self, record: NewNewsRecord) -> Result<InsertOutcome> {
        let outcome = self.store.insert(record).await?;
        if let InsertOutcome::Inserted(row) = &outcome {
            info!("Stored news {} ({})", row.id, row.url);
        }
        Ok(outcome)
    }
}
