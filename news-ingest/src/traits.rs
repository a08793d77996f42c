use crate::types::{FeedItem, FeedSource, RawArticle, Result};
use async_trait::async_trait;

/// Trait for pulling entries from a configured syndication feed
#[async_trait]
pub trait PullFeed: Send + Sync {
    /// The configuration this feed was built from
    fn source(&self) -> &FeedSource;

    /// Label stored as `original_source` on every record from this feed
    fn source_name(&self) -> String {
        let source = self.source();
        source
            .name
            .clone()
            .or_else(|| crate::rss_utils::url::extract_domain(&source.url))
            .unwrap_or_else(|| "Other".to_string())
    }

    /// Download and parse the feed, most recent entries first
    async fn pull(&self) -> Result<Vec<FeedItem>>;
}

/// Trait for turning an article URL into readable text
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch_article(&self, url: &str) -> Result<RawArticle>;
}
