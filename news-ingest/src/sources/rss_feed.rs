use crate::traits::PullFeed;
use crate::types::{FeedItem, FeedSource, Result};
use crate::{FeedParser, Fetcher};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// RSS/Atom feed downloaded over HTTP
pub struct RssFeedSource {
    source: FeedSource,
    fetcher: Arc<Fetcher>,
    parser: FeedParser,
}

impl RssFeedSource {
    pub fn new(source: FeedSource, fetcher: Arc<Fetcher>) -> Self {
        Self {
            source,
            fetcher,
            parser: FeedParser::new(),
        }
    }
}

#[async_trait]
impl PullFeed for RssFeedSource {
    fn source(&self) -> &FeedSource {
        &self.source
    }

    async fn pull(&self) -> Result<Vec<FeedItem>> {
        info!("Reading feed: {} [{}]", self.source.url, self.source.category);

        let content = self.fetcher.fetch_feed(&self.source.url).await?;
        let parsed = self.parser.parse_feed(&content)?;

        info!(
            "Feed {} has {} entries",
            parsed.title.as_deref().unwrap_or(&self.source.url),
            parsed.entries.len()
        );
        Ok(parsed.entries)
    }
}
