use crate::rss_utils::url::is_valid_http_url;
use crate::types::{FeedItem, IngestError, ParsedFeed, Result};
use feed_rs::parser;
use std::collections::HashSet;
use tracing::{debug, info};

/// Parses RSS/Atom documents into `FeedItem`s, newest first.
#[derive(Debug, Default)]
pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_feed(&self, content: &str) -> Result<ParsedFeed> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| IngestError::Parse(format!("Failed to parse feed: {}", e)))?;

        let title = feed.title.map(|t| t.content);

        let mut seen_urls = HashSet::new();
        let mut entries = Vec::new();

        for entry in feed.entries {
            if let Some(item) = Self::parse_entry(entry) {
                if seen_urls.insert(item.url.clone()) {
                    entries.push(item);
                } else {
                    debug!("Skipping duplicate entry with URL: {}", item.url);
                }
            }
        }

        // Stable: undated entries keep document order behind dated ones.
        entries.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        info!("Parsed feed with {} entries", entries.len());

        Ok(ParsedFeed { title, entries })
    }

    fn parse_entry(entry: feed_rs::model::Entry) -> Option<FeedItem> {
        let link = entry
            .links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| entry.links.first())?;
        let url = link.href.trim().to_string();

        if !is_valid_http_url(&url) {
            debug!("Skipping entry with unusable link: {}", url);
            return None;
        }

        let title = entry
            .title
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled".to_string());

        Some(FeedItem {
            url,
            title,
            published_at: entry.published.or(entry.updated),
        })
    }
}
