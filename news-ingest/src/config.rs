use crate::rss_utils::url::is_valid_http_url;
use crate::types::{FeedSource, IngestError, Result};
use std::path::Path;
use tracing::info;

/// Feeds polled when no feeds file is given
pub fn default_feed_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new("Tech", "https://techcrunch.com/feed/").with_name("TechCrunch"),
        FeedSource::new("Crypto", "https://www.coindesk.com/arc/outboundfeeds/rss/")
            .with_name("CoinDesk"),
        FeedSource::new("Finance", "https://www.cnbc.com/id/100003114/device/rss/rss.html")
            .with_name("CNBC"),
    ]
}

/// Parse a JSON array of `{"category", "url", "name"?}` objects.
pub fn parse_feed_sources(json: &str) -> Result<Vec<FeedSource>> {
    let sources: Vec<FeedSource> = serde_json::from_str(json)
        .map_err(|e| IngestError::Config(format!("invalid feeds file: {}", e)))?;
    validate_feed_sources(&sources)?;
    Ok(sources)
}

pub fn load_feed_sources(path: &Path) -> Result<Vec<FeedSource>> {
    let json = std::fs::read_to_string(path)?;
    let sources = parse_feed_sources(&json)?;
    info!("Loaded {} feeds from {}", sources.len(), path.display());
    Ok(sources)
}

pub fn validate_feed_sources(sources: &[FeedSource]) -> Result<()> {
    if sources.is_empty() {
        return Err(IngestError::Config("no feeds configured".to_string()));
    }

    for source in sources {
        if source.category.trim().is_empty() {
            return Err(IngestError::Config(format!(
                "feed {} has an empty category",
                source.url
            )));
        }
        if !is_valid_http_url(&source.url) {
            return Err(IngestError::Config(format!(
                "feed URL is not http(s): {}",
                source.url
            )));
        }
    }

    Ok(())
}
