use crate::extract::extract_article;
use crate::traits::ArticleFetcher;
use crate::types::{FetchConfig, IngestError, RawArticle, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    /// Download a feed document. Single attempt; retries belong to the pipeline.
    pub async fn fetch_feed(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();
        debug!("Fetching feed: {}", url);

        let response = self.get(url).await?;
        let content = self.read_body(response).await?;

        info!(
            "Fetched feed: {} ({} bytes in {}ms)",
            url,
            content.len(),
            start_time.elapsed().as_millis()
        );
        Ok(content)
    }

    /// Download an article page and return its HTML.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        debug!("Fetching article from: {}", url);

        let response = self.get(url).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        // Missing content type is given the benefit of the doubt.
        if !content_type.is_empty()
            && !content_type.contains("html")
            && !content_type.contains("xml")
        {
            return Err(IngestError::Extraction(format!(
                "unsupported content type '{}'",
                content_type
            )));
        }

        self.read_body(response).await
    }

    fn max_body_bytes(&self) -> u64 {
        self.config.max_body_mb as u64 * 1024 * 1024
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(IngestError::Network(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_body_bytes() {
                return Err(IngestError::Network(format!(
                    "response too large: {} bytes",
                    content_length
                )));
            }
        }

        Ok(response)
    }

    /// Stream the body, giving up once it passes the size cap. Chunked and
    /// compressed responses carry no usable `Content-Length`.
    async fn read_body(&self, mut response: Response) -> Result<String> {
        let limit = self.max_body_bytes();
        let mut body: Vec<u8> = Vec::new();

        while let Some(chunk) = response.chunk().await? {
            if (body.len() + chunk.len()) as u64 > limit {
                return Err(IngestError::Network(format!(
                    "response too large: over {}MB",
                    self.config.max_body_mb
                )));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl ArticleFetcher for Fetcher {
    async fn fetch_article(&self, url: &str) -> Result<RawArticle> {
        let html = self.fetch_html(url).await?;
        extract_article(&html, None)
    }
}
