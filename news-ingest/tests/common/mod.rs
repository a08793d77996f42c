#![allow(dead_code)]

use async_trait::async_trait;
use news_ingest::{
    ArticleFetcher, FeedItem, FeedPipeline, FeedSource, IngestError, MemoryNewsStore,
    MockLlmAdapter, PipelineBuilder, PullFeed, RawArticle, Result, Summarizer, SummarizerConfig,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const ARTICLE_BODY: &str =
    "Shares of the chipmaker rose 8% after it reported record data-center revenue of $30.8 billion.";

pub fn valid_summary_json(summary: &str, key_stats: &str, score: i32) -> String {
    serde_json::json!({
        "summary": summary,
        "key_stats": key_stats,
        "sentiment_score": score,
        "tags": ["Semiconductors", "NVDA"],
    })
    .to_string()
}

/// Mock LLM that answers `n` times with a valid summary
pub fn llm_with_valid_replies(n: usize) -> MockLlmAdapter {
    (0..n).fold(MockLlmAdapter::new("test"), |llm, i| {
        llm.with_response(valid_summary_json(
            &format!("Summary {}", i),
            "Revenue reached {{$30.8B}}.",
            5,
        ))
    })
}

pub fn feed_items(prefix: &str, n: usize) -> Vec<FeedItem> {
    (1..=n)
        .map(|i| {
            FeedItem::new(
                format!("https://news.example.com/{}/{}", prefix, i),
                format!("{} story {}", prefix, i),
            )
        })
        .collect()
}

/// In-memory feed; optionally fails its first `failures` pulls
pub struct StaticFeed {
    source: FeedSource,
    items: Vec<FeedItem>,
    failures: usize,
    pulls: AtomicUsize,
}

impl StaticFeed {
    pub fn new(source: FeedSource, items: Vec<FeedItem>) -> Self {
        Self {
            source,
            items,
            failures: 0,
            pulls: AtomicUsize::new(0),
        }
    }

    pub fn failing(source: FeedSource) -> Self {
        Self::new(source, Vec::new()).with_failures(usize::MAX)
    }

    pub fn with_failures(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }
}

#[async_trait]
impl PullFeed for StaticFeed {
    fn source(&self) -> &FeedSource {
        &self.source
    }

    async fn pull(&self) -> Result<Vec<FeedItem>> {
        let attempt = self.pulls.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(IngestError::Network("feed unreachable".to_string()));
        }
        Ok(self.items.clone())
    }
}

/// Article fetcher that records every URL it is asked for
#[derive(Default)]
pub struct FakeArticleFetcher {
    calls: Mutex<Vec<String>>,
    failing: HashSet<String>,
    untitled: HashSet<String>,
}

impl FakeArticleFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Pages whose HTML carries no title
    pub fn untitled_on(mut self, url: &str) -> Self {
        self.untitled.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArticleFetcher for FakeArticleFetcher {
    async fn fetch_article(&self, url: &str) -> Result<RawArticle> {
        self.calls.lock().unwrap().push(url.to_string());

        if self.failing.contains(url) {
            return Err(IngestError::Network(format!("timed out fetching {}", url)));
        }

        let title = if self.untitled.contains(url) {
            String::new()
        } else {
            format!("Headline for {}", url)
        };

        Ok(RawArticle {
            title,
            body: ARTICLE_BODY.to_string(),
        })
    }
}

pub fn tech_source() -> FeedSource {
    FeedSource::new("Tech", "https://feeds.example.com/tech").with_name("Example Tech")
}

pub fn build_pipeline(
    store: &Arc<MemoryNewsStore>,
    fetcher: &Arc<FakeArticleFetcher>,
    llm: &Arc<MockLlmAdapter>,
    feeds: Vec<StaticFeed>,
    max_entries: usize,
) -> FeedPipeline {
    let summarizer = Summarizer::new(llm.clone(), SummarizerConfig::default());

    let mut builder = PipelineBuilder::new(store.clone(), fetcher.clone(), summarizer)
        .max_entries_per_feed(max_entries)
        .politeness_interval(Duration::ZERO);

    for feed in feeds {
        builder = builder.add_source(Box::new(feed));
    }

    builder.build()
}

/// One-shot HTTP/1.1 server on an ephemeral port. Answers the first request
/// with `response` as-is; the handle yields the raw request text.
pub async fn serve_once(response: Vec<u8>) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        // The client may hang up early on purpose.
        let _ = socket.write_all(&response).await;
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// `200 OK` with a chunked body of `total` bytes and no `Content-Length`
pub fn chunked_response(content_type: &str, total: usize) -> Vec<u8> {
    let mut out = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
        content_type
    )
    .into_bytes();

    let block = vec![b'a'; 64 * 1024];
    let mut sent = 0;
    while sent < total {
        let n = block.len().min(total - sent);
        out.extend_from_slice(format!("{:x}\r\n", n).as_bytes());
        out.extend_from_slice(&block[..n]);
        out.extend_from_slice(b"\r\n");
        sent += n;
    }
    out.extend_from_slice(b"0\r\n\r\n");
    out
}

pub fn json_response(status: &str, body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
    .into_bytes()
}
