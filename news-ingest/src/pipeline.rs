use crate::dedup::DedupGate;
use crate::persistence::{build_record, PersistenceWriter};
use crate::rss_utils::text::preview;
use crate::store::{InsertOutcome, NewsStore};
use crate::summarizer::Summarizer;
use crate::traits::{ArticleFetcher, PullFeed};
use crate::types::{FailureKind, FeedItem, IngestError, PipelineConfig, Result};
use backoff::{backoff::Backoff, ExponentialBackoff};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Per-entry progress. `Saved`, `Skipped` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    Pending,
    DedupChecked,
    Fetched,
    Summarized,
    Saved,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryOutcome {
    pub feed_url: String,
    pub url: String,
    pub title: String,
    pub state: EntryState,
    /// Last non-terminal state reached before `state`
    pub reached: EntryState,
    pub failure: Option<FailureKind>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedFailure {
    pub feed_url: String,
    pub kind: FailureKind,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub feeds_read: usize,
    pub outcomes: Vec<EntryOutcome>,
    pub feed_failures: Vec<FeedFailure>,
}

impl RunReport {
    fn count(&self, state: EntryState) -> usize {
        self.outcomes.iter().filter(|o| o.state == state).count()
    }

    pub fn saved(&self) -> usize {
        self.count(EntryState::Saved)
    }

    pub fn skipped(&self) -> usize {
        self.count(EntryState::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(EntryState::Failed)
    }

    pub fn saved_urls(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.state == EntryState::Saved)
            .map(|o| o.url.as_str())
            .collect()
    }
}

/// Sequential batch job: feeds in configured order, entries one at a time.
pub struct FeedPipeline {
    sources: Vec<Box<dyn PullFeed>>,
    dedup: DedupGate,
    fetcher: Arc<dyn ArticleFetcher>,
    summarizer: Summarizer,
    writer: PersistenceWriter,
    config: PipelineConfig,
}

impl FeedPipeline {
    pub fn new(
        store: Arc<dyn NewsStore>,
        fetcher: Arc<dyn ArticleFetcher>,
        summarizer: Summarizer,
        config: PipelineConfig,
    ) -> Self {
        Self {
            sources: Vec::new(),
            dedup: DedupGate::new(store.clone()),
            fetcher,
            summarizer,
            writer: PersistenceWriter::new(store),
            config,
        }
    }

    /// Add a feed; feeds are processed in the order they were added
    pub fn add_source(&mut self, source: Box<dyn PullFeed>) {
        info!(
            "Adding feed to pipeline: {} [{}]",
            source.source().url,
            source.source().category
        );
        self.sources.push(source);
    }

    /// Run every feed once. Never fails: problems are recorded per feed or per entry.
    pub async fn run(&self) -> RunReport {
        let started_at = Utc::now();
        let mut outcomes = Vec::new();
        let mut feed_failures = Vec::new();

        info!("Starting pipeline run over {} feeds", self.sources.len());

        for source in &self.sources {
            let feed_url = source.source().url.clone();

            let items = match self.pull_with_retry(source.as_ref()).await {
                Ok(items) => items,
                Err(e) => {
                    error!("Failed to read feed {}: {}", feed_url, e);
                    feed_failures.push(FeedFailure {
                        feed_url,
                        kind: e.kind(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let total = items.len();
            let bounded: Vec<FeedItem> = items
                .into_iter()
                .take(self.config.max_entries_per_feed)
                .collect();
            debug!("Processing {} of {} entries from {}", bounded.len(), total, feed_url);

            for item in &bounded {
                let outcome = self.process_entry(source.as_ref(), item).await;
                log_outcome(&outcome);

                let saved = outcome.state == EntryState::Saved;
                outcomes.push(outcome);

                if saved && !self.config.politeness_interval.is_zero() {
                    tokio::time::sleep(self.config.politeness_interval).await;
                }
            }
        }

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            feeds_read: self.sources.len() - feed_failures.len(),
            outcomes,
            feed_failures,
        };

        info!(
            "Pipeline run finished: {} feeds read, {} saved, {} skipped, {} failed, {} feed errors",
            report.feeds_read,
            report.saved(),
            report.skipped(),
            report.failed(),
            report.feed_failures.len()
        );

        report
    }

    async fn pull_with_retry(&self, source: &dyn PullFeed) -> Result<Vec<FeedItem>> {
        let delay = self.config.feed_retry_delay;
        let mut backoff = ExponentialBackoff {
            current_interval: delay,
            initial_interval: delay,
            max_interval: delay * 32,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        };

        let mut attempt = 0;
        loop {
            match source.pull().await {
                Ok(items) => return Ok(items),
                Err(e) if attempt < self.config.feed_retries => {
                    attempt += 1;
                    let wait = backoff.next_backoff().unwrap_or(delay);
                    warn!(
                        "Attempt {} failed for {}, retrying in {:?}: {}",
                        attempt,
                        source.source().url,
                        wait,
                        e
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn process_entry(&self, source: &dyn PullFeed, item: &FeedItem) -> EntryOutcome {
        let mut entry = EntryRun::new(source.source().url.clone(), item);

        if self.dedup.exists(&item.url).await {
            return entry.skip("already stored");
        }
        entry.advance(EntryState::DedupChecked);

        let article = match self.fetcher.fetch_article(&item.url).await {
            Ok(article) => article,
            Err(e) => return entry.fail("fetch", e),
        };
        entry.advance(EntryState::Fetched);

        let title = if article.title.trim().is_empty() {
            item.title.clone()
        } else {
            article.title.clone()
        };
        entry.title = title.clone();

        let summary = match self.summarizer.summarize(&title, &article.body).await {
            Ok(summary) => summary,
            Err(e) => return entry.fail("summarize", e),
        };
        entry.advance(EntryState::Summarized);

        let record = build_record(
            &title,
            &item.url,
            &summary,
            &source.source_name(),
            source.source(),
        );

        match self.writer.save(record).await {
            Ok(InsertOutcome::Inserted(_)) => entry.finish(EntryState::Saved, None, None),
            Ok(InsertOutcome::Duplicate) => entry.skip("already stored (rejected at insert)"),
            Err(e) => entry.fail("save", e),
        }
    }
}

/// Tracks one entry through the gates
struct EntryRun {
    feed_url: String,
    url: String,
    title: String,
    state: EntryState,
}

impl EntryRun {
    fn new(feed_url: String, item: &FeedItem) -> Self {
        Self {
            feed_url,
            url: item.url.clone(),
            title: item.title.clone(),
            state: EntryState::Pending,
        }
    }

    fn advance(&mut self, next: EntryState) {
        debug!("{}: {:?} -> {:?}", self.url, self.state, next);
        self.state = next;
    }

    fn skip(self, reason: &str) -> EntryOutcome {
        self.finish(EntryState::Skipped, None, Some(reason.to_string()))
    }

    fn fail(self, stage: &str, error: IngestError) -> EntryOutcome {
        let kind = error.kind();
        let reason = format!("{} failed ({}): {}", stage, kind, error);
        self.finish(EntryState::Failed, Some(kind), Some(reason))
    }

    fn finish(
        self,
        terminal: EntryState,
        failure: Option<FailureKind>,
        reason: Option<String>,
    ) -> EntryOutcome {
        EntryOutcome {
            feed_url: self.feed_url,
            url: self.url,
            title: self.title,
            state: terminal,
            reached: self.state,
            failure,
            reason,
        }
    }
}

fn log_outcome(outcome: &EntryOutcome) {
    let title = preview(&outcome.title, 40);
    let reason = outcome.reason.as_deref().unwrap_or("");
    match outcome.state {
        EntryState::Saved => info!("saved: {} ({})", title, outcome.url),
        EntryState::Skipped => info!("skipped: {} ({}) - {}", title, outcome.url, reason),
        _ => warn!("failed: {} ({}) - {}", title, outcome.url, reason),
    }
}

/// Pipeline builder for easier configuration
pub struct PipelineBuilder {
    pipeline: FeedPipeline,
}

impl PipelineBuilder {
    pub fn new(
        store: Arc<dyn NewsStore>,
        fetcher: Arc<dyn ArticleFetcher>,
        summarizer: Summarizer,
    ) -> Self {
        Self {
            pipeline: FeedPipeline::new(store, fetcher, summarizer, PipelineConfig::default()),
        }
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.pipeline.config = config;
        self
    }

    pub fn max_entries_per_feed(mut self, max: usize) -> Self {
        self.pipeline.config.max_entries_per_feed = max;
        self
    }

    pub fn politeness_interval(mut self, interval: Duration) -> Self {
        self.pipeline.config.politeness_interval = interval;
        self
    }

    pub fn add_source(mut self, source: Box<dyn PullFeed>) -> Self {
        self.pipeline.add_source(source);
        self
    }

    pub fn build(self) -> FeedPipeline {
        self.pipeline
    }
}
