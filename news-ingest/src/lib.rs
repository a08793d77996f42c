pub mod types;
pub mod traits;
pub mod config;
pub mod rss_utils;
pub mod parser;
pub mod extract;
pub mod fetcher;
pub mod llm_adapter;
pub mod summarizer;
pub mod store;
pub mod dedup;
pub mod persistence;
pub mod sources;
pub mod pipeline;

pub use types::*;
pub use traits::{ArticleFetcher, PullFeed};
pub use parser::FeedParser;
pub use fetcher::Fetcher;
pub use llm_adapter::{CompletionRequest, GeminiAdapter, LlmAdapter, MockLlmAdapter};
pub use summarizer::Summarizer;
pub use store::{InsertOutcome, MemoryNewsStore, NewsStore, PgNewsStore, SupabaseNewsStore};
pub use dedup::DedupGate;
pub use persistence::PersistenceWriter;
pub use sources::RssFeedSource;
pub use pipeline::{EntryOutcome, EntryState, FeedPipeline, PipelineBuilder, RunReport};
