use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use news_ingest::config::{default_feed_sources, load_feed_sources, validate_feed_sources};
use news_ingest::llm_adapter::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use news_ingest::rss_utils::url::redact_password;
use news_ingest::{
    FetchConfig, Fetcher, GeminiAdapter, MemoryNewsStore, NewsStore, PgNewsStore, PipelineBuilder,
    PipelineConfig, RssFeedSource, SentimentBand, Summarizer, SummarizerConfig, SupabaseNewsStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "news-ingest", version, about = "Summarize financial/tech news feeds into a shared store")]
struct Cli {
    /// Storage backend for news rows
    #[arg(long, value_enum, env = "NEWS_STORE", default_value_t = StoreKind::Postgres)]
    store: StoreKind,

    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    #[arg(long, env = "SUPABASE_URL")]
    supabase_url: Option<String>,

    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    supabase_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StoreKind {
    Postgres,
    Supabase,
    /// Process-local store, discarded on exit
    Memory,
}

#[derive(Subcommand)]
enum Command {
    /// Poll every feed once and store new summaries
    Run(RunArgs),
    /// Print the most recently stored news
    Recent {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Create the news table (Postgres backend)
    Migrate,
}

#[derive(Args)]
struct RunArgs {
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    google_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    model: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    gemini_base_url: String,

    /// JSON array of {"category", "url", "name"?}; built-in feeds when absent
    #[arg(long)]
    feeds_file: Option<PathBuf>,

    /// Entries taken from the top of each feed
    #[arg(long, default_value_t = 5)]
    max_entries: usize,

    /// Pause after each saved entry, in milliseconds
    #[arg(long, default_value_t = 2000)]
    politeness_ms: u64,

    /// Article characters sent to the model
    #[arg(long, default_value_t = 8000)]
    body_chars: usize,

    /// Language for the summary and key stats
    #[arg(long, default_value = "Simplified Chinese")]
    language: String,

    /// Extra attempts when a feed download fails
    #[arg(long, default_value_t = 0)]
    feed_retries: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Run(args) => run(&cli, args).await,
        Command::Recent { limit } => recent(&cli, *limit).await,
        Command::Migrate => migrate(&cli).await,
    }
}

async fn open_store(cli: &Cli) -> anyhow::Result<Arc<dyn NewsStore>> {
    match cli.store {
        StoreKind::Postgres => {
            let Some(database_url) = cli.database_url.as_deref() else {
                bail!("DATABASE_URL is required for the postgres store");
            };
            info!("Connecting to database: {}", redact_password(database_url));
            let store = PgNewsStore::new(database_url)
                .await
                .context("failed to connect to PostgreSQL")?;
            Ok(Arc::new(store))
        }
        StoreKind::Supabase => {
            let (Some(url), Some(key)) = (cli.supabase_url.as_deref(), cli.supabase_key.clone())
            else {
                bail!("SUPABASE_URL and SUPABASE_KEY are required for the supabase store");
            };
            info!("Using Supabase project: {}", url);
            Ok(Arc::new(SupabaseNewsStore::new(url, key)?))
        }
        StoreKind::Memory => {
            info!("Using in-memory store; nothing will be persisted");
            Ok(Arc::new(MemoryNewsStore::new()))
        }
    }
}

async fn run(cli: &Cli, args: &RunArgs) -> anyhow::Result<()> {
    // Everything fatal is checked here, before any feed is read.
    let Some(api_key) = args.google_api_key.clone().filter(|k| !k.trim().is_empty()) else {
        bail!("GOOGLE_API_KEY is not set");
    };

    let feeds = match &args.feeds_file {
        Some(path) => load_feed_sources(path)
            .with_context(|| format!("failed to load feeds from {}", path.display()))?,
        None => default_feed_sources(),
    };
    validate_feed_sources(&feeds)?;

    let store = open_store(cli).await?;

    let llm = GeminiAdapter::new(api_key, args.model.clone())?.with_base_url(&args.gemini_base_url);
    info!("Using LLM: {:?}", llm);

    let summarizer = Summarizer::new(
        Arc::new(llm),
        SummarizerConfig {
            max_body_chars: args.body_chars,
            language: args.language.clone(),
        },
    );

    let fetcher = Arc::new(Fetcher::new(FetchConfig::default())?);

    let config = PipelineConfig {
        max_entries_per_feed: args.max_entries,
        politeness_interval: Duration::from_millis(args.politeness_ms),
        feed_retries: args.feed_retries,
        ..PipelineConfig::default()
    };

    let mut builder = PipelineBuilder::new(store, fetcher.clone(), summarizer).config(config);
    for feed in feeds {
        builder = builder.add_source(Box::new(RssFeedSource::new(feed, fetcher.clone())));
    }
    let pipeline = builder.build();

    let report = pipeline.run().await;

    for failure in &report.feed_failures {
        error!("Feed {} skipped ({}): {}", failure.feed_url, failure.kind, failure.reason);
    }
    println!(
        "Run complete: {} saved, {} skipped, {} failed, {} feed errors",
        report.saved(),
        report.skipped(),
        report.failed(),
        report.feed_failures.len()
    );

    Ok(())
}

async fn recent(cli: &Cli, limit: usize) -> anyhow::Result<()> {
    let store = open_store(cli).await?;
    let rows = store.recent(limit).await?;

    if rows.is_empty() {
        println!("No news stored yet.");
        return Ok(());
    }

    println!("Latest news:");
    for row in rows {
        let sentiment = row
            .sentiment_score
            .map(|s| format!("{:+} {}", s, SentimentBand::from_score(s).as_str()))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "- {} | {} | {} | {}",
            row.created_at.format("%Y-%m-%d %H:%M"),
            row.category,
            sentiment,
            news_ingest::rss_utils::text::preview(&row.title, 60)
        );
    }

    Ok(())
}

async fn migrate(cli: &Cli) -> anyhow::Result<()> {
    let StoreKind::Postgres = cli.store else {
        bail!("migrations only apply to the postgres store");
    };
    let Some(database_url) = cli.database_url.as_deref() else {
        bail!("DATABASE_URL is required to run migrations");
    };

    let store = PgNewsStore::new(database_url)
        .await
        .context("failed to connect to PostgreSQL")?;
    store.migrate().await?;
    Ok(())
}
