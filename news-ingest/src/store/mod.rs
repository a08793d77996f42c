pub mod memory;
pub mod postgres;
pub mod supabase;

pub use memory::MemoryNewsStore;
pub use postgres::PgNewsStore;
pub use supabase::SupabaseNewsStore;

use crate::types::{NewNewsRecord, NewsRecord, Result};
use async_trait::async_trait;

/// Result of a single insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(NewsRecord),
    /// A row with the same URL already exists; nothing was written.
    Duplicate,
}

/// Table-like store of `NewsRecord` rows keyed by unique `url`
#[async_trait]
pub trait NewsStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Whether any row has exactly this URL
    async fn exists_by_url(&self, url: &str) -> Result<bool>;

    /// Insert one row. Existing rows are never updated.
    async fn insert(&self, record: NewNewsRecord) -> Result<InsertOutcome>;

    /// Newest rows first by `created_at`
    async fn recent(&self, limit: usize) -> Result<Vec<NewsRecord>>;
}
