use super::{InsertOutcome, NewsStore};
use crate::types::{NewNewsRecord, NewsRecord, RecordId, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use tracing::{debug, info};

/// `news` table in Postgres (Supabase exposes the same database).
pub struct PgNewsStore {
    db: PgPool,
}

impl PgNewsStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        let db = PgPool::connect(database_url).await?;
        Ok(Self { db })
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        info!("Database schema is up to date");
        Ok(())
    }

    fn row_to_record(row: &PgRow) -> Result<NewsRecord> {
        Ok(NewsRecord {
            id: RecordId::Uuid(row.try_get("id")?),
            title: row.try_get("title")?,
            url: row.try_get("url")?,
            content_summary: row.try_get("content_summary")?,
            original_source: row.try_get("original_source")?,
            sentiment_score: row.try_get("sentiment_score")?,
            tags: row.try_get::<Option<Vec<String>>, _>("tags")?,
            category: row.try_get("category")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

#[async_trait]
impl NewsStore for PgNewsStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn exists_by_url(&self, url: &str) -> Result<bool> {
        let row = sqlx::query("SELECT id FROM news WHERE url = $1 LIMIT 1")
            .bind(url)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.is_some())
    }

    async fn insert(&self, record: NewNewsRecord) -> Result<InsertOutcome> {
        let row = sqlx::query(
            r#"
            INSERT INTO news (title, url, content_summary, original_source, sentiment_score, tags, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (url) DO NOTHING
            RETURNING id, title, url, content_summary, original_source, sentiment_score, tags, category, created_at
            "#,
        )
        .bind(&record.title)
        .bind(&record.url)
        .bind(&record.content_summary)
        .bind(&record.original_source)
        .bind(record.sentiment_score)
        .bind(&record.tags)
        .bind(&record.category)
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some(row) => Ok(InsertOutcome::Inserted(Self::row_to_record(&row)?)),
            None => {
                debug!("Insert skipped, URL already stored: {}", record.url);
                Ok(InsertOutcome::Duplicate)
            }
        }
    }

    async fn recent(&self, limit: usize) -> Result<Vec<NewsRecord>> {
        let rows = sqlx::query("SELECT * FROM news ORDER BY created_at DESC LIMIT $1")
            .bind(limit as i64)
            .fetch_all(&self.db)
            .await?;

        rows.iter().map(Self::row_to_record).collect()
    }
}
