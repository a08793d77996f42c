use super::{InsertOutcome, NewsStore};
use crate::types::{IngestError, NewNewsRecord, NewsRecord, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-process store with the same uniqueness rules as the database backends.
#[derive(Default)]
pub struct MemoryNewsStore {
    rows: RwLock<Vec<NewsRecord>>,
    fail_queries: AtomicBool,
    fail_inserts: AtomicBool,
}

impl MemoryNewsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `exists_by_url` call fail, to simulate a storage outage
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub async fn urls(&self) -> Vec<String> {
        self.rows.read().await.iter().map(|r| r.url.clone()).collect()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl NewsStore for MemoryNewsStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn exists_by_url(&self, url: &str) -> Result<bool> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(IngestError::Storage("memory store query failure".to_string()));
        }
        Ok(self.rows.read().await.iter().any(|r| r.url == url))
    }

    async fn insert(&self, record: NewNewsRecord) -> Result<InsertOutcome> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(IngestError::Storage("memory store insert failure".to_string()));
        }

        let mut rows = self.rows.write().await;
        if rows.iter().any(|r| r.url == record.url) {
            return Ok(InsertOutcome::Duplicate);
        }

        let row = NewsRecord::from_new(record, Uuid::new_v4(), Utc::now());
        rows.push(row.clone());
        Ok(InsertOutcome::Inserted(row))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<NewsRecord>> {
        let rows = self.rows.read().await;
        // Insertion order breaks ties between equal timestamps.
        let mut newest: Vec<NewsRecord> = rows.iter().rev().cloned().collect();
        newest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        newest.truncate(limit);
        Ok(newest)
    }
}
