use super::{InsertOutcome, NewsStore};
use crate::types::{IngestError, NewNewsRecord, NewsRecord, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// `news` table through Supabase's PostgREST endpoint.
pub struct SupabaseNewsStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for SupabaseNewsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseNewsStore")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl SupabaseNewsStore {
    pub fn new(project_url: &str, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(IngestError::Config("Supabase key is required".to_string()));
        }

        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;

        Ok(Self {
            client,
            base_url: format!("{}/rest/v1/news", project_url.trim_end_matches('/')),
            api_key,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        Err(IngestError::Storage(format!(
            "Supabase HTTP {}: {}",
            status.as_u16(),
            crate::rss_utils::text::preview(&detail, 200)
        )))
    }
}

#[async_trait]
impl NewsStore for SupabaseNewsStore {
    fn backend_name(&self) -> &'static str {
        "supabase"
    }

    async fn exists_by_url(&self, url: &str) -> Result<bool> {
        let filter = format!("eq.{}", url);
        let response = self
            .authorized(self.client.get(&self.base_url))
            .query(&[("select", "id"), ("url", filter.as_str()), ("limit", "1")])
            .send()
            .await?;

        let rows: Vec<serde_json::Value> = Self::check(response).await?.json().await?;
        Ok(!rows.is_empty())
    }

    async fn insert(&self, record: NewNewsRecord) -> Result<InsertOutcome> {
        let response = self
            .authorized(self.client.post(&self.base_url))
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await?;

        // Unique violation on `url`.
        if response.status() == StatusCode::CONFLICT {
            debug!("Insert skipped, URL already stored: {}", record.url);
            return Ok(InsertOutcome::Duplicate);
        }

        let mut rows: Vec<NewsRecord> = Self::check(response).await?.json().await?;
        match rows.pop() {
            Some(row) => Ok(InsertOutcome::Inserted(row)),
            None => Err(IngestError::Storage(
                "insert returned no representation".to_string(),
            )),
        }
    }

    async fn recent(&self, limit: usize) -> Result<Vec<NewsRecord>> {
        let limit = limit.to_string();
        let response = self
            .authorized(self.client.get(&self.base_url))
            .query(&[
                ("select", "*"),
                ("order", "created_at.desc"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }
}
