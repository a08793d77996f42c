use crate::store::NewsStore;
use std::sync::Arc;
use tracing::warn;

/// Check-before-insert guard keyed on article URL.
///
/// A failed lookup counts as "not seen": the entry is processed and the
/// store's unique `url` constraint rejects the insert if it was a duplicate
/// after all.
pub struct DedupGate {
    store: Arc<dyn NewsStore>,
}

impl DedupGate {
    pub fn new(store: Arc<dyn NewsStore>) -> Self {
        Self { store }
    }

    pub async fn exists(&self, url: &str) -> bool {
        match self.store.exists_by_url(url).await {
            Ok(found) => found,
            Err(e) => {
                warn!(
                    "Dedup lookup failed on {} store, treating {} as new: {}",
                    self.store.backend_name(),
                    url,
                    e
                );
                false
            }
        }
    }
}
