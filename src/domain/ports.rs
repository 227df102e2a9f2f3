use crate::domain::model::DebtRecord;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read-only paginated feed of debt records from the upstream platform.
#[async_trait]
pub trait DebtSource: Send + Sync {
    /// Exchange the shared secret for a short-lived access token.
    async fn authenticate(&self) -> Result<String>;

    /// Fetch one page of the debt listing. Pages are 1-based; an empty vec
    /// means the listing is exhausted.
    async fn fetch_page(&self, access_token: &str, page: u32) -> Result<Vec<DebtRecord>>;
}

/// Durable named blobs with an atomic-replace contract: a concurrent reader
/// sees either the previous payload or the new one, never a torn write.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Vec<u8>>;
    async fn put(&self, name: &str, payload: &[u8]) -> Result<()>;
}

/// Per-customer note counts consumed during summary enrichment.
#[async_trait]
pub trait NoteCounter: Send + Sync {
    async fn count_by_customer(&self) -> Result<std::collections::HashMap<String, i64>>;
}
