use crate::domain::classify::{build_detailed, summarize};
use crate::domain::model::DebtRecord;
use crate::domain::ports::{DebtSource, NoteCounter, SnapshotStore};
use crate::storage::{DETAILED_SNAPSHOT, SUMMARY_SNAPSHOT};
use crate::utils::error::{AppError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

/// Counters reported after a successful run.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub pages_fetched: u32,
    pub records: usize,
    pub customers: usize,
}

/// The fetch → classify → aggregate → enrich → persist pipeline.
///
/// Any failure before the final writes leaves the previously persisted
/// snapshots untouched; readers keep serving stale-but-valid data.
pub struct SnapshotPipeline {
    source: Arc<dyn DebtSource>,
    store: Arc<dyn SnapshotStore>,
    notes: Arc<dyn NoteCounter>,
    max_pages: u32,
}

impl SnapshotPipeline {
    pub fn new(
        source: Arc<dyn DebtSource>,
        store: Arc<dyn SnapshotStore>,
        notes: Arc<dyn NoteCounter>,
        max_pages: u32,
    ) -> Self {
        Self {
            source,
            store,
            notes,
            max_pages,
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Snapshot run started");

        let access_token = self.source.authenticate().await.map_err(|e| {
            tracing::error!("Upstream authentication failed: {}", e);
            e
        })?;

        let (records, pages_fetched) = self.fetch_all(&access_token).await?;
        tracing::info!(
            "Fetched {} records across {} pages",
            records.len(),
            pages_fetched
        );

        let today = Utc::now().date_naive();
        let detailed = build_detailed(&records, today);

        let note_counts = match self.notes.count_by_customer().await {
            Ok(counts) => counts,
            Err(e) => {
                // Annotation counts are decoration; a broken notes store must
                // not block fresh debt data.
                tracing::warn!("Note counts unavailable, defaulting to 0: {}", e);
                HashMap::new()
            }
        };
        let summary = summarize(&detailed, &note_counts);

        self.store
            .put(DETAILED_SNAPSHOT, &serde_json::to_vec_pretty(&detailed)?)
            .await?;
        self.store
            .put(SUMMARY_SNAPSHOT, &serde_json::to_vec_pretty(&summary)?)
            .await?;

        let result = RunSummary {
            pages_fetched,
            records: detailed.len(),
            customers: summary.len(),
        };
        tracing::info!(
            "Snapshot run finished: {} records, {} customers owing",
            result.records,
            result.customers
        );
        Ok(result)
    }

    /// Walk the paginated listing until an empty page. The page cutoff turns
    /// a stuck upstream (one that keeps returning full pages) into a
    /// diagnosable error instead of an endless loop.
    async fn fetch_all(&self, access_token: &str) -> Result<(Vec<DebtRecord>, u32)> {
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            if page > self.max_pages {
                tracing::error!(
                    "Aborting run: upstream still returning records after {} pages",
                    self.max_pages
                );
                return Err(AppError::PageLimitExceeded {
                    max_pages: self.max_pages,
                });
            }

            let batch = self.source.fetch_page(access_token, page).await?;
            if batch.is_empty() {
                return Ok((records, page));
            }

            records.extend(batch);
            tracing::debug!("Page {} loaded, {} records so far", page, records.len());
            page += 1;
        }
    }
}
