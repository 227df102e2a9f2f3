use crate::domain::ports::SnapshotStore;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use std::path::PathBuf;

pub const DETAILED_SNAPSHOT: &str = "detailed_debts";
pub const SUMMARY_SNAPSHOT: &str = "summary_debts";

/// Snapshot store backed by JSON files under a data directory.
///
/// Writes go to a `.tmp` sibling first and are renamed over the target, so
/// readers never observe a half-written snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    base_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", name))
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn get(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(name);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::SnapshotMissing {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, name: &str, payload: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.base_dir).await?;

        let target = self.path_for(name);
        let tmp = self.base_dir.join(format!("{}.json.tmp", name));

        tokio::fs::write(&tmp, payload).await?;
        tokio::fs::rename(&tmp, &target).await?;
        Ok(())
    }
}
