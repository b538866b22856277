use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::models::{ClientRecord, DbFile};
use crate::store::RecordStore;

/// Flat-file store backed by one JSON document of the shape
/// `{ "clients": [...] }`.
///
/// Every load re-reads the file, so edits made behind the server's back
/// (a re-seed, a hand edit) are visible on the next request without any
/// invalidation step.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn load(&self) -> Result<Vec<ClientRecord>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let db: DbFile = serde_json::from_str(&raw)
            .with_context(|| format!("invalid store file {}", self.path.display()))?;
        Ok(db.clients)
    }

    async fn replace(&self, records: Vec<ClientRecord>) -> Result<()> {
        let db = DbFile { clients: records };
        let raw = serde_json::to_string_pretty(&db)?;
        tokio::fs::write(&self.path, raw)
            .await
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}
