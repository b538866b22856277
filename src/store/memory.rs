use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::feed::ChangeBroadcaster;
use crate::models::ClientRecord;
use crate::store::RecordStore;

/// In-memory store for tests and demos.
///
/// Mutations report into an optional change broadcaster, so a running feed
/// sees commits here the same way it sees file edits.
pub struct MemoryStore {
    records: RwLock<Vec<ClientRecord>>,
    feed: Option<ChangeBroadcaster>,
}

impl MemoryStore {
    pub fn new(records: Vec<ClientRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            feed: None,
        }
    }

    /// Report every mutation into `feed`.
    pub fn with_feed(records: Vec<ClientRecord>, feed: ChangeBroadcaster) -> Self {
        Self {
            records: RwLock::new(records),
            feed: Some(feed),
        }
    }

    /// Append one record.
    pub async fn insert(&self, record: ClientRecord) {
        self.records.write().await.push(record);
        self.notify();
    }

    fn notify(&self) {
        if let Some(feed) = &self.feed {
            feed.notify();
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load(&self) -> Result<Vec<ClientRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn replace(&self, records: Vec<ClientRecord>) -> Result<()> {
        *self.records.write().await = records;
        self.notify();
        Ok(())
    }
}
