use crate::models::ClientRecord;
use anyhow::Result;
use async_trait::async_trait;

/// Backing collection for the record-store server.
///
/// Query evaluation happens above this trait (`store::query`); backends only
/// move whole record sets in and out, the way the mock's flat file works.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load every record currently in the store.
    async fn load(&self) -> Result<Vec<ClientRecord>>;

    /// Replace the store's contents wholesale.
    async fn replace(&self, records: Vec<ClientRecord>) -> Result<()>;
}
