//! Remote blob store holding the authoritative sync record.

pub mod http;
pub mod memory;
pub mod util;

use crate::core::{SyncError, SyncRecord};
use async_trait::async_trait;

pub use http::HttpBlobStore;
pub use memory::MemoryBlobStore;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetches the record stored under `key`, `None` when nothing is stored.
    async fn fetch_record(&self, key: &str) -> Result<Option<SyncRecord>, SyncError>;

    /// Overwrites the record stored under `key`.
    async fn put_record(&self, key: &str, record: &SyncRecord) -> Result<(), SyncError>;
}
