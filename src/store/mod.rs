//! Local fallback cache for the sync record.

pub mod disk;
pub mod memory;

use crate::core::SyncError;

pub use disk::DiskCache;
pub use memory::MemoryCache;

/// A synchronous key-value text store.
pub trait LocalCache: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, SyncError>;

    fn write(&self, key: &str, value: &str) -> Result<(), SyncError>;
}
