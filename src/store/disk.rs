use crate::core::SyncError;
use crate::store::LocalCache;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "budget";

/// Cache persisted in a fjall keyspace under the data directory.
pub struct DiskCache {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskCache {
    pub fn open(path: &Path) -> Result<Self, SyncError> {
        std::fs::create_dir_all(path).map_err(|e| SyncError::Cache(e.to_string()))?;

        let keyspace = Config::new(path.join("cache"))
            .open()
            .map_err(|e| SyncError::Cache(e.to_string()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .map_err(|e| SyncError::Cache(e.to_string()))?;
        debug!("Opened local cache at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }
}

impl LocalCache for DiskCache {
    fn read(&self, key: &str) -> Result<Option<String>, SyncError> {
        let value = self
            .partition
            .get(key.as_bytes())
            .map_err(|e| SyncError::Cache(e.to_string()))?;
        match value {
            Some(bytes) => {
                debug!("Cache HIT for key: {}", key);
                String::from_utf8(bytes.to_vec())
                    .map(Some)
                    .map_err(|e| SyncError::MalformedRecord(e.to_string()))
            }
            None => {
                debug!("Cache MISS for key: {}", key);
                Ok(None)
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SyncError> {
        self.partition
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| SyncError::Cache(e.to_string()))?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .map_err(|e| SyncError::Cache(e.to_string()))?;
        debug!("Cache PUT for key: {}", key);
        Ok(())
    }
}
