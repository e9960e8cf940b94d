use crate::core::SyncError;
use crate::store::LocalCache;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// In-memory cache implementation using HashMap and RwLock
#[derive(Clone, Default)]
pub struct MemoryCache {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn read(&self, key: &str) -> Result<Option<String>, SyncError> {
        let cache = self
            .inner
            .read()
            .map_err(|e| SyncError::Cache(e.to_string()))?;
        let value = cache.get(key).cloned();
        debug!(key, hit = value.is_some(), "Cache READ");
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SyncError> {
        let mut cache = self
            .inner
            .write()
            .map_err(|e| SyncError::Cache(e.to_string()))?;
        debug!(key, "Cache WRITE");
        cache.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
