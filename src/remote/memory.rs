use crate::core::{SyncError, SyncRecord};
use crate::remote::RemoteStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// In-process blob store. Records are kept as serialized text so that a
/// fetch sees exactly what a real store would return.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
    puts: Arc<AtomicUsize>,
    offline: Arc<AtomicBool>,
    put_delay: Arc<Mutex<Option<Duration>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail as if the network were down.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delays every put, to simulate slow round-trips.
    pub async fn set_put_delay(&self, delay: Option<Duration>) {
        *self.put_delay.lock().await = delay;
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Stores raw text under `key`, bypassing serialization.
    pub async fn insert_raw(&self, key: &str, text: &str) {
        self.inner
            .lock()
            .await
            .insert(key.to_string(), text.to_string());
    }

    fn check_online(&self) -> Result<(), SyncError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SyncError::RemoteUnavailable(
                "memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryBlobStore {
    async fn fetch_record(&self, key: &str) -> Result<Option<SyncRecord>, SyncError> {
        self.check_online()?;
        let text = self.inner.lock().await.get(key).cloned();
        debug!(key, found = text.is_some(), "Memory blob FETCH");
        text.map(|t| SyncRecord::from_json(&t)).transpose()
    }

    async fn put_record(&self, key: &str, record: &SyncRecord) -> Result<(), SyncError> {
        let delay = *self.put_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_online()?;
        let text = record.to_json()?;
        self.inner.lock().await.insert(key.to_string(), text);
        self.puts.fetch_add(1, Ordering::SeqCst);
        debug!(key, "Memory blob PUT");
        Ok(())
    }
}
