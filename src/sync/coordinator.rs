//! Keeps the local cache and the remote record consistent.
//!
//! Loading picks one source wholesale: the remote record when it can be read
//! and holds data, otherwise the local cache, otherwise an empty state.
//! Every mutation is written to the local cache right away and pushed to the
//! remote store after a debounce window. Remote failures never reach the
//! caller; they show up as a [`SyncStatus`].

use crate::core::state::BudgetState;
use crate::core::{SyncError, SyncRecord};
use crate::remote::RemoteStore;
use crate::remote::util::with_retry;
use crate::store::LocalCache;
use crate::sync::debounce::Debouncer;
use chrono::Utc;
use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

const RETRY_DELAY_MS: u64 = 200;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Synced,
    Error(String),
}

impl Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Idle => write!(f, "idle"),
            SyncStatus::Syncing => write!(f, "syncing"),
            SyncStatus::Synced => write!(f, "synced"),
            SyncStatus::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

/// Where the state adopted at startup came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    LocalCache,
    Empty,
}

impl Display for LoadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LoadSource::Remote => "remote",
            LoadSource::LocalCache => "local cache",
            LoadSource::Empty => "empty",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadDecision {
    pub source: LoadSource,
    pub record: SyncRecord,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub source: LoadSource,
    pub state: BudgetState,
    /// Why the remote record was not used, if it was attempted and failed.
    pub remote_error: Option<SyncError>,
}

/// Chooses the startup source. `remote` is `None` when no remote store is
/// configured.
pub fn choose_source(
    remote: Option<&Result<Option<SyncRecord>, SyncError>>,
    local: Option<SyncRecord>,
) -> LoadDecision {
    match (remote, local) {
        (Some(Ok(Some(record))), _) if !record.is_blank() => LoadDecision {
            source: LoadSource::Remote,
            record: record.clone(),
        },
        (_, Some(cached)) => LoadDecision {
            source: LoadSource::LocalCache,
            record: cached,
        },
        (_, None) => LoadDecision {
            source: LoadSource::Empty,
            record: SyncRecord::default(),
        },
    }
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub key: String,
    pub debounce: Duration,
    pub fetch_retries: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            key: crate::core::config::DEFAULT_RECORD_KEY.to_string(),
            debounce: Duration::from_millis(1000),
            fetch_retries: 0,
        }
    }
}

// Everything a scheduled remote write needs, detached from the coordinator.
#[derive(Clone)]
struct RemoteWriter {
    remote: Arc<dyn RemoteStore>,
    key: String,
    status: Arc<watch::Sender<SyncStatus>>,
    unsynced: Arc<Mutex<Option<SyncRecord>>>,
}

impl RemoteWriter {
    async fn write(self, record: SyncRecord) -> SyncStatus {
        self.status.send_replace(SyncStatus::Syncing);
        let status = match self.remote.put_record(&self.key, &record).await {
            Ok(()) => {
                let mut unsynced = self.unsynced.lock().unwrap_or_else(PoisonError::into_inner);
                if unsynced.as_ref() == Some(&record) {
                    *unsynced = None;
                }
                info!(
                    transactions = record.transactions.len(),
                    "Synced record to remote store"
                );
                SyncStatus::Synced
            }
            Err(e) => {
                warn!("Remote sync failed, local cache holds the latest state: {}", e);
                SyncStatus::Error(e.to_string())
            }
        };
        self.status.send_replace(status.clone());
        status
    }
}

pub struct PersistenceCoordinator {
    cache: Arc<dyn LocalCache>,
    writer: Option<RemoteWriter>,
    key: String,
    fetch_retries: usize,
    debouncer: Debouncer,
    status: Arc<watch::Sender<SyncStatus>>,
    unsynced: Arc<Mutex<Option<SyncRecord>>>,
    cache_error: Mutex<Option<String>>,
}

impl PersistenceCoordinator {
    pub fn new(
        remote: Option<Arc<dyn RemoteStore>>,
        cache: Arc<dyn LocalCache>,
        options: SyncOptions,
    ) -> Self {
        let (status, _) = watch::channel(SyncStatus::Idle);
        let status = Arc::new(status);
        let unsynced = Arc::new(Mutex::new(None));
        let writer = remote.map(|remote| RemoteWriter {
            remote,
            key: options.key.clone(),
            status: Arc::clone(&status),
            unsynced: Arc::clone(&unsynced),
        });
        Self {
            cache,
            writer,
            key: options.key,
            fetch_retries: options.fetch_retries,
            debouncer: Debouncer::new(options.debounce),
            status,
            unsynced,
            cache_error: Mutex::new(None),
        }
    }

    pub fn has_remote(&self) -> bool {
        self.writer.is_some()
    }

    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// True when a change has not reached the remote store yet.
    pub fn has_unsynced(&self) -> bool {
        self.lock_unsynced().is_some()
    }

    /// The last local cache write failure, cleared by the next successful
    /// write. A later remote success does not clear it.
    pub fn cache_error(&self) -> Option<String> {
        self.cache_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True while a debounced remote write is waiting or in flight.
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Loads the startup state: remote first, then the local cache, then
    /// empty. A usable remote record is also written into the local cache.
    #[instrument(name = "LoadState", skip(self), fields(key = %self.key))]
    pub async fn load(&self) -> LoadOutcome {
        let remote_result = match &self.writer {
            Some(writer) => {
                let remote = &writer.remote;
                let key = self.key.as_str();
                Some(
                    with_retry(
                        move || remote.fetch_record(key),
                        self.fetch_retries,
                        RETRY_DELAY_MS,
                    )
                    .await,
                )
            }
            None => None,
        };

        if let Some(Err(e)) = &remote_result {
            warn!("Remote fetch failed, falling back to local cache: {}", e);
        }

        let decision = choose_source(remote_result.as_ref(), self.read_cache());
        info!(source = %decision.source, "Loaded budget state");

        if decision.source == LoadSource::Remote {
            self.write_cache(&decision.record);
        }

        let remote_error = match remote_result {
            Some(Err(e)) => {
                self.status.send_replace(SyncStatus::Error(e.to_string()));
                Some(e)
            }
            _ => None,
        };

        LoadOutcome {
            source: decision.source,
            state: BudgetState::from(decision.record),
            remote_error,
        }
    }

    /// Writes `state` to the local cache now and schedules a remote write.
    /// Never blocks on the network; must be called within a tokio runtime
    /// when a remote store is configured.
    pub fn persist(&self, state: &BudgetState) {
        let record = state.to_record(Utc::now());
        self.write_cache(&record);

        let Some(writer) = &self.writer else {
            return;
        };
        *self.lock_unsynced() = Some(record.clone());
        let writer = writer.clone();
        self.debouncer.schedule(move || async move {
            writer.write(record).await;
        });
    }

    /// Pushes the latest unsynced state right away, superseding any pending
    /// debounced write.
    pub async fn flush(&self) -> SyncStatus {
        let Some(writer) = &self.writer else {
            return self.status();
        };
        let record = self.lock_unsynced().clone();
        match record {
            Some(record) => {
                debug!("Flushing pending sync");
                let writer = writer.clone();
                self.debouncer
                    .run_now(move || writer.write(record))
                    .await
            }
            None => self.status(),
        }
    }

    /// Pushes the given state unconditionally, used for an explicit sync.
    pub async fn push_now(&self, state: &BudgetState) -> SyncStatus {
        let record = state.to_record(Utc::now());
        self.write_cache(&record);
        let Some(writer) = &self.writer else {
            return self.status();
        };
        *self.lock_unsynced() = Some(record.clone());
        let writer = writer.clone();
        self.debouncer.run_now(move || writer.write(record)).await
    }

    /// Waits for the scheduled remote write, if any, to run or be superseded.
    pub async fn settle(&self) {
        self.debouncer.settle().await;
    }

    fn read_cache(&self) -> Option<SyncRecord> {
        let text = match self.cache.read(&self.key) {
            Ok(text) => text?,
            Err(e) => {
                error!("Failed to read local cache: {}", e);
                return None;
            }
        };
        match SyncRecord::from_json(&text) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Ignoring unreadable local cache: {}", e);
                None
            }
        }
    }

    fn write_cache(&self, record: &SyncRecord) {
        let result = record
            .to_json()
            .and_then(|text| self.cache.write(&self.key, &text));
        let mut cache_error = self.cache_error.lock().unwrap_or_else(PoisonError::into_inner);
        match result {
            Ok(()) => *cache_error = None,
            Err(e) => {
                error!("Failed to write local cache: {}", e);
                self.status.send_replace(SyncStatus::Error(e.to_string()));
                *cache_error = Some(e.to_string());
            }
        }
    }

    fn lock_unsynced(&self) -> std::sync::MutexGuard<'_, Option<SyncRecord>> {
        self.unsynced.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Category, NewTransaction};
    use crate::remote::MemoryBlobStore;
    use crate::store::MemoryCache;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Cache whose writes can be made to fail.
    #[derive(Clone, Default)]
    struct FlakyCache {
        inner: MemoryCache,
        failing: Arc<AtomicBool>,
    }

    impl LocalCache for FlakyCache {
        fn read(&self, key: &str) -> Result<Option<String>, SyncError> {
            self.inner.read(key)
        }

        fn write(&self, key: &str, value: &str) -> Result<(), SyncError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(SyncError::Cache("disk full".to_string()));
            }
            self.inner.write(key, value)
        }
    }

    const KEY: &str = "budget-data.json";

    fn options(debounce_ms: u64) -> SyncOptions {
        SyncOptions {
            key: KEY.to_string(),
            debounce: Duration::from_millis(debounce_ms),
            fetch_retries: 0,
        }
    }

    fn coordinator(
        remote: &MemoryBlobStore,
        cache: &MemoryCache,
        debounce_ms: u64,
    ) -> PersistenceCoordinator {
        PersistenceCoordinator::new(
            Some(Arc::new(remote.clone())),
            Arc::new(cache.clone()),
            options(debounce_ms),
        )
    }

    fn state_with(descriptions: &[&str], budget: f64) -> BudgetState {
        let mut state = BudgetState::default();
        for description in descriptions {
            state
                .ledger
                .add(NewTransaction::new(
                    description,
                    10.0,
                    Category::Other,
                    NaiveDate::from_ymd_opt(2025, 9, 6).unwrap(),
                ))
                .unwrap();
        }
        state.set_monthly_budget(budget).unwrap();
        state
    }

    fn record_with(descriptions: &[&str]) -> SyncRecord {
        state_with(descriptions, 0.0).to_record(Utc::now())
    }

    fn cached_record(cache: &MemoryCache) -> SyncRecord {
        SyncRecord::from_json(&cache.read(KEY).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn test_choose_source_remote_wins() {
        let remote = Ok(Some(record_with(&["remote"])));
        let decision = choose_source(Some(&remote), Some(record_with(&["local"])));
        assert_eq!(decision.source, LoadSource::Remote);
        assert_eq!(decision.record.transactions[0].description, "remote");
    }

    #[test]
    fn test_choose_source_budget_only_remote_wins() {
        let remote = Ok(Some(SyncRecord {
            monthly_budget: Some(800.0),
            ..SyncRecord::default()
        }));
        let decision = choose_source(Some(&remote), Some(record_with(&["local"])));
        assert_eq!(decision.source, LoadSource::Remote);
    }

    #[test]
    fn test_choose_source_falls_back_to_local() {
        let local = record_with(&["local"]);
        let failures = [
            Err(SyncError::RemoteUnavailable("timeout".to_string())),
            Err(SyncError::MalformedRecord("bad json".to_string())),
            Ok(None),
            Ok(Some(SyncRecord::default())),
        ];
        for remote in &failures {
            let decision = choose_source(Some(remote), Some(local.clone()));
            assert_eq!(decision.source, LoadSource::LocalCache, "{remote:?}");
            assert_eq!(decision.record, local);
        }
        let decision = choose_source(None, Some(local.clone()));
        assert_eq!(decision.source, LoadSource::LocalCache);
    }

    #[test]
    fn test_choose_source_empty() {
        let remote = Err(SyncError::RemoteUnavailable("down".to_string()));
        let decision = choose_source(Some(&remote), None);
        assert_eq!(decision.source, LoadSource::Empty);
        assert_eq!(decision.record, SyncRecord::default());
        assert_eq!(choose_source(None, None).source, LoadSource::Empty);
    }

    #[tokio::test]
    async fn test_load_from_remote_refreshes_cache() {
        let remote = MemoryBlobStore::new();
        let cache = MemoryCache::new();
        remote.put_record(KEY, &record_with(&["remote"])).await.unwrap();
        cache.write(KEY, &record_with(&["stale"]).to_json().unwrap()).unwrap();

        let outcome = coordinator(&remote, &cache, 10).load().await;
        assert_eq!(outcome.source, LoadSource::Remote);
        assert_eq!(outcome.state.ledger.all()[0].description, "remote");
        assert!(outcome.remote_error.is_none());
        assert_eq!(cached_record(&cache).transactions[0].description, "remote");
    }

    #[tokio::test]
    async fn test_load_with_remote_down_uses_cache() {
        let remote = MemoryBlobStore::new();
        remote.set_offline(true);
        let cache = MemoryCache::new();
        cache
            .write(KEY, &record_with(&["coffee", "lunch"]).to_json().unwrap())
            .unwrap();

        let coordinator = coordinator(&remote, &cache, 10);
        let outcome = coordinator.load().await;
        assert_eq!(outcome.source, LoadSource::LocalCache);
        assert_eq!(outcome.state.ledger.len(), 2);
        assert!(matches!(
            outcome.remote_error,
            Some(SyncError::RemoteUnavailable(_))
        ));
        assert!(matches!(coordinator.status(), SyncStatus::Error(_)));
    }

    #[tokio::test]
    async fn test_load_with_malformed_sources_is_empty() {
        let remote = MemoryBlobStore::new();
        remote.insert_raw(KEY, "{broken").await;
        let cache = MemoryCache::new();
        cache.write(KEY, "also broken").unwrap();

        let outcome = coordinator(&remote, &cache, 10).load().await;
        assert_eq!(outcome.source, LoadSource::Empty);
        assert!(outcome.state.ledger.is_empty());
        assert_eq!(outcome.state.monthly_budget, 0.0);
    }

    #[tokio::test]
    async fn test_rapid_mutations_collapse_into_one_put() {
        let remote = MemoryBlobStore::new();
        let cache = MemoryCache::new();
        let coordinator = coordinator(&remote, &cache, 50);

        let mut state = state_with(&["coffee"], 0.0);
        coordinator.persist(&state);
        state
            .ledger
            .add(NewTransaction::new(
                "lunch",
                12.0,
                Category::FoodAndDrink,
                NaiveDate::from_ymd_opt(2025, 9, 6).unwrap(),
            ))
            .unwrap();
        coordinator.persist(&state);

        // The cache is current before any remote write happens.
        assert_eq!(cached_record(&cache).transactions.len(), 2);
        assert_eq!(remote.put_count(), 0);

        coordinator.settle().await;
        assert_eq!(remote.put_count(), 1);
        let stored = remote.fetch_record(KEY).await.unwrap().unwrap();
        assert_eq!(stored.transactions.len(), 2);
        assert_eq!(coordinator.status(), SyncStatus::Synced);
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_local_copy() {
        let remote = MemoryBlobStore::new();
        remote.set_offline(true);
        let cache = MemoryCache::new();
        let coordinator = coordinator(&remote, &cache, 10);

        coordinator.persist(&state_with(&["coffee"], 500.0));
        coordinator.settle().await;

        assert!(matches!(coordinator.status(), SyncStatus::Error(_)));
        let cached = cached_record(&cache);
        assert_eq!(cached.transactions.len(), 1);
        assert_eq!(cached.monthly_budget, Some(500.0));

        // Back online: the next flush retries the unsynced state.
        remote.set_offline(false);
        assert_eq!(coordinator.flush().await, SyncStatus::Synced);
        assert_eq!(remote.put_count(), 1);
        assert_eq!(coordinator.flush().await, SyncStatus::Synced);
        assert_eq!(remote.put_count(), 1);
    }

    #[tokio::test]
    async fn test_flush_supersedes_pending_write() {
        let remote = MemoryBlobStore::new();
        let cache = MemoryCache::new();
        let coordinator = coordinator(&remote, &cache, 200);

        coordinator.persist(&state_with(&["coffee"], 0.0));
        assert!(coordinator.is_pending());
        assert_eq!(coordinator.flush().await, SyncStatus::Synced);
        coordinator.settle().await;

        assert_eq!(remote.put_count(), 1);
    }

    #[tokio::test]
    async fn test_older_write_never_lands_after_newer() {
        let remote = MemoryBlobStore::new();
        remote.set_put_delay(Some(Duration::from_millis(80))).await;
        let cache = MemoryCache::new();
        let coordinator = coordinator(&remote, &cache, 5);

        coordinator.persist(&state_with(&["old"], 0.0));
        // First write is now in flight.
        tokio::time::sleep(Duration::from_millis(30)).await;
        coordinator.persist(&state_with(&["new"], 0.0));
        coordinator.settle().await;

        let stored = remote.fetch_record(KEY).await.unwrap().unwrap();
        assert_eq!(stored.transactions[0].description, "new");
        assert_eq!(remote.put_count(), 2);
    }

    #[tokio::test]
    async fn test_status_transitions_are_observable() {
        let remote = MemoryBlobStore::new();
        remote.set_put_delay(Some(Duration::from_millis(40))).await;
        let cache = MemoryCache::new();
        let coordinator = coordinator(&remote, &cache, 5);
        let mut status = coordinator.subscribe();
        assert_eq!(*status.borrow(), SyncStatus::Idle);

        coordinator.persist(&state_with(&["coffee"], 0.0));
        status.changed().await.unwrap();
        assert_eq!(*status.borrow_and_update(), SyncStatus::Syncing);
        status.changed().await.unwrap();
        assert_eq!(*status.borrow_and_update(), SyncStatus::Synced);
    }

    #[tokio::test]
    async fn test_local_only_mode() {
        let cache = MemoryCache::new();
        let coordinator =
            PersistenceCoordinator::new(None, Arc::new(cache.clone()), options(10));
        assert!(!coordinator.has_remote());

        coordinator.persist(&state_with(&["coffee"], 100.0));
        assert!(!coordinator.is_pending());
        assert_eq!(coordinator.status(), SyncStatus::Idle);
        assert_eq!(coordinator.flush().await, SyncStatus::Idle);

        let outcome = coordinator.load().await;
        assert_eq!(outcome.source, LoadSource::LocalCache);
        assert_eq!(outcome.state.monthly_budget, 100.0);
    }

    #[tokio::test]
    async fn test_failed_startup_fetch_leaves_nothing_unsynced() {
        let remote = MemoryBlobStore::new();
        remote.set_offline(true);
        let cache = MemoryCache::new();
        let coordinator = coordinator(&remote, &cache, 10);

        coordinator.load().await;
        assert!(matches!(coordinator.status(), SyncStatus::Error(_)));
        assert!(!coordinator.has_unsynced());

        coordinator.persist(&state_with(&["coffee"], 0.0));
        assert!(coordinator.has_unsynced());
        remote.set_offline(false);
        assert_eq!(coordinator.flush().await, SyncStatus::Synced);
        assert!(!coordinator.has_unsynced());
    }

    #[tokio::test]
    async fn test_cache_failure_survives_remote_success() {
        let remote = MemoryBlobStore::new();
        let cache = FlakyCache::default();
        cache.failing.store(true, Ordering::SeqCst);
        let coordinator = PersistenceCoordinator::new(
            Some(Arc::new(remote.clone())),
            Arc::new(cache.clone()),
            options(10),
        );

        coordinator.persist(&state_with(&["coffee"], 0.0));
        assert_eq!(coordinator.flush().await, SyncStatus::Synced);
        assert_eq!(remote.put_count(), 1);
        assert!(coordinator.cache_error().unwrap().contains("disk full"));

        cache.failing.store(false, Ordering::SeqCst);
        coordinator.persist(&state_with(&["coffee", "lunch"], 0.0));
        assert!(coordinator.cache_error().is_none());
        coordinator.settle().await;
    }
}
