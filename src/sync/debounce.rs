//! Cancel-and-replace scheduling for remote writes.
//!
//! Every scheduled job carries a ticket taken from a generation counter.
//! A job runs only if, after its delay and while holding the write gate, its
//! ticket is still the newest one. Jobs run one at a time behind the gate, so
//! a write issued for older state can never land after a newer one.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct Debouncer {
    window: Duration,
    generation: Arc<AtomicU64>,
    gate: Arc<tokio::sync::Mutex<()>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: Arc::new(AtomicU64::new(0)),
            gate: Arc::new(tokio::sync::Mutex::new(())),
            pending: Mutex::new(None),
        }
    }

    /// Schedules `job` to run after the debounce window, superseding any job
    /// scheduled earlier. Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&self, job: F) -> u64
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let gate = Arc::clone(&self.gate);
        let window = self.window;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let _turn = gate.lock().await;
            if generation.load(Ordering::SeqCst) != ticket {
                debug!(ticket, "Scheduled job superseded");
                return;
            }
            debug!(ticket, "Running scheduled job");
            job().await;
        });

        // The superseded task exits on its own once it sees a newer ticket.
        self.lock_pending().replace(handle);
        debug!(ticket, window_ms = window.as_millis() as u64, "Scheduled job");
        ticket
    }

    /// Supersedes whatever is scheduled without running anything.
    pub fn cancel(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Supersedes the scheduled job and runs `job` immediately, after any
    /// job already in flight.
    pub async fn run_now<F, Fut, T>(&self, job: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.cancel();
        let _turn = self.gate.lock().await;
        debug!(ticket, "Running job immediately");
        job().await
    }

    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Waits until the most recently scheduled job has either run or been
    /// superseded.
    pub async fn settle(&self) {
        let handle = self.lock_pending().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Scheduled job failed: {}", e);
            }
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
