//! Persistence coordination between the remote store and the local cache.

pub mod coordinator;
pub mod debounce;

pub use coordinator::{
    LoadOutcome, LoadSource, PersistenceCoordinator, SyncOptions, SyncStatus, choose_source,
};
pub use debounce::Debouncer;
