//! Typed errors for the budget domain.
//!
//! Validation failures are reported to the caller before any state changes.
//! Sync failures never escape the persistence coordinator: they become a
//! fallback decision on load and a status signal on write-back.

use thiserror::Error;

/// Malformed user input, rejected before the ledger is mutated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Description must not be empty")]
    EmptyDescription,

    #[error("Amount must be a non-negative number, got {0}")]
    InvalidAmount(f64),

    #[error("Monthly budget must be a non-negative number, got {0}")]
    InvalidBudget(f64),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Failures talking to either side of the persistence pair.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Network, HTTP or store failure on the remote side.
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// A stored document that does not parse as a sync record.
    #[error("Malformed sync record: {0}")]
    MalformedRecord(String),

    /// The local cache could not be read or written.
    #[error("Local cache error: {0}")]
    Cache(String),
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::MalformedRecord(err.to_string())
    }
}
