//! Core budget logic: domain types, limits and aggregation

pub mod aggregate;
pub mod config;
pub mod error;
pub mod ledger;
pub mod limit;
pub mod log;
pub mod state;
pub mod transaction;

// Re-export main types for cleaner imports
pub use error::{SyncError, ValidationError};
pub use ledger::Ledger;
pub use limit::{DailyStatus, compute_daily_status};
pub use state::{BudgetState, SyncRecord};
pub use transaction::{Category, NewTransaction, Transaction};
