//! The application session: budget state plus its persistence.
//!
//! Mutations apply to the in-memory state synchronously and then hand the
//! whole state to the coordinator, which writes the local cache and
//! schedules the remote write. Reads never touch storage.

use crate::core::aggregate::{self, CategoryShare, CategorySpending, SpendingSummary};
use crate::core::limit::{self, DailyStatus, DayAllocation};
use crate::core::{BudgetState, NewTransaction, SyncError, Transaction, ValidationError};
use crate::sync::{LoadSource, PersistenceCoordinator, SyncStatus};
use chrono::NaiveDate;
use tracing::info;

pub struct BudgetSession {
    state: BudgetState,
    coordinator: PersistenceCoordinator,
    source: LoadSource,
    load_error: Option<SyncError>,
}

impl BudgetSession {
    /// Starts a session from the best available source.
    pub async fn start(coordinator: PersistenceCoordinator) -> Self {
        let outcome = coordinator.load().await;
        info!(
            source = %outcome.source,
            transactions = outcome.state.ledger.len(),
            "Session started"
        );
        Self {
            state: outcome.state,
            coordinator,
            source: outcome.source,
            load_error: outcome.remote_error,
        }
    }

    pub fn add_transaction(
        &mut self,
        fields: NewTransaction,
    ) -> Result<Transaction, ValidationError> {
        let txn = self.state.ledger.add(fields)?;
        self.coordinator.persist(&self.state);
        Ok(txn)
    }

    /// Deletes by id. Deleting an unknown id changes nothing and syncs nothing.
    pub fn delete_transaction(&mut self, id: &str) -> bool {
        let removed = self.state.ledger.remove(id);
        if removed {
            self.coordinator.persist(&self.state);
        }
        removed
    }

    pub fn set_monthly_budget(&mut self, value: f64) -> Result<(), ValidationError> {
        self.state.set_monthly_budget(value)?;
        self.coordinator.persist(&self.state);
        Ok(())
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.state.ledger.all()
    }

    pub fn monthly_budget(&self) -> f64 {
        self.state.monthly_budget
    }

    pub fn daily_status(&self, today: NaiveDate) -> DailyStatus {
        limit::compute_daily_status(self.state.monthly_budget, self.transactions(), today)
    }

    pub fn month_plan(&self, date: NaiveDate) -> Vec<DayAllocation> {
        limit::month_plan(self.state.monthly_budget, date)
    }

    pub fn total_spent(&self) -> f64 {
        aggregate::total_spent(self.transactions())
    }

    pub fn per_category(&self) -> Vec<CategorySpending> {
        aggregate::per_category(self.transactions())
    }

    pub fn summary(&self) -> SpendingSummary {
        aggregate::summarize(self.transactions())
    }

    pub fn category_breakdown(&self) -> Vec<CategoryShare> {
        aggregate::category_breakdown(self.transactions())
    }

    pub fn load_source(&self) -> LoadSource {
        self.source
    }

    /// Why the remote record could not be read at startup, if it could not.
    pub fn load_error(&self) -> Option<&SyncError> {
        self.load_error.as_ref()
    }

    pub fn has_unsynced(&self) -> bool {
        self.coordinator.has_unsynced()
    }

    pub fn cache_error(&self) -> Option<String> {
        self.coordinator.cache_error()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.coordinator.status()
    }

    pub fn coordinator(&self) -> &PersistenceCoordinator {
        &self.coordinator
    }

    /// Pushes any pending change to the remote store now.
    pub async fn flush(&self) -> SyncStatus {
        self.coordinator.flush().await
    }

    /// Pushes the full current state to the remote store, pending or not.
    pub async fn sync_now(&self) -> SyncStatus {
        self.coordinator.push_now(&self.state).await
    }
}
