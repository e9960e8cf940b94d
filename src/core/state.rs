//! Budget state and its persisted representation.

use crate::core::error::{SyncError, ValidationError};
use crate::core::ledger::Ledger;
use crate::core::transaction::Transaction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything the application knows: the ledger and the monthly budget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetState {
    pub ledger: Ledger,
    pub monthly_budget: f64,
}

impl BudgetState {
    pub fn set_monthly_budget(&mut self, value: f64) -> Result<(), ValidationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::InvalidBudget(value));
        }
        self.monthly_budget = value;
        Ok(())
    }

    pub fn to_record(&self, synced_at: DateTime<Utc>) -> SyncRecord {
        SyncRecord {
            transactions: self.ledger.all().to_vec(),
            monthly_budget: Some(self.monthly_budget),
            last_sync: Some(synced_at),
        }
    }
}

impl From<SyncRecord> for BudgetState {
    fn from(record: SyncRecord) -> Self {
        let monthly_budget = record
            .monthly_budget
            .filter(|b| b.is_finite() && *b >= 0.0)
            .unwrap_or(0.0);
        BudgetState {
            ledger: Ledger::from_transactions(record.transactions),
            monthly_budget,
        }
    }
}

/// The single document exchanged with the remote store and the local cache.
/// Every sync replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRecord {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

impl SyncRecord {
    /// True when the record carries neither transactions nor a budget.
    pub fn is_blank(&self) -> bool {
        self.transactions.is_empty() && self.monthly_budget.is_none()
    }

    pub fn to_json(&self) -> Result<String, SyncError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, SyncError> {
        Ok(serde_json::from_str(text)?)
    }
}
