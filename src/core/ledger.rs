//! In-memory transaction store, newest first.

use crate::core::error::ValidationError;
use crate::core::transaction::{NewTransaction, Transaction};
use chrono::Utc;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    last_issued: i64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from a stored sequence, keeping the first occurrence
    /// of any duplicated id and dropping records with an invalid amount.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(transactions.len());
        for txn in transactions {
            if !txn.amount.is_finite() || txn.amount < 0.0 {
                warn!(
                    "Dropping transaction {} with invalid amount {}",
                    txn.id, txn.amount
                );
            } else if seen.insert(txn.id.clone()) {
                kept.push(txn);
            } else {
                warn!("Dropping duplicate transaction id {}", txn.id);
            }
        }
        let last_issued = kept
            .iter()
            .filter_map(|t| t.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            transactions: kept,
            last_issued,
        }
    }

    /// Validates `fields`, assigns a fresh id and prepends the new record.
    pub fn add(&mut self, fields: NewTransaction) -> Result<Transaction, ValidationError> {
        fields.validate()?;
        let id = self.next_id(Utc::now().timestamp_millis());
        let txn = fields.into_transaction(id)?;
        debug!(id = %txn.id, amount = txn.amount, "Adding transaction");
        self.transactions.insert(0, txn.clone());
        Ok(txn)
    }

    /// Removes the transaction with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        let removed = self.transactions.len() != before;
        debug!(id, removed, "Removing transaction");
        removed
    }

    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    // Millisecond timestamp, bumped past anything already issued or stored.
    // Once the id space is exhausted, ids restart from the clock and only
    // stay unique.
    fn next_id(&mut self, now_millis: i64) -> String {
        let mut candidate = self
            .last_issued
            .checked_add(1)
            .map_or(now_millis, |floor| now_millis.max(floor));
        while self.get(&candidate.to_string()).is_some() {
            candidate = candidate.checked_add(1).unwrap_or_else(|| {
                warn!("Transaction id space exhausted, restarting from zero");
                0
            });
        }
        self.last_issued = self.last_issued.max(candidate);
        candidate.to_string()
    }
}
