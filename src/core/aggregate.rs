//! Totals and per-category summaries derived from a transaction snapshot.
use crate::core::transaction::{Category, Transaction};

/// Amount spent under one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpending {
    pub category: Category,
    pub amount: f64,
    pub emoji: String,
}

/// A category total with its rounded share of overall spending.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub spending: CategorySpending,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpendingSummary {
    pub total_spent: f64,
    pub transaction_count: usize,
    pub average_per_transaction: f64,
}

pub fn total_spent(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(|t| t.amount).sum()
}

/// Sums amounts per category in first-seen order. The emoji of the first
/// transaction seen for a category is the one kept.
pub fn per_category(transactions: &[Transaction]) -> Vec<CategorySpending> {
    let mut totals: Vec<CategorySpending> = Vec::new();
    for txn in transactions {
        match totals.iter_mut().find(|c| c.category == txn.category) {
            Some(existing) => existing.amount += txn.amount,
            None => totals.push(CategorySpending {
                category: txn.category,
                amount: txn.amount,
                emoji: txn.emoji.clone(),
            }),
        }
    }
    totals
}

pub fn summarize(transactions: &[Transaction]) -> SpendingSummary {
    let total = total_spent(transactions);
    let count = transactions.len();
    SpendingSummary {
        total_spent: total,
        transaction_count: count,
        average_per_transaction: if count > 0 { total / count as f64 } else { 0.0 },
    }
}

/// Per-category totals, largest first, with their percentage of the total.
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryShare> {
    let mut categories = per_category(transactions);
    let total: f64 = categories.iter().map(|c| c.amount).sum();
    categories.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    categories
        .into_iter()
        .map(|spending| {
            let percentage = if total > 0.0 {
                (spending.amount / total * 100.0).round() as u32
            } else {
                0
            };
            CategoryShare {
                spending,
                percentage,
            }
        })
        .collect()
}
