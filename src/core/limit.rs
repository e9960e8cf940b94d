//! Weighted daily spending limits.
//!
//! A monthly budget is spread over the days of the month in proportion to a
//! per-day weight: weekdays weigh 1.0 and weekend days 1.5. The limits of
//! every day of a month therefore add up to the monthly budget.

use crate::core::transaction::Transaction;
use chrono::{Datelike, NaiveDate, Weekday};

pub const WEEKDAY_WEIGHT: f64 = 1.0;
pub const WEEKEND_WEIGHT: f64 = 1.5;

/// Today's allowance against what has already been spent today.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DailyStatus {
    pub today_limit: f64,
    pub today_spent: f64,
    pub is_over: bool,
}

impl DailyStatus {
    /// Allowance left for the day, negative once over the limit.
    pub fn remaining(&self) -> f64 {
        self.today_limit - self.today_spent
    }
}

/// One row of a month plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayAllocation {
    pub date: NaiveDate,
    pub weight: f64,
    pub limit: f64,
}

pub fn day_weight(date: NaiveDate) -> f64 {
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => WEEKEND_WEIGHT,
        _ => WEEKDAY_WEIGHT,
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(30, |last| last.day())
}

/// All calendar days of the month containing `date`.
pub fn month_days(date: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let (year, month) = (date.year(), date.month());
    (1..=days_in_month(year, month)).filter_map(move |d| NaiveDate::from_ymd_opt(year, month, d))
}

/// Budget share carried by a day of weight 1.0.
pub fn unit_allowance(monthly_budget: f64, weights: &[f64]) -> f64 {
    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    monthly_budget / total_weight
}

/// Weighted limits for every day of the month containing `date`.
pub fn month_plan(monthly_budget: f64, date: NaiveDate) -> Vec<DayAllocation> {
    let days: Vec<NaiveDate> = month_days(date).collect();
    let weights: Vec<f64> = days.iter().map(|d| day_weight(*d)).collect();
    let unit = if monthly_budget > 0.0 {
        unit_allowance(monthly_budget, &weights)
    } else {
        0.0
    };
    days.into_iter()
        .zip(weights)
        .map(|(date, weight)| DayAllocation {
            date,
            weight,
            limit: unit * weight,
        })
        .collect()
}

/// Computes today's weighted limit and what has been spent on `today`.
///
/// A budget that is zero or negative means no limit is configured, in which
/// case nothing is reported as spent or over.
pub fn compute_daily_status(
    monthly_budget: f64,
    transactions: &[Transaction],
    today: NaiveDate,
) -> DailyStatus {
    if !(monthly_budget > 0.0) {
        return DailyStatus::default();
    }

    let weights: Vec<f64> = month_days(today).map(day_weight).collect();
    let today_limit = unit_allowance(monthly_budget, &weights) * day_weight(today);
    let today_spent: f64 = transactions
        .iter()
        .filter(|t| t.date == today)
        .map(|t| t.amount)
        .sum();

    DailyStatus {
        today_limit,
        today_spent,
        is_over: today_spent > today_limit,
    }
}
