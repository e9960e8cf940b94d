//! JSON and CSV export of transactions

use crate::core::Transaction;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::ValueEnum;
use std::fmt::Display;

pub const CSV_HEADER: &str = "Date,Description,Category,Amount,Emoji";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// `budget-export-YYYY-MM-DD.<ext>`
pub fn default_file_name(format: ExportFormat, on: NaiveDate) -> String {
    format!("budget-export-{}.{}", on.format("%Y-%m-%d"), format.extension())
}

pub fn export(transactions: &[Transaction], format: ExportFormat) -> Result<String> {
    if transactions.is_empty() {
        bail!("No transactions to export");
    }
    match format {
        ExportFormat::Json => to_json(transactions),
        ExportFormat::Csv => to_csv(transactions),
    }
}

pub fn to_json(transactions: &[Transaction]) -> Result<String> {
    serde_json::to_string_pretty(transactions).context("Failed to serialize transactions")
}

/// Header line followed by one row per transaction, every field quoted.
pub fn to_csv(transactions: &[Transaction]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .has_headers(false)
        .from_writer(Vec::new());

    for txn in transactions {
        writer
            .write_record([
                txn.date.format("%Y-%m-%d").to_string(),
                txn.description.clone(),
                txn.category.label().to_string(),
                txn.amount.to_string(),
                txn.emoji.clone(),
            ])
            .context("Failed to write CSV row")?;
    }

    let rows = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))?;
    let rows = String::from_utf8(rows).context("CSV output is not valid UTF-8")?;
    Ok(format!("{CSV_HEADER}\n{}", rows.trim_end_matches('\n')))
}
