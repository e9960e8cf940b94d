pub mod cli;
pub mod core;
pub mod export;
pub mod remote;
pub mod session;
pub mod store;
pub mod sync;

use crate::cli::ui;
use crate::core::config::AppConfig;
use crate::core::{Category, NewTransaction};
use crate::export::ExportFormat;
use crate::remote::{HttpBlobStore, RemoteStore};
use crate::session::BudgetSession;
use crate::store::DiskCache;
use crate::sync::{PersistenceCoordinator, SyncOptions, SyncStatus};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Add {
        description: String,
        amount: f64,
        category: Category,
        date: Option<NaiveDate>,
        emoji: Option<String>,
    },
    Delete {
        id: String,
    },
    Budget {
        amount: f64,
    },
    List,
    Status {
        date: Option<NaiveDate>,
    },
    Plan {
        date: Option<NaiveDate>,
    },
    Summary,
    Export {
        format: ExportFormat,
        output: Option<PathBuf>,
    },
    Sync,
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

/// Wires the disk cache and, when configured, the remote blob store.
pub fn build_coordinator(config: &AppConfig) -> Result<PersistenceCoordinator> {
    let data_path = config.default_data_path()?;
    let cache = DiskCache::open(&data_path)
        .with_context(|| format!("Failed to open local cache at {}", data_path.display()))?;

    let remote: Option<Arc<dyn RemoteStore>> = match &config.remote {
        Some(remote) => {
            if remote.token().is_none() {
                debug!("No token in ${}, sending unauthenticated requests", remote.token_env);
            }
            Some(Arc::new(HttpBlobStore::from_config(remote)?))
        }
        None => {
            info!("No remote store configured, running in local-only mode");
            None
        }
    };

    let options = SyncOptions {
        key: config.record_key().to_string(),
        debounce: config.sync.debounce(),
        fetch_retries: config.remote.as_ref().map_or(0, |r| r.retries),
    };
    Ok(PersistenceCoordinator::new(remote, Arc::new(cache), options))
}

pub async fn open_session(config: &AppConfig) -> Result<BudgetSession> {
    let coordinator = build_coordinator(config)?;
    let spinner = ui::new_spinner("Loading budget...");
    let session = BudgetSession::start(coordinator).await;
    spinner.finish_and_clear();
    Ok(session)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("birr starting...");
    let config = load_config(config_path)?;
    let mut session = open_session(&config).await?;
    let currency = config.currency.as_str();
    let today = Local::now().date_naive();

    if let Some(e) = session.load_error() {
        eprintln!(
            "{}",
            ui::style_text(
                &format!("Remote store unreachable, showing local data: {e}"),
                ui::StyleType::Error
            )
        );
    }

    let result = execute(&mut session, command, currency, today).await;

    // Whatever happened, pending changes go out before exit.
    if session.has_unsynced() {
        let status = session.flush().await;
        report_sync_status(&status);
    }
    if let Some(e) = session.cache_error() {
        eprintln!(
            "{}",
            ui::style_text(
                &format!("Failed to save changes locally: {e}"),
                ui::StyleType::Error
            )
        );
    }
    result
}

async fn execute(
    session: &mut BudgetSession,
    command: AppCommand,
    currency: &str,
    today: NaiveDate,
) -> Result<()> {
    match command {
        AppCommand::Add {
            description,
            amount,
            category,
            date,
            emoji,
        } => {
            let mut fields =
                NewTransaction::new(&description, amount, category, date.unwrap_or(today));
            fields.emoji = emoji;
            let txn = session.add_transaction(fields)?;
            println!("{}", cli::transactions::display_added(&txn, currency));
        }
        AppCommand::Delete { id } => {
            if session.delete_transaction(&id) {
                println!("Deleted transaction {id}");
            } else {
                println!(
                    "{}",
                    ui::style_text(&format!("No transaction with id {id}"), ui::StyleType::Subtle)
                );
            }
        }
        AppCommand::Budget { amount } => {
            session.set_monthly_budget(amount)?;
            println!("Monthly budget set to {}", ui::format_amount(amount, currency));
        }
        AppCommand::List => {
            println!(
                "{}",
                cli::transactions::display_transactions(session.transactions(), currency)
            );
        }
        AppCommand::Status { date } => {
            let day = date.unwrap_or(today);
            println!(
                "{}",
                cli::status::display_daily_status(
                    &session.daily_status(day),
                    day,
                    session.monthly_budget(),
                    currency
                )
            );
        }
        AppCommand::Plan { date } => {
            let day = date.unwrap_or(today);
            if session.monthly_budget() <= 0.0 {
                println!(
                    "{}",
                    ui::style_text("No monthly budget set.", ui::StyleType::Subtle)
                );
            } else {
                println!(
                    "{}",
                    cli::status::display_month_plan(&session.month_plan(day), day, currency)
                );
            }
        }
        AppCommand::Summary => {
            println!(
                "{}",
                cli::summary::display_summary(
                    &session.summary(),
                    &session.category_breakdown(),
                    currency
                )
            );
        }
        AppCommand::Export { format, output } => {
            let content = export::export(session.transactions(), format)?;
            let path =
                output.unwrap_or_else(|| PathBuf::from(export::default_file_name(format, today)));
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            println!(
                "Exported {} transactions to {}",
                session.transactions().len(),
                path.display()
            );
        }
        AppCommand::Sync => {
            if !session.coordinator().has_remote() {
                println!(
                    "{}",
                    ui::style_text(
                        "No remote store configured; data is kept locally only.",
                        ui::StyleType::Subtle
                    )
                );
                return Ok(());
            }
            let status = session.sync_now().await;
            if status == SyncStatus::Synced {
                report_sync_status(&status);
            }
        }
    }
    Ok(())
}

fn report_sync_status(status: &SyncStatus) {
    match status {
        SyncStatus::Error(msg) => {
            warn!("Changes are saved locally but not synced: {}", msg);
            eprintln!(
                "{}",
                ui::style_text(
                    &format!("Sync failed, changes kept locally: {msg}"),
                    ui::StyleType::Error
                )
            );
        }
        SyncStatus::Synced => {
            eprintln!("{}", ui::style_text("Synced", ui::StyleType::Subtle));
        }
        SyncStatus::Idle | SyncStatus::Syncing => {
            debug!(status = %status, "Nothing to sync");
        }
    }
}
