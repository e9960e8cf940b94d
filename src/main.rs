use anyhow::Result;
use birr::core::Category;
use birr::core::log::init_logging;
use birr::core::transaction::parse_date;
use birr::export::ExportFormat;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for birr::AppCommand {
    fn from(cmd: Commands) -> birr::AppCommand {
        match cmd {
            Commands::Add {
                description,
                amount,
                category,
                date,
                emoji,
            } => birr::AppCommand::Add {
                description,
                amount,
                category,
                date,
                emoji,
            },
            Commands::Delete { id } => birr::AppCommand::Delete { id },
            Commands::Budget { amount } => birr::AppCommand::Budget { amount },
            Commands::List => birr::AppCommand::List,
            Commands::Status { date } => birr::AppCommand::Status { date },
            Commands::Plan { date } => birr::AppCommand::Plan { date },
            Commands::Summary => birr::AppCommand::Summary,
            Commands::Export { format, output } => birr::AppCommand::Export { format, output },
            Commands::Sync => birr::AppCommand::Sync,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Record a new expense
    Add {
        description: String,
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        /// Category name, e.g. "food", "transport", "Health & Fitness"
        #[arg(short = 'k', long, default_value = "Other")]
        category: Category,
        /// Expense date (YYYY-MM-DD), defaults to today
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Override the category emoji
        #[arg(short, long)]
        emoji: Option<String>,
    },
    /// Delete an expense by id
    Delete { id: String },
    /// Set the monthly budget
    Budget {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },
    /// List all expenses, newest first
    List,
    /// Show the daily limit and today's spending
    Status {
        /// Day to evaluate (YYYY-MM-DD), defaults to today
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Show the per-day limits for a month
    Plan {
        /// Any day in the month to plan (YYYY-MM-DD), defaults to today
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Display spending totals and the category breakdown
    Summary,
    /// Export expenses as JSON or CSV
    Export {
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Output file, defaults to budget-export-YYYY-MM-DD.<ext>
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Push the current state to the remote store now
    Sync,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => birr::cli::setup::setup(),
        Some(cmd) => birr::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
