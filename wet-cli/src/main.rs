//! WET - Weekly Expense Tracker
//!
//! Usage:
//!   wet setup                        Interactive first-run setup
//!   wet add --direction out ...      Record a transaction
//!   wet summary                      Totals, net worth and breakdowns
//!   wet budget show --week 10        Budget for a period
//!   wet export --out FILE            Write all transactions as CSV

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use wet_core::Direction;

mod commands;
mod config;
mod setup;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "wet",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("WET_BUILD_SHA"), ")"),
    about = "Weekly expense tracker"
)]
struct Cli {
    /// Directory holding the JSON data files (default: ~/.wet)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: ~/.wet/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive setup: opening balance, currency and timezone
    Setup,

    /// Record a money-in or money-out transaction
    Add(AddArgs),

    /// Show the most recent transactions
    List {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Totals, net worth, and category breakdowns
    Summary {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Money in and out per month
    Cashflow {
        /// Show all twelve months of this year
        #[arg(long)]
        year: Option<i32>,
    },

    /// Write all transactions to CSV
    Export {
        /// Output file (default: <data-dir>/transactions_export.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Append records from a JSON or CSV file
    Import {
        /// File to import (default: <data-dir>/transactions.json)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Weekly budgets
    Budget {
        #[command(subcommand)]
        command: BudgetCommand,
    },

    /// Expense and income categories
    Categories {
        #[command(subcommand)]
        command: CategoriesCommand,
    },

    /// Config file management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug)]
struct AddArgs {
    /// "in" / "money in" / "debit", or "out" / "money out" / "credit"
    #[arg(long)]
    direction: Direction,

    #[arg(long)]
    amount: f64,

    #[arg(long)]
    category: String,

    /// Required for money out
    #[arg(long)]
    subcategory: Option<String>,

    /// Cash, M-Pesa, Bank Transfer, Credit Card, Debit Card, Other (required for money out)
    #[arg(long)]
    payment_method: Option<String>,

    /// What the money was for or where it came from
    #[arg(long)]
    description: String,

    #[arg(long, default_value_t = 0.0)]
    fees: f64,

    /// YYYY-MM-DD (default: today)
    #[arg(long)]
    date: Option<NaiveDate>,
}

/// Selects a budget period; omitted parts default to the current one.
#[derive(Args, Debug, Clone, Default)]
struct PeriodArgs {
    /// Month name or number
    #[arg(long)]
    month: Option<String>,

    /// ISO week number
    #[arg(long)]
    week: Option<u32>,

    #[arg(long)]
    year: Option<i32>,
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    /// Show items and allocation progress
    Show {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Set the overall budget ceiling
    SetOverall {
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(long)]
        amount: f64,
    },

    /// Add a budget item
    Add {
        #[command(flatten)]
        period: PeriodArgs,
        /// Inferred from --subcategory when omitted
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "")]
        subcategory: String,
        #[arg(long)]
        amount: f64,
    },

    /// Replace the item at INDEX (as numbered by `budget show`)
    Edit {
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(long)]
        index: usize,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        subcategory: String,
        #[arg(long)]
        amount: f64,
    },

    /// Remove the item at INDEX
    Remove {
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(long)]
        index: usize,
    },

    /// Remove every item (the overall budget is kept)
    Clear {
        #[command(flatten)]
        period: PeriodArgs,
    },
}

#[derive(Subcommand, Debug)]
enum CategoriesCommand {
    /// List expense categories with subcategories, then income categories
    List,

    /// Add an expense category
    Add { name: String },

    /// Add a subcategory to an expense category
    AddSubcategory {
        #[arg(long)]
        category: String,
        #[arg(long)]
        name: String,
    },

    /// Add an income category
    AddIncome { name: String },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,

    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();

    let config_path = match cli.config {
        Some(p) => p,
        None => config::default_config_path()?,
    };
    let cfg = config::load_config(&config_path)?;

    let data_dir = cli.data_dir.as_deref();
    let open = |cfg| commands::App::open(cfg, data_dir);

    match cli.command {
        Command::Setup => commands::cmd_setup(&config_path, cfg, data_dir),
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(&config_path),
            ConfigCommand::Show => commands::cmd_config_show(&config_path, &cfg),
        },
        Command::Add(args) => open(cfg)?.cmd_add(args),
        Command::List { limit } => open(cfg)?.cmd_list(limit),
        Command::Summary { json } => open(cfg)?.cmd_summary(json),
        Command::Cashflow { year } => open(cfg)?.cmd_cashflow(year),
        Command::Export { out } => open(cfg)?.cmd_export(out.as_deref()),
        Command::Import { file } => open(cfg)?.cmd_import(file),
        Command::Budget { command } => open(cfg)?.cmd_budget(command),
        Command::Categories { command } => open(cfg)?.cmd_categories(command),
    }
}
