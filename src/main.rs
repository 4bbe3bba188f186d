//! Finvista main entry point
//!
//! Thin presentation consumer of the core pipeline: ingests one statement
//! file and prints the aggregate reports as JSON.

use clap::Parser;
use finvista_config::Config;
use finvista_core::{TransactionKind, TransactionStore};
use finvista_parser::{DefaultStatementSource, StatementSource};
use std::path::PathBuf;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "finvista")]
#[command(version = "0.1.0")]
#[command(about = "Personal bank statement analytics", long_about = None)]
struct Args {
    /// Statement CSV file to ingest
    file: PathBuf,

    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Restrict reports to one calendar year
    #[arg(long)]
    year: Option<i32>,

    /// Restrict reports to the given account (repeatable)
    #[arg(long = "account")]
    accounts: Vec<String>,

    /// Restrict reports by sign: all, income, expense
    #[arg(long, default_value = "all")]
    kind: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = if args.config.exists() {
        Config::load(args.config.clone())?
    } else {
        Config::default()
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if !args.config.exists() {
        log::debug!("no config at {}, using defaults", args.config.display());
    }

    let kind: TransactionKind = args.kind.parse().map_err(anyhow::Error::msg)?;

    let rt = Runtime::new()?;
    let source = DefaultStatementSource::new(config.ingest.max_file_bytes);
    let outcome = rt.block_on(source.parse_file(args.file.clone()))?;

    let mut store = TransactionStore::new();
    let count = store.ingest(outcome)?;

    if let Some(year) = args.year {
        store.set_year(Some(year));
    }
    if !args.accounts.is_empty() {
        store.set_accounts(args.accounts.clone());
    }
    store.set_kind(kind);

    let display = &config.display;
    let summary = serde_json::json!({
        "transactions": count,
        "filtered": store.filtered().len(),
        "accounts": store.unique_accounts(),
        "years": store.available_years(),
        "kpis": store.kpis(),
        "account_balances": store.account_balances(),
        "monthly_balance": store.monthly_balance(display.balance_months),
        "monthly_flows": store.monthly_flows(display.flow_months),
        "top_categories": store.category_totals(display.top_categories),
        "category_distribution": store.category_distribution(display.distribution_slices),
        "category_by_year": store.category_by_year(&[], display.year_categories),
        "category_trend": store.category_trend(&[], display.trend_categories, display.trend_months),
        "daily_expenses": store.daily_expenses(display.heatmap_years),
        "subcategories": store.subcategory_breakdown(display.breakdown_slices),
        "yearly_comparison": store.yearly_comparison(),
    });

    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
