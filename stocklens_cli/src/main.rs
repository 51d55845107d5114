mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "stocklens")]
#[command(about = "Fetch, store and summarize stock fundamentals and prices")]
struct Cli {
    /// Output format: table, json or csv
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// SQLite database path
    #[arg(long, default_value = "stocklens.db", global = true)]
    db: std::path::PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backfill fundamentals, metadata and prices for tickers
    Seed(commands::seed::SeedArgs),
    /// Incrementally catch stored tickers up to today
    Sync(commands::sync::SyncArgs),
    /// Rebuild summary documents from stored data
    Summarize(commands::summarize::SummarizeArgs),
    /// Resolve a ticker or company name to a single ticker
    Resolve(commands::resolve::ResolveArgs),
    /// Show the full per-ticker view for one or more tickers
    Stocks(commands::stocks::StocksArgs),
    /// Show the annotated daily price history for a ticker
    History(commands::history::HistoryArgs),
    /// Screen stored summaries by valuation and growth
    Screen(commands::screen::ScreenArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stocklens=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        _ => OutputFormat::Table,
    };

    match &cli.command {
        Commands::Seed(args) => commands::seed::run(args, &cli.db).await?,
        Commands::Sync(args) => commands::sync::run(args, &cli.db).await?,
        Commands::Summarize(args) => commands::summarize::run(args, &cli.db)?,
        Commands::Resolve(args) => commands::resolve::run(args, &cli.db, &format)?,
        Commands::Stocks(args) => commands::stocks::run(args, &cli.db, &format)?,
        Commands::History(args) => commands::history::run(args, &cli.db, &format)?,
        Commands::Screen(args) => commands::screen::run(args, &cli.db, &format)?,
    }

    Ok(())
}
