//! The `seed` subcommand: full backfill for a set of tickers.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use stocklens_lib::{parse_ticker_list, Ingestor};

#[derive(Args)]
pub struct SeedArgs {
    /// Comma-separated tickers, or a path to a file with one per line
    pub tickers: String,

    /// Earliest filing/price date to fetch (YYYY-MM-DD, default six years back)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Latest date to fetch (YYYY-MM-DD, default today)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

/// Ticker argument is either a literal comma list or a file of symbols.
pub(crate) fn resolve_tickers(arg: &str) -> Result<Vec<String>> {
    let path = Path::new(arg);
    let tickers = if path.is_file() {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        parse_ticker_list(&content.lines().collect::<Vec<_>>().join(","))
    } else {
        parse_ticker_list(arg)
    };
    if tickers.is_empty() {
        bail!("no tickers given");
    }
    Ok(tickers)
}

pub async fn run(args: &SeedArgs, db: &Path) -> Result<()> {
    let tickers = resolve_tickers(&args.tickers)?;
    let mut store = super::open_store(db)?;
    let ingestor = Ingestor::new(super::api_client()?)?;

    let bar = ProgressBar::new(tickers.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}").expect("static template"),
    );

    let mut failures = 0usize;
    for ticker in &tickers {
        bar.set_message(ticker.clone());
        match ingestor.seed_ticker(&mut store, ticker, args.start, args.end).await {
            Ok(stats) => {
                bar.println(format!(
                    "{ticker}: {} filings, {} prices",
                    stats.fundamentals, stats.prices
                ));
            }
            Err(e) => {
                failures += 1;
                bar.println(format!("{ticker}: {e}"));
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if failures > 0 {
        bail!("{failures} of {} tickers failed", tickers.len());
    }
    Ok(())
}
