//! The `sync` subcommand: incremental catch-up for stored tickers.

use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;
use stocklens_lib::{parse_ticker_list, Ingestor};

#[derive(Args)]
pub struct SyncArgs {
    /// Restrict to these tickers (comma-separated, default: all stored)
    #[arg(long)]
    pub tickers: Option<String>,
}

pub async fn run(args: &SyncArgs, db: &Path) -> Result<()> {
    let mut store = super::open_store(db)?;
    let tickers = match &args.tickers {
        Some(list) => parse_ticker_list(list),
        None => store.distinct_fundamentals_tickers()?,
    };
    if tickers.is_empty() {
        bail!("nothing to sync; seed some tickers first");
    }

    let ingestor = Ingestor::new(super::api_client()?)?;
    let mut failures = 0usize;
    for ticker in &tickers {
        match ingestor.sync_ticker(&mut store, ticker).await {
            Ok(stats) => println!(
                "{ticker}: {} filings, {} prices",
                stats.fundamentals, stats.prices
            ),
            Err(e) => {
                failures += 1;
                eprintln!("{ticker}: {e}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} tickers failed", tickers.len());
    }
    Ok(())
}
