//! The `summarize` subcommand: rebuild summary documents.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use stocklens_lib::{build_summary, parse_ticker_list, rebuild_all};

#[derive(Args)]
pub struct SummarizeArgs {
    /// Restrict to these tickers (comma-separated, default: all stored)
    #[arg(long)]
    pub tickers: Option<String>,
}

pub fn run(args: &SummarizeArgs, db: &Path) -> Result<()> {
    let store = super::open_store(db)?;

    match &args.tickers {
        Some(list) => {
            let tickers = parse_ticker_list(list);
            if tickers.is_empty() {
                bail!("no tickers given");
            }
            for ticker in &tickers {
                match build_summary(&store, ticker)
                    .with_context(|| format!("summarizing {ticker}"))?
                {
                    Some(doc) => {
                        store.put_summary(ticker, &doc)?;
                        println!("{ticker}: rebuilt");
                    }
                    None => println!("{ticker}: skipped (missing prices or fundamentals)"),
                }
            }
        }
        None => {
            let stats = rebuild_all(&store)?;
            println!(
                "{} rebuilt, {} skipped, {} failed",
                stats.built, stats.skipped, stats.failed
            );
            if stats.failed > 0 {
                bail!("{} tickers failed to summarize", stats.failed);
            }
        }
    }
    Ok(())
}
