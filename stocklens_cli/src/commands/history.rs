//! The `history` subcommand: annotated daily series for one ticker.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use stocklens_lib::{history, resolve};

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct HistoryArgs {
    /// Ticker or company name
    pub identifier: String,

    /// Only the trailing N calendar days
    #[arg(long)]
    pub days: Option<u32>,
}

pub fn run(args: &HistoryArgs, db: &Path, format: &OutputFormat) -> Result<()> {
    let store = super::open_store(db)?;
    let hit = resolve(&store, &args.identifier)
        .with_context(|| format!("resolving {:?}", args.identifier))?;

    let series = history(&store, &hit.ticker, args.days)?;
    if series.is_empty() {
        bail!("no stored prices for {}; run seed first", hit.ticker);
    }

    match format {
        OutputFormat::Json => output::print_json(&series),
        OutputFormat::Csv => output::print_history_csv(&series)?,
        OutputFormat::Table => output::print_history_table(&series),
    }
    Ok(())
}
