//! The `stocks` subcommand: full per-ticker view.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use stocklens_lib::{build_payload, resolve};

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct StocksArgs {
    /// Tickers or company names
    #[arg(required = true)]
    pub identifiers: Vec<String>,
}

pub fn run(args: &StocksArgs, db: &Path, format: &OutputFormat) -> Result<()> {
    let store = super::open_store(db)?;

    let mut payloads = Vec::new();
    for identifier in &args.identifiers {
        let hit = resolve(&store, identifier)
            .with_context(|| format!("resolving {identifier:?}"))?;
        match build_payload(&store, &hit.ticker)? {
            Some(payload) => payloads.push(payload),
            None => bail!("no stored prices for {}; run seed first", hit.ticker),
        }
    }

    match format {
        OutputFormat::Json => output::print_json(&payloads),
        OutputFormat::Csv => {
            let docs: Vec<_> = payloads.iter().filter_map(|p| p.summary.clone()).collect();
            output::print_summaries_csv(&docs)?;
        }
        OutputFormat::Table => {
            for payload in &payloads {
                output::print_payload_table(payload);
            }
        }
    }
    Ok(())
}
