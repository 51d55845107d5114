//! The `resolve` subcommand: map an identifier to a ticker.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use stocklens_lib::{resolve, ResolveError};

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct ResolveArgs {
    /// Ticker symbol or (part of a) company name
    pub identifier: String,
}

pub fn run(args: &ResolveArgs, db: &Path, format: &OutputFormat) -> Result<()> {
    let store = super::open_store(db)?;
    match resolve(&store, &args.identifier) {
        Ok(hit) => {
            match format {
                OutputFormat::Json => output::print_json(&hit.ticker),
                _ => println!("{}  {}", hit.ticker, hit.name.as_deref().unwrap_or("")),
            }
            Ok(())
        }
        Err(ResolveError::Ambiguous { query, candidates }) => {
            eprintln!("{query:?} is ambiguous:");
            match format {
                OutputFormat::Json => output::print_json(&candidates
                    .iter()
                    .map(|c| (c.ticker.clone(), c.name.clone()))
                    .collect::<Vec<_>>()),
                OutputFormat::Csv => output::print_candidates_csv(&candidates)?,
                OutputFormat::Table => output::print_candidates_table(&candidates),
            }
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}
