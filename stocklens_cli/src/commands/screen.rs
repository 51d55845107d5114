//! The `screen` subcommand: filter stored summaries.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use stocklens_lib::ScreenFilter;

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct ScreenArgs {
    /// Maximum TTM P/E
    #[arg(long)]
    pub max_pe: Option<f64>,

    /// Minimum annualized price growth over five years, percent
    #[arg(long)]
    pub min_price_growth: Option<f64>,

    /// Minimum annualized revenue growth over five years, percent
    #[arg(long)]
    pub min_revenue_growth: Option<f64>,

    /// Restrict to one sector label
    #[arg(long)]
    pub sector: Option<String>,
}

pub fn run(args: &ScreenArgs, db: &Path, format: &OutputFormat) -> Result<()> {
    let store = super::open_store(db)?;
    let filter = ScreenFilter {
        max_pe: args.max_pe,
        min_price_growth_5y: args.min_price_growth,
        min_revenue_growth_5y: args.min_revenue_growth,
        sector: args.sector.clone(),
    };
    let docs = store.screen(&filter)?;
    if docs.is_empty() {
        println!("no matches");
        return Ok(());
    }

    match format {
        OutputFormat::Json => output::print_json(&docs),
        OutputFormat::Csv => output::print_summaries_csv(&docs)?,
        OutputFormat::Table => output::print_summaries_table(&docs),
    }
    Ok(())
}
