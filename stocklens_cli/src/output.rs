use anyhow::Result;
use serde::Serialize;
use stocklens_lib::types::{AnnotatedPrice, QuarterlyRow, SummaryDoc};
use stocklens_lib::{Candidate, TickerPayload};
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Tabled, Serialize)]
struct SummaryRow {
    #[tabled(rename = "Ticker")]
    #[serde(rename = "Ticker")]
    ticker: String,
    #[tabled(rename = "P/E (TTM)")]
    #[serde(rename = "P/E (TTM)")]
    pe: String,
    #[tabled(rename = "Price 5y%")]
    #[serde(rename = "Price 5y%")]
    price_growth_5y: String,
    #[tabled(rename = "Revenue 5y%")]
    #[serde(rename = "Revenue 5y%")]
    revenue_growth_5y: String,
    #[tabled(rename = "Net Margin%")]
    #[serde(rename = "Net Margin%")]
    net_margin: String,
    #[tabled(rename = "Market Cap")]
    #[serde(rename = "Market Cap")]
    market_cap: String,
    #[tabled(rename = "Sector")]
    #[serde(rename = "Sector")]
    sector: String,
}

#[derive(Tabled, Serialize)]
struct CandidateRow {
    #[tabled(rename = "Ticker")]
    #[serde(rename = "Ticker")]
    ticker: String,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Active")]
    #[serde(rename = "Active")]
    active: String,
}

#[derive(Tabled, Serialize)]
struct HistoryRow {
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    date: String,
    #[tabled(rename = "Close")]
    #[serde(rename = "Close")]
    close: String,
    #[tabled(rename = "EPS (TTM)")]
    #[serde(rename = "EPS (TTM)")]
    eps: String,
    #[tabled(rename = "P/E")]
    #[serde(rename = "P/E")]
    pe: String,
}

#[derive(Tabled, Serialize)]
struct QuarterRow {
    #[tabled(rename = "Quarter")]
    #[serde(rename = "Quarter")]
    quarter: String,
    #[tabled(rename = "End")]
    #[serde(rename = "End")]
    end: String,
    #[tabled(rename = "EPS")]
    #[serde(rename = "EPS")]
    eps: String,
    #[tabled(rename = "Price")]
    #[serde(rename = "Price")]
    price: String,
    #[tabled(rename = "EPS (TTM)")]
    #[serde(rename = "EPS (TTM)")]
    ttm_eps: String,
    #[tabled(rename = "P/E")]
    #[serde(rename = "P/E")]
    pe: String,
}

// -- Row builders --

fn opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

fn format_cap(value: f64) -> String {
    if value >= 1e12 {
        format!("${:.1}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.1}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.1}M", value / 1e6)
    } else {
        format!("${value:.0}")
    }
}

fn build_summary_rows(docs: &[SummaryDoc]) -> Vec<SummaryRow> {
    docs.iter()
        .map(|d| SummaryRow {
            ticker: d.ticker.clone(),
            pe: opt(d.ttm_pe_ratio),
            price_growth_5y: opt(d.price_growth_5y),
            revenue_growth_5y: opt(d.revenue_growth_5y),
            net_margin: opt(d.net_margin),
            market_cap: d.market_cap.map(format_cap).unwrap_or_default(),
            sector: d.sector.clone().unwrap_or_default(),
        })
        .collect()
}

fn build_candidate_rows(candidates: &[Candidate]) -> Vec<CandidateRow> {
    candidates
        .iter()
        .map(|c| CandidateRow {
            ticker: c.ticker.clone(),
            name: c.name.clone().unwrap_or_default(),
            active: if c.active { "yes" } else { "no" }.to_string(),
        })
        .collect()
}

fn build_history_rows(series: &[AnnotatedPrice]) -> Vec<HistoryRow> {
    series
        .iter()
        .map(|p| HistoryRow {
            date: p.date.to_string(),
            close: format!("{:.2}", p.close),
            eps: opt(p.eps),
            pe: opt(p.pe),
        })
        .collect()
}

fn build_quarter_rows(quarters: &[QuarterlyRow]) -> Vec<QuarterRow> {
    quarters
        .iter()
        .map(|q| QuarterRow {
            quarter: q.quarter.clone(),
            end: q.date.to_string(),
            eps: format!("{:.2}", q.eps),
            price: opt(q.price),
            ttm_eps: opt(q.ttm_eps),
            pe: opt(q.pe_ratio),
        })
        .collect()
}

// -- Table output --

pub fn print_summaries_table(docs: &[SummaryDoc]) {
    println!("{}", Table::new(build_summary_rows(docs)));
}

pub fn print_candidates_table(candidates: &[Candidate]) {
    println!("{}", Table::new(build_candidate_rows(candidates)));
}

pub fn print_history_table(series: &[AnnotatedPrice]) {
    println!("{}", Table::new(build_history_rows(series)));
}

pub fn print_quarters_table(quarters: &[QuarterlyRow]) {
    println!("{}", Table::new(build_quarter_rows(quarters)));
}

pub fn print_payload_table(payload: &TickerPayload) {
    let name = payload.name.as_deref().unwrap_or("");
    let sector = payload.sector.as_deref().unwrap_or("-");
    println!("{} {} [{}]", payload.ticker, name, sector);
    println!(
        "  close {:.2} on {}  1d {}%  52w high {} low {}",
        payload.latest_close,
        payload.latest_date,
        opt(payload.change_1d),
        opt(payload.week52_high),
        opt(payload.week52_low),
    );
    if let Some(summary) = &payload.summary {
        print_summaries_table(std::slice::from_ref(summary));
    }
    if !payload.quarters.is_empty() {
        print_quarters_table(&payload.quarters);
    }
}

// -- CSV output --

pub fn print_summaries_csv(docs: &[SummaryDoc]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_summary_rows(docs) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_candidates_csv(candidates: &[Candidate]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_candidate_rows(candidates) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_history_csv(series: &[AnnotatedPrice]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_history_rows(series) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}
