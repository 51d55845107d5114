//! Building and rebuilding per-ticker summary documents.

use tracing::{info, warn};

use crate::core::{fundamentals, growth, ratios, round2};
use crate::error::StockLensError;
use crate::store::Store;
use crate::types::SummaryDoc;

/// Counts from a [`rebuild_all`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebuildStats {
    pub built: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Derives the summary document for one ticker from stored fundamentals
/// and prices. Returns `None` when either series is empty; every metric
/// inside the document is individually optional and simply omitted when
/// its inputs are missing.
pub fn build_summary(store: &Store, ticker: &str) -> Result<Option<SummaryDoc>, StockLensError> {
    let records = store.fiscal_records(ticker)?;
    let prices = store.price_points(ticker, None)?;
    if records.is_empty() || prices.is_empty() {
        return Ok(None);
    }
    let meta = store.get_metadata(ticker)?;

    let quarters = fundamentals::quarter_points(&records);
    let ttm = fundamentals::ttm_points(&quarters);

    let latest_close = prices.last().map(|p| p.close);
    let ttm_pe_ratio = match (latest_close, ttm.last()) {
        (Some(close), Some(t)) if t.eps_ttm != 0.0 => Some(round2(close / t.eps_ttm)),
        _ => None,
    };

    let mut doc = SummaryDoc {
        ticker: ticker.to_uppercase(),
        ttm_pe_ratio,
        price_growth_1y: growth::price_growth(&prices, 1),
        price_growth_3y: growth::price_growth(&prices, 3),
        price_growth_5y: growth::price_growth(&prices, 5),
        revenue_growth_1y: growth::revenue_growth(&records, 1),
        revenue_growth_3y: growth::revenue_growth(&records, 3),
        revenue_growth_5y: growth::revenue_growth(&records, 5),
        price_history: growth::price_trend_5y(&prices),
        revenue_history: growth::annual_revenue_history(&records, 5),
        sector: meta.as_ref().and_then(|m| m.sector.clone()),
        ..Default::default()
    };

    if let Some(latest) = ratios::latest_record(&records) {
        doc.roa = ratios::roa(latest);
        doc.roe = ratios::roe(latest);
        doc.debt_to_equity = ratios::debt_to_equity(latest);
        doc.operating_margin = ratios::operating_margin(latest);
        doc.net_margin = ratios::net_margin(latest);
        if let Some(close) = latest_close {
            doc.market_cap = ratios::market_cap(latest, meta.as_ref(), close);
        }
    }

    Ok(Some(doc))
}

/// Rebuilds summaries for every ticker with stored fundamentals, replacing
/// each document wholesale. One bad ticker does not stop the pass.
pub fn rebuild_all(store: &Store) -> Result<RebuildStats, StockLensError> {
    let tickers = store.distinct_fundamentals_tickers()?;
    let mut stats = RebuildStats::default();
    for ticker in tickers {
        match build_summary(store, &ticker) {
            Ok(Some(doc)) => {
                store.put_summary(&ticker, &doc)?;
                stats.built += 1;
            }
            Ok(None) => {
                stats.skipped += 1;
            }
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "summary rebuild failed");
                stats.failed += 1;
            }
        }
    }
    info!(
        built = stats.built,
        skipped = stats.skipped,
        failed = stats.failed,
        "summary rebuild complete"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::types::{FiscalPeriod, FiscalRecord, PricePoint};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(year: i32, period: FiscalPeriod, eps: f64, revenues: f64) -> FiscalRecord {
        let (month, day) = match period {
            FiscalPeriod::Q1 => (3, 31),
            FiscalPeriod::Q2 => (6, 30),
            FiscalPeriod::Q3 => (9, 30),
            _ => (12, 31),
        };
        FiscalRecord {
            ticker: "TEST".to_string(),
            company_name: None,
            fiscal_year: year,
            fiscal_period: period,
            filing_date: Some(date(year, month, day) + chrono::Days::new(30)),
            start_date: None,
            end_date: date(year, month, day),
            revenues: Some(revenues),
            operating_income: Some(revenues * 0.25),
            net_income: Some(revenues * 0.1),
            basic_eps: None,
            diluted_eps: Some(eps),
            assets: Some(4000.0),
            liabilities: Some(2400.0),
            equity: Some(1600.0),
            cash_flow: None,
            basic_shares: None,
            diluted_shares: Some(100.0),
        }
    }

    fn point(d: NaiveDate, close: f64) -> PricePoint {
        PricePoint {
            ticker: "TEST".to_string(),
            date: d,
            open: None,
            high: None,
            low: None,
            close,
            adj_close: None,
            volume: 0,
            dividend_yield: None,
            pe_ratio: None,
        }
    }

    fn seeded_store() -> Store {
        let mut store = Store::open_in_memory().unwrap();
        store.init().unwrap();
        store
            .upsert_fiscal_records(&[
                record(2023, FiscalPeriod::Q1, 1.0, 100.0),
                record(2023, FiscalPeriod::Q2, 1.1, 110.0),
                record(2023, FiscalPeriod::Q3, 0.9, 90.0),
                record(2023, FiscalPeriod::FY, 4.3, 400.0),
            ])
            .unwrap();
        store
            .upsert_price_points(&[
                point(date(2023, 12, 29), 43.0),
                point(date(2024, 1, 2), 86.0),
            ])
            .unwrap();
        store
    }

    #[test]
    fn builds_summary_with_ttm_pe() {
        let store = seeded_store();
        let doc = build_summary(&store, "TEST").unwrap().unwrap();
        assert_eq!(doc.ticker, "TEST");
        // Latest close 86.0 over TTM EPS 4.3.
        assert_eq!(doc.ttm_pe_ratio, Some(20.0));
        assert_eq!(doc.roa, Some(1.0));
        assert_eq!(doc.net_margin, Some(10.0));
        assert_eq!(doc.debt_to_equity, Some(1.5));
        assert_eq!(doc.market_cap, Some(8600.0));
        assert_eq!(doc.revenue_history.len(), 1);
        assert_eq!(doc.revenue_history[0].revenue, 400.0);
    }

    #[test]
    fn missing_series_yields_none() {
        let store = Store::open_in_memory().unwrap();
        store.init().unwrap();
        assert!(build_summary(&store, "TEST").unwrap().is_none());
    }

    #[test]
    fn rebuild_is_idempotent() {
        let store = seeded_store();
        let first = rebuild_all(&store).unwrap();
        assert_eq!(
            first,
            RebuildStats {
                built: 1,
                skipped: 0,
                failed: 0
            }
        );
        let doc_a = store.get_summary("TEST").unwrap().unwrap();
        let second = rebuild_all(&store).unwrap();
        assert_eq!(second.built, 1);
        let doc_b = store.get_summary("TEST").unwrap().unwrap();
        assert_eq!(
            serde_json::to_string(&doc_a).unwrap(),
            serde_json::to_string(&doc_b).unwrap()
        );
    }

    #[test]
    fn rebuild_skips_tickers_without_prices() {
        let mut store = Store::open_in_memory().unwrap();
        store.init().unwrap();
        store
            .upsert_fiscal_records(&[record(2023, FiscalPeriod::FY, 4.3, 400.0)])
            .unwrap();
        let stats = rebuild_all(&store).unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.built, 0);
    }
}
