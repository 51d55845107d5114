//! Per-ticker serving view assembled from stored series and summaries.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::{align, fundamentals, round2};
use crate::error::StockLensError;
use crate::store::Store;
use crate::types::{AnnotatedPrice, QuarterlyRow, SummaryDoc};

/// Everything a caller needs to render one ticker: the latest quote and
/// its context, the annotated daily series, per-quarter rows, and the
/// stored summary metrics.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TickerPayload {
    pub ticker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    pub latest_close: f64,
    pub latest_date: NaiveDate,
    /// Percent change from the previous trading day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_1d: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week52_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week52_low: Option<f64>,
    /// Percent below the 52-week high.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pct_below_high: Option<f64>,
    /// Percent above the 52-week low.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pct_above_low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryDoc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prices: Vec<AnnotatedPrice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quarters: Vec<QuarterlyRow>,
}

/// Assembles the payload for one ticker. `None` when no prices are stored;
/// fundamentals-dependent sections are simply empty without filings.
pub fn build_payload(store: &Store, ticker: &str) -> Result<Option<TickerPayload>, StockLensError> {
    let prices = store.price_points(ticker, None)?;
    let Some(latest) = prices.last() else {
        return Ok(None);
    };
    let records = store.fiscal_records(ticker)?;
    let meta = store.get_metadata(ticker)?;
    let summary = store.get_summary(ticker)?;

    let change_1d = (prices.len() >= 2)
        .then(|| {
            let prev = prices[prices.len() - 2].close;
            (prev != 0.0).then(|| round2((latest.close / prev - 1.0) * 100.0))
        })
        .flatten();

    let year_ago = latest.date.checked_sub_months(Months::new(12));
    let window: Vec<f64> = match year_ago {
        Some(cutoff) => prices
            .iter()
            .filter(|p| p.date >= cutoff)
            .map(|p| p.close)
            .collect(),
        None => Vec::new(),
    };
    let week52_high = window.iter().copied().fold(None, |acc: Option<f64>, c| {
        Some(acc.map_or(c, |a| a.max(c)))
    });
    let week52_low = window.iter().copied().fold(None, |acc: Option<f64>, c| {
        Some(acc.map_or(c, |a| a.min(c)))
    });
    let pct_below_high = week52_high
        .filter(|h| *h != 0.0)
        .map(|h| round2((h - latest.close) / h * 100.0));
    let pct_above_low = week52_low
        .filter(|l| *l != 0.0)
        .map(|l| round2((latest.close - l) / l * 100.0));

    let labeled = fundamentals::labeled_quarter_points(&records);
    let quarters = align::quarter_rows(&labeled, &prices);
    let ttm = {
        let points: Vec<_> = labeled.iter().map(|(_, q)| *q).collect();
        fundamentals::ttm_points(&points)
    };
    let annotated = align::attach_ttm(&prices, &ttm);

    Ok(Some(TickerPayload {
        ticker: ticker.to_uppercase(),
        name: meta.as_ref().and_then(|m| m.name.clone()),
        sector: meta.as_ref().and_then(|m| m.sector.clone()),
        latest_close: latest.close,
        latest_date: latest.date,
        change_1d,
        week52_high,
        week52_low,
        pct_below_high,
        pct_above_low,
        summary,
        prices: annotated,
        quarters,
    }))
}

/// The annotated daily series, restricted to the trailing `days` calendar
/// days when given.
pub fn history(
    store: &Store,
    ticker: &str,
    days: Option<u32>,
) -> Result<Vec<AnnotatedPrice>, StockLensError> {
    let Some(payload) = build_payload(store, ticker)? else {
        return Ok(Vec::new());
    };
    let mut series = payload.prices;
    if let Some(days) = days {
        if let Some(cutoff) = payload
            .latest_date
            .checked_sub_days(chrono::Days::new(u64::from(days)))
        {
            series.retain(|p| p.date > cutoff);
        }
    }
    Ok(series)
}
