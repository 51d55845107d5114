//! Balance-sheet and income ratios from the most recent filing.

use crate::core::round2;
use crate::types::{FiscalRecord, TickerMeta};

/// The filing to base point-in-time ratios on: latest filing date wins,
/// later input position on a tie; undated filings lose to dated ones.
pub fn latest_record(records: &[FiscalRecord]) -> Option<&FiscalRecord> {
    records.iter().enumerate().max_by(|(ai, a), (bi, b)| {
        a.filing_date
            .cmp(&b.filing_date)
            .then(ai.cmp(bi))
    })
    .map(|(_, r)| r)
}

/// Return on assets, percent. `None` without net income or nonzero assets.
pub fn roa(record: &FiscalRecord) -> Option<f64> {
    ratio_pct(record.net_income, record.assets)
}

/// Return on equity, percent.
pub fn roe(record: &FiscalRecord) -> Option<f64> {
    ratio_pct(record.net_income, record.equity)
}

/// Total liabilities over shareholder equity. `None` when equity is not
/// positive; negative book equity makes the ratio meaningless.
pub fn debt_to_equity(record: &FiscalRecord) -> Option<f64> {
    let equity = record.equity?;
    if equity <= 0.0 {
        return None;
    }
    Some(round2(record.liabilities? / equity))
}

/// Operating margin, percent of revenues.
pub fn operating_margin(record: &FiscalRecord) -> Option<f64> {
    ratio_pct(record.operating_income, record.revenues)
}

/// Net margin, percent of revenues.
pub fn net_margin(record: &FiscalRecord) -> Option<f64> {
    ratio_pct(record.net_income, record.revenues)
}

/// Market capitalization from the latest close. Shares come from the
/// filing (diluted preferred) with the catalog's outstanding count as a
/// fallback for companies that do not report average shares.
pub fn market_cap(
    record: &FiscalRecord,
    meta: Option<&TickerMeta>,
    close: f64,
) -> Option<f64> {
    let shares = record
        .chosen_shares()
        .or_else(|| meta.and_then(TickerMeta::shares_outstanding))?;
    if shares <= 0.0 {
        return None;
    }
    Some(round2(shares * close))
}

fn ratio_pct(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let d = denominator?;
    if d <= 0.0 {
        return None;
    }
    Some(round2(numerator? / d * 100.0))
}
