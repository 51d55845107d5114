//! Aligning sparse quarterly fundamentals onto dense daily prices.

use chrono::{Days, NaiveDate};

use crate::core::round2;
use crate::types::{AnnotatedPrice, PricePoint, QuarterPoint, QuarterlyRow, TtmPoint};

/// Annotates a daily price series with TTM EPS and the resulting P/E.
///
/// Both inputs must be in ascending date order. Each TTM point is attached
/// to exactly one price row, the first trading day at or after the TTM
/// date; every other row passes through with no annotation. P/E is only
/// computed when the TTM EPS is nonzero. Single pass over both series.
pub fn attach_ttm(prices: &[PricePoint], ttm: &[TtmPoint]) -> Vec<AnnotatedPrice> {
    let mut out = Vec::with_capacity(prices.len());
    let mut ttm_iter = ttm.iter().peekable();
    for price in prices {
        let mut row = AnnotatedPrice {
            date: price.date,
            close: price.close,
            eps: None,
            pe: None,
        };
        if let Some(point) = ttm_iter.peek() {
            if point.date <= price.date {
                row.eps = Some(point.eps_ttm);
                if point.eps_ttm != 0.0 {
                    row.pe = Some(round2(price.close / point.eps_ttm));
                }
                ttm_iter.next();
                // Several TTM dates can fall inside one price gap; only the
                // newest one lands on this row.
                while let Some(next) = ttm_iter.peek() {
                    if next.date > price.date {
                        break;
                    }
                    row.eps = Some(next.eps_ttm);
                    row.pe = if next.eps_ttm != 0.0 {
                        Some(round2(price.close / next.eps_ttm))
                    } else {
                        None
                    };
                    ttm_iter.next();
                }
            }
        }
        out.push(row);
    }
    out
}

/// Close on the last trading day at or before `date`, considering at most
/// seven calendar dates (`date` and the six before it). `prices` must be
/// sorted ascending by date.
pub fn price_on_or_before(prices: &[PricePoint], date: NaiveDate) -> Option<f64> {
    let floor = date.checked_sub_days(Days::new(6))?;
    let idx = prices.partition_point(|p| p.date <= date);
    let candidate = prices[..idx].last()?;
    (candidate.date >= floor).then_some(candidate.close)
}

/// Builds labelled quarterly rows from the reconstructed stream, attaching
/// the quarter-end price and, from the fourth quarter onward, the rolling
/// TTM EPS and P/E.
pub fn quarter_rows(
    quarters: &[(String, QuarterPoint)],
    prices: &[PricePoint],
) -> Vec<QuarterlyRow> {
    let mut rows: Vec<QuarterlyRow> = Vec::with_capacity(quarters.len());
    for (i, (label, quarter)) in quarters.iter().enumerate() {
        let price = price_on_or_before(prices, quarter.date);
        let ttm_eps = (i >= 3).then(|| {
            let total: f64 = quarters[i - 3..=i].iter().map(|(_, q)| q.eps).sum();
            round2(total)
        });
        let pe_ratio = match (price, ttm_eps) {
            (Some(p), Some(t)) if t != 0.0 => Some(round2(p / t)),
            _ => None,
        };
        rows.push(QuarterlyRow {
            quarter: label.clone(),
            date: quarter.date,
            eps: round2(quarter.eps),
            price,
            ttm_eps,
            pe_ratio,
        });
    }
    rows
}
