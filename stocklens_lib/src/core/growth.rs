//! Growth metrics over price and revenue history.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::core::{round2, round4};
use crate::types::{AnnualRevenue, FiscalRecord, PricePoint};

/// Compound annual growth rate as a percentage, rounded so that the
/// fractional rate carries four decimals. Defined only for positive start,
/// end and span; anything else yields `None` rather than a nonsense value.
pub fn cagr(start: f64, end: f64, years: f64) -> Option<f64> {
    if start <= 0.0 || end <= 0.0 || years <= 0.0 {
        return None;
    }
    let rate = (end / start).powf(1.0 / years) - 1.0;
    Some(round4(rate) * 100.0)
}

/// `date` shifted back by whole years, calendar-aware (Feb 29 clamps).
fn years_before(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    date.checked_sub_months(Months::new(12 * years))
}

/// The close from roughly `years` ago: scanning backward from the latest
/// point, the first one dated at or before `latest - years`. `prices` must
/// be sorted ascending.
pub fn price_years_ago(prices: &[PricePoint], years: u32) -> Option<&PricePoint> {
    let latest = prices.last()?;
    let cutoff = years_before(latest.date, years)?;
    prices.iter().rev().find(|p| p.date <= cutoff)
}

/// Annualized price growth over `years`, or `None` when the history does
/// not reach back far enough.
pub fn price_growth(prices: &[PricePoint], years: u32) -> Option<f64> {
    let latest = prices.last()?;
    let base = price_years_ago(prices, years)?;
    cagr(base.close, latest.close, f64::from(years))
}

/// Annualized revenue growth over `years`, comparing the most recent
/// revenue-bearing filing against the same fiscal period `years` earlier.
/// Only the single most recent candidate is considered; if its counterpart
/// is missing or lacks revenues, the metric is unavailable.
pub fn revenue_growth(records: &[FiscalRecord], years: u32) -> Option<f64> {
    let by_key = super::fundamentals::dedup_records(records);
    let (&(year, period), newest) = by_key
        .iter()
        .rev()
        .find(|(_, r)| r.revenues.is_some())?;
    let earlier = by_key.get(&(year - years as i32, period))?;
    cagr(earlier.revenues?, newest.revenues?, f64::from(years))
}

/// Last day of the given month.
fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    next.checked_sub_days(Days::new(1))
}

/// Quarter-end closes over the trailing five years, oldest first.
///
/// Samples the last trading day of each March/June/September/December,
/// stepping back from the calendar month end until a close is found or the
/// 25th is passed. Anchored to the latest price date rather than the wall
/// clock, so rebuilding against unchanged data yields the same trend.
pub fn price_trend_5y(prices: &[PricePoint]) -> Vec<f64> {
    let Some(latest) = prices.last() else {
        return Vec::new();
    };
    let Some(start) = years_before(latest.date, 5) else {
        return Vec::new();
    };
    let by_date: BTreeMap<NaiveDate, f64> =
        prices.iter().map(|p| (p.date, p.close)).collect();

    let mut trend = Vec::new();
    for year in start.year()..=latest.date.year() {
        for month in [3, 6, 9, 12] {
            let Some(mut day) = month_end(year, month) else {
                continue;
            };
            if day <= start || day > latest.date {
                continue;
            }
            while !by_date.contains_key(&day) && day.day() > 25 {
                match day.checked_sub_days(Days::new(1)) {
                    Some(prev) => day = prev,
                    None => break,
                }
            }
            if let Some(close) = by_date.get(&day) {
                trend.push(*close);
            }
        }
    }
    trend
}

/// Per-year revenue, preferring the audited FY figure and otherwise
/// extrapolating from whatever quarters have reported:
/// three quarters project the fourth at their average, Q1 and Q2 double,
/// Q1 alone quadruples. Extrapolations are flagged `estimated`, 2dp.
/// Returns the most recent `n` years, ascending.
pub fn annual_revenue_history(records: &[FiscalRecord], n: usize) -> Vec<AnnualRevenue> {
    use crate::types::FiscalPeriod::{Q1, Q2, Q3, FY};

    let by_key = super::fundamentals::dedup_records(records);
    let mut years: Vec<i32> = by_key.keys().map(|(year, _)| *year).collect();
    years.dedup();

    let mut history: Vec<AnnualRevenue> = Vec::new();
    for year in years {
        let rev = |period| by_key.get(&(year, period)).and_then(|r| r.revenues);
        let entry = if let Some(fy) = rev(FY) {
            Some((fy, false))
        } else {
            match (rev(Q1), rev(Q2), rev(Q3)) {
                (Some(q1), Some(q2), Some(q3)) => {
                    let sum = q1 + q2 + q3;
                    Some((round2(sum + sum / 3.0), true))
                }
                (Some(q1), Some(q2), None) => Some((round2(2.0 * (q1 + q2)), true)),
                // Q1 alone quadruples, even when a later quarter reported
                // out of order (e.g. Q3 without Q2).
                (Some(q1), _, _) => Some((round2(q1 * 4.0), true)),
                _ => None,
            }
        };
        if let Some((revenue, estimated)) = entry {
            history.push(AnnualRevenue {
                year,
                revenue,
                estimated,
            });
        }
    }

    if history.len() > n {
        history.drain(..history.len() - n);
    }
    history
}

#[cfg(test)]
mod tests {
    use crate::types::FiscalPeriod;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn price(d: NaiveDate, close: f64) -> PricePoint {
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

    fn revenue_record(year: i32, period: FiscalPeriod, revenues: Option<f64>) -> FiscalRecord {
        let month = match period {
            FiscalPeriod::Q1 => 3,
            FiscalPeriod::Q2 => 6,
            FiscalPeriod::Q3 => 9,
            _ => 12,
        };
        FiscalRecord {
            ticker: "TEST".to_string(),
            company_name: None,
            fiscal_year: year,
            fiscal_period: period,
            filing_date: None,
            start_date: None,
            end_date: date(year, month, 28),
            revenues,
            operating_income: None,
            net_income: None,
            basic_eps: None,
            diluted_eps: None,
            assets: None,
            liabilities: None,
            equity: None,
            cash_flow: None,
            basic_shares: None,
            diluted_shares: None,
        }
    }

    #[test]
    fn cagr_doubles_in_three_years() {
        let g = cagr(100.0, 200.0, 3.0).unwrap();
        assert!((g - 25.99).abs() < 1e-9, "got {g}");
    }

    #[test]
    fn cagr_rejects_non_positive_inputs() {
        assert_eq!(cagr(0.0, 200.0, 3.0), None);
        assert_eq!(cagr(-5.0, 200.0, 3.0), None);
        assert_eq!(cagr(100.0, 0.0, 3.0), None);
        assert_eq!(cagr(100.0, 200.0, 0.0), None);
    }

    #[test]
    fn price_lookback_takes_first_at_or_before_cutoff() {
        let prices = vec![
            price(date(2020, 8, 20), 50.0),
            price(date(2021, 8, 30), 60.0),
            price(date(2022, 9, 2), 80.0),
            price(date(2023, 9, 1), 100.0),
        ];
        // Cutoff 2022-09-01: the 2021 point is the first at or before it.
        let base = price_years_ago(&prices, 1).unwrap();
        assert_eq!(base.date, date(2021, 8, 30));

        let g = price_growth(&prices, 1).unwrap();
        let expected = cagr(60.0, 100.0, 1.0).unwrap();
        assert_eq!(g, expected);
    }

    #[test]
    fn price_growth_none_when_history_too_short() {
        let prices = vec![
            price(date(2023, 3, 1), 90.0),
            price(date(2023, 9, 1), 100.0),
        ];
        assert_eq!(price_growth(&prices, 1), None);
    }

    #[test]
    fn revenue_growth_compares_same_period() {
        let records = vec![
            revenue_record(2020, FiscalPeriod::Q2, Some(100.0)),
            revenue_record(2023, FiscalPeriod::Q2, Some(200.0)),
        ];
        let g = revenue_growth(&records, 3).unwrap();
        assert!((g - 25.99).abs() < 1e-9);

        // Q2 2023 is the most recent candidate; without a Q2 counterpart
        // three years back the metric is unavailable (no fallback).
        let records = vec![
            revenue_record(2020, FiscalPeriod::Q1, Some(100.0)),
            revenue_record(2023, FiscalPeriod::Q2, Some(200.0)),
        ];
        assert_eq!(revenue_growth(&records, 3), None);
    }

    #[test]
    fn revenue_growth_skips_records_without_revenues() {
        let records = vec![
            revenue_record(2022, FiscalPeriod::Q1, Some(100.0)),
            revenue_record(2023, FiscalPeriod::Q1, Some(150.0)),
            revenue_record(2023, FiscalPeriod::Q2, None),
        ];
        let g = revenue_growth(&records, 1).unwrap();
        assert!((g - 50.0).abs() < 1e-9);
    }

    #[test]
    fn annual_history_prefers_fy_and_extrapolates() {
        let records = vec![
            revenue_record(2021, FiscalPeriod::FY, Some(400.0)),
            revenue_record(2022, FiscalPeriod::Q1, Some(100.0)),
            revenue_record(2022, FiscalPeriod::Q2, Some(110.0)),
            revenue_record(2022, FiscalPeriod::Q3, Some(90.0)),
            revenue_record(2023, FiscalPeriod::Q1, Some(100.0)),
            revenue_record(2023, FiscalPeriod::Q2, Some(110.0)),
            revenue_record(2024, FiscalPeriod::Q1, Some(120.0)),
        ];
        let history = annual_revenue_history(&records, 5);
        assert_eq!(history.len(), 4);

        assert_eq!(history[0].year, 2021);
        assert_eq!(history[0].revenue, 400.0);
        assert!(!history[0].estimated);

        // Three quarters: sum plus their average.
        assert_eq!(history[1].revenue, 400.0);
        assert!(history[1].estimated);

        // Two quarters doubled, one quadrupled.
        assert_eq!(history[2].revenue, 420.0);
        assert!(history[2].estimated);
        assert_eq!(history[3].revenue, 480.0);
        assert!(history[3].estimated);
    }

    #[test]
    fn annual_history_gap_year_extrapolates_from_q1() {
        // Q3 reported without Q2: the contiguous-pair rules do not apply,
        // so the year still gets the Q1-quadrupled estimate.
        let records = vec![
            revenue_record(2023, FiscalPeriod::Q1, Some(100.0)),
            revenue_record(2023, FiscalPeriod::Q3, Some(130.0)),
        ];
        let history = annual_revenue_history(&records, 5);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].revenue, 400.0);
        assert!(history[0].estimated);
    }

    #[test]
    fn annual_history_keeps_most_recent_n() {
        let records: Vec<FiscalRecord> = (2017..=2024)
            .map(|y| revenue_record(y, FiscalPeriod::FY, Some(f64::from(y as i32))))
            .collect();
        let history = annual_revenue_history(&records, 5);
        assert_eq!(history.len(), 5);
        assert_eq!(history[0].year, 2020);
        assert_eq!(history[4].year, 2024);
    }

    #[test]
    fn trend_samples_quarter_ends_stepping_back() {
        // Daily closes for Q1 2024 ending before month end; March 31 is a
        // Sunday, March 29 the last trading day.
        let mut prices: Vec<PricePoint> = vec![
            price(date(2023, 12, 29), 10.0),
            price(date(2024, 3, 28), 11.0),
            price(date(2024, 3, 29), 12.0),
            price(date(2024, 6, 28), 13.0),
        ];
        prices.sort_by_key(|p| p.date);
        let trend = price_trend_5y(&prices);
        assert_eq!(trend, vec![10.0, 12.0, 13.0]);
    }

    #[test]
    fn trend_gives_up_past_day_25() {
        // Nothing in the last week of March at all; that quarter is skipped.
        let prices = vec![
            price(date(2024, 3, 20), 11.0),
            price(date(2024, 6, 28), 13.0),
        ];
        assert_eq!(price_trend_5y(&prices), vec![13.0]);
    }

    #[test]
    fn trend_empty_without_prices() {
        assert!(price_trend_5y(&[]).is_empty());
    }
}
