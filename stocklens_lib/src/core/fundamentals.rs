//! Quarterly EPS reconstruction and trailing-twelve-month aggregation.
//!
//! Filings arrive irregularly: quarters may be missing, Q4 is usually not
//! reported separately, and amended filings duplicate (year, period) keys.
//! [`quarter_points`] normalizes one ticker's filings into a clean
//! chronological quarterly EPS stream, deriving Q4 from the annual total
//! where possible. [`TtmSeries`] then rolls a four-quarter window over it.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, VecDeque};

use crate::core::round2;
use crate::types::{FiscalPeriod, FiscalRecord, QuarterPoint, TtmPoint};

/// Deduplicates filings by (fiscal year, period): the record with the
/// latest filing date wins; on a filing-date tie the later input record
/// wins. A dated filing beats an undated one.
pub fn dedup_records(records: &[FiscalRecord]) -> BTreeMap<(i32, FiscalPeriod), &FiscalRecord> {
    let mut by_key: BTreeMap<(i32, FiscalPeriod), &FiscalRecord> = BTreeMap::new();
    for record in records {
        let key = (record.fiscal_year, record.fiscal_period);
        match by_key.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                if record.filing_date >= slot.get().filing_date {
                    slot.insert(record);
                }
            }
        }
    }
    by_key
}

/// Reconstructs the complete quarterly EPS stream for one ticker, each
/// point labelled `"YYYY Qn"`.
///
/// Per fiscal year: emits a point for each of Q1-Q3 that carries an EPS
/// value, then derives Q4 as `eps_FY - (eps_Q1 + eps_Q2 + eps_Q3)` when all
/// three quarters and the FY filing are present. The derived Q4 is dated at
/// the FY end date and left unrounded; rounding happens only at output.
/// Periods missing required inputs are skipped without error. The result is
/// sorted by end date, ties kept in insertion order.
pub fn labeled_quarter_points(records: &[FiscalRecord]) -> Vec<(String, QuarterPoint)> {
    let by_key = dedup_records(records);

    let mut years: Vec<i32> = by_key.keys().map(|(year, _)| *year).collect();
    years.dedup();

    let mut quarters: Vec<(String, QuarterPoint)> = Vec::new();
    for year in years {
        let mut q_vals: Vec<f64> = Vec::new();
        for (n, period) in [FiscalPeriod::Q1, FiscalPeriod::Q2, FiscalPeriod::Q3]
            .into_iter()
            .enumerate()
        {
            let Some(record) = by_key.get(&(year, period)) else {
                continue;
            };
            let Some(eps) = record.chosen_eps() else {
                continue;
            };
            quarters.push((
                format!("{year} Q{}", n + 1),
                QuarterPoint {
                    date: record.end_date,
                    eps,
                },
            ));
            q_vals.push(eps);
        }

        // Q4 is only derivable when the first three quarters all reported.
        if q_vals.len() == 3 {
            if let Some(fy) = by_key.get(&(year, FiscalPeriod::FY)) {
                if let Some(fy_eps) = fy.chosen_eps() {
                    let q4_eps = fy_eps - q_vals.iter().sum::<f64>();
                    quarters.push((
                        format!("{year} Q4"),
                        QuarterPoint {
                            date: fy.end_date,
                            eps: q4_eps,
                        },
                    ));
                }
            }
        }
    }

    quarters.sort_by_key(|(_, q)| q.date);
    quarters
}

/// [`labeled_quarter_points`] without the labels.
pub fn quarter_points(records: &[FiscalRecord]) -> Vec<QuarterPoint> {
    labeled_quarter_points(records)
        .into_iter()
        .map(|(_, q)| q)
        .collect()
}

/// Lazy rolling four-quarter sum over a reconstructed quarterly stream.
///
/// Emits one [`TtmPoint`] per quarter once four quarters have accumulated,
/// dated at the newest quarter in the window. Restartable: iterating the
/// same input again yields the same sequence.
pub struct TtmSeries<'a> {
    points: std::slice::Iter<'a, QuarterPoint>,
    window: VecDeque<f64>,
    total: f64,
}

impl<'a> TtmSeries<'a> {
    /// Starts a fresh rolling window over `points`, which must already be
    /// in chronological order.
    pub fn new(points: &'a [QuarterPoint]) -> Self {
        Self {
            points: points.iter(),
            window: VecDeque::with_capacity(4),
            total: 0.0,
        }
    }
}

impl Iterator for TtmSeries<'_> {
    type Item = TtmPoint;

    fn next(&mut self) -> Option<TtmPoint> {
        for quarter in self.points.by_ref() {
            self.window.push_back(quarter.eps);
            self.total += quarter.eps;
            if self.window.len() > 4 {
                if let Some(evicted) = self.window.pop_front() {
                    self.total -= evicted;
                }
            }
            if self.window.len() == 4 {
                return Some(TtmPoint {
                    date: quarter.date,
                    eps_ttm: round2(self.total),
                });
            }
        }
        None
    }
}

/// Collects the full TTM series for a quarterly stream.
pub fn ttm_points(points: &[QuarterPoint]) -> Vec<TtmPoint> {
    TtmSeries::new(points).collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(
        year: i32,
        period: FiscalPeriod,
        end: NaiveDate,
        diluted_eps: Option<f64>,
    ) -> FiscalRecord {
        FiscalRecord {
            ticker: "TEST".to_string(),
            company_name: None,
            fiscal_year: year,
            fiscal_period: period,
            filing_date: Some(end + chrono::Days::new(30)),
            start_date: None,
            end_date: end,
            revenues: None,
            operating_income: None,
            net_income: None,
            basic_eps: None,
            diluted_eps,
            assets: None,
            liabilities: None,
            equity: None,
            cash_flow: None,
            basic_shares: None,
            diluted_shares: None,
        }
    }

    fn full_year(year: i32) -> Vec<FiscalRecord> {
        vec![
            record(year, FiscalPeriod::Q1, date(year, 3, 31), Some(1.0)),
            record(year, FiscalPeriod::Q2, date(year, 6, 30), Some(1.1)),
            record(year, FiscalPeriod::Q3, date(year, 9, 30), Some(0.9)),
            record(year, FiscalPeriod::FY, date(year, 12, 31), Some(4.3)),
        ]
    }

    #[test]
    fn derives_q4_from_annual_total() {
        let points = quarter_points(&full_year(2023));
        assert_eq!(points.len(), 4);
        let q4 = points[3];
        assert_eq!(q4.date, date(2023, 12, 31));
        // FY 4.3 - (1.0 + 1.1 + 0.9), unrounded.
        assert!((q4.eps - 1.3).abs() < 1e-12);
    }

    #[test]
    fn no_q4_without_all_three_quarters() {
        let mut records = full_year(2023);
        records.remove(1); // drop Q2
        let points = quarter_points(&records);
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.date != date(2023, 12, 31)));
    }

    #[test]
    fn no_q4_without_fy_record() {
        let mut records = full_year(2023);
        records.pop(); // drop FY
        let points = quarter_points(&records);
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn skips_quarters_missing_eps() {
        let mut records = full_year(2023);
        records[0].diluted_eps = None;
        let points = quarter_points(&records);
        // Q1 skipped entirely, so Q4 is not derivable either.
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn falls_back_to_basic_eps() {
        let mut records = full_year(2023);
        records[0].diluted_eps = None;
        records[0].basic_eps = Some(1.0);
        let points = quarter_points(&records);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].eps, 1.0);
    }

    #[test]
    fn sorted_across_years() {
        let mut records = full_year(2023);
        records.extend(full_year(2022));
        let points = quarter_points(&records);
        assert_eq!(points.len(), 8);
        assert!(points.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(points[0].date, date(2022, 3, 31));
    }

    #[test]
    fn duplicate_records_latest_filing_wins() {
        let mut records = full_year(2023);
        let mut amended = record(2023, FiscalPeriod::Q1, date(2023, 3, 31), Some(1.5));
        amended.filing_date = Some(date(2023, 8, 1));
        records.push(amended);
        // An older duplicate must not displace the amendment.
        let mut stale = record(2023, FiscalPeriod::Q1, date(2023, 3, 31), Some(0.5));
        stale.filing_date = Some(date(2023, 4, 15));
        records.push(stale);

        let points = quarter_points(&records);
        assert_eq!(points[0].eps, 1.5);
        // Q4 derivation uses the amended Q1 as well.
        assert!((points[3].eps - (4.3 - (1.5 + 1.1 + 0.9))).abs() < 1e-12);
    }

    #[test]
    fn quarters_are_labelled_by_year_and_number() {
        let labelled = labeled_quarter_points(&full_year(2023));
        let labels: Vec<&str> = labelled.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["2023 Q1", "2023 Q2", "2023 Q3", "2023 Q4"]);
    }

    #[test]
    fn ttm_emitted_only_after_four_quarters() {
        let points = quarter_points(&full_year(2023));
        let ttm = ttm_points(&points);
        assert_eq!(ttm.len(), 1);
        assert_eq!(ttm[0].date, date(2023, 12, 31));
        assert_eq!(ttm[0].eps_ttm, 4.3);

        let three = &points[..3];
        assert!(ttm_points(three).is_empty());
    }

    #[test]
    fn ttm_window_slides_fifo() {
        let mut records = full_year(2022);
        records.extend(full_year(2023));
        let points = quarter_points(&records);
        let ttm = ttm_points(&points);
        // 8 quarters -> 5 TTM points, one per quarter from the 4th on.
        assert_eq!(ttm.len(), 5);
        // Identical quarterly values in both years keep the sum at 4.3.
        assert!(ttm.iter().all(|t| t.eps_ttm == 4.3));
        assert_eq!(ttm[0].date, date(2022, 12, 31));
        assert_eq!(ttm[4].date, date(2023, 12, 31));
    }

    #[test]
    fn ttm_series_is_restartable() {
        let points = quarter_points(&full_year(2023));
        let first: Vec<_> = TtmSeries::new(&points).collect();
        let second: Vec<_> = TtmSeries::new(&points).collect();
        assert_eq!(first, second);
    }
}
