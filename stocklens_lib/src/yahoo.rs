//! Yahoo Finance client wrapper for fetching daily price history.

use chrono::NaiveDate;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;

use crate::types::PricePoint;

/// Errors from Yahoo Finance operations.
#[derive(Error, Debug)]
pub enum YahooError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error(transparent)]
    Upstream(#[from] yahoo_finance_api::YahooError),
}

/// Convert chrono::NaiveDate to time::OffsetDateTime at UTC midnight.
pub fn date_to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, YahooError> {
    let datetime = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| YahooError::InvalidDate(date.to_string()))?;
    let timestamp = datetime.and_utc().timestamp();
    OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|_| YahooError::InvalidDate(date.to_string()))
}

/// Convert a quote timestamp (seconds) to chrono::NaiveDate.
pub fn timestamp_to_date(timestamp: i64) -> Option<NaiveDate> {
    chrono::DateTime::from_timestamp(timestamp, 0).map(|dt| dt.date_naive())
}

/// Thin wrapper around the Yahoo connector producing [`PricePoint`] rows.
pub struct YahooClient {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooClient {
    pub fn new() -> Result<Self, YahooError> {
        Ok(Self {
            connector: yahoo_finance_api::YahooConnector::new()?,
        })
    }

    /// Daily closes for `ticker` over `[start, end]` inclusive, ascending.
    /// Quotes whose timestamps do not map to a calendar date are dropped.
    pub async fn daily_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, YahooError> {
        let start_dt = date_to_offset_datetime(start)?;
        // The range end is exclusive upstream; push it one day out.
        let end_dt = date_to_offset_datetime(
            end.succ_opt()
                .ok_or_else(|| YahooError::InvalidDate(end.to_string()))?,
        )?;

        let response = self
            .connector
            .get_quote_history_interval(ticker, start_dt, end_dt, "1d")
            .await?;
        let quotes = response.quotes()?;
        debug!(ticker, count = quotes.len(), "fetched daily quotes");

        let ticker = ticker.to_uppercase();
        let mut points: Vec<PricePoint> = quotes
            .into_iter()
            .filter_map(|q| {
                let date = timestamp_to_date(q.timestamp as i64)?;
                Some(PricePoint {
                    ticker: ticker.clone(),
                    date,
                    open: Some(q.open),
                    high: Some(q.high),
                    low: Some(q.low),
                    close: q.close,
                    adj_close: Some(q.adjclose),
                    volume: q.volume as i64,
                    dividend_yield: None,
                    pe_ratio: None,
                })
            })
            .collect();
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_to_offset_datetime_epoch() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date_to_offset_datetime(date).unwrap().unix_timestamp(), 0);
    }

    #[test]
    fn timestamp_round_trip() {
        for date in [
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 2, 29).unwrap(),
        ] {
            let dt = date_to_offset_datetime(date).unwrap();
            assert_eq!(timestamp_to_date(dt.unix_timestamp()), Some(date));
        }
    }
}
