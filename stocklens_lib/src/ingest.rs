//! Ingest pipeline: provider fundamentals and metadata, Yahoo prices.

use chrono::{Months, NaiveDate, Utc};
use tracing::{info, warn};

use stocklens_api::{Client, FinancialsQuery, Query, SortOrder};

use crate::core::sector::{self, SectorOverrides};
use crate::error::StockLensError;
use crate::store::Store;
use crate::types::{FiscalRecord, TickerMeta};
use crate::yahoo::YahooClient;

/// Default price/fundamentals backfill horizon for a fresh seed, in years.
/// Six covers the five-year metrics plus the lookback slack they need.
const DEFAULT_SEED_YEARS: u32 = 6;

/// Pulls provider data into the store. One instance serves many tickers.
pub struct Ingestor {
    client: Client,
    yahoo: YahooClient,
    overrides: SectorOverrides,
}

/// Per-ticker seed counts, for progress reporting.
#[derive(Clone, Copy, Debug, Default)]
pub struct SeedStats {
    pub fundamentals: usize,
    pub prices: usize,
}

impl Ingestor {
    pub fn new(client: Client) -> Result<Self, StockLensError> {
        Ok(Self {
            client,
            yahoo: YahooClient::new()?,
            overrides: SectorOverrides::bundled()
                .map_err(|e| StockLensError::InvalidInput(e.to_string()))?,
        })
    }

    /// Full backfill for one ticker: every filing in range, reference
    /// metadata (sector-classified), and daily prices.
    pub async fn seed_ticker(
        &self,
        store: &mut Store,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<SeedStats, StockLensError> {
        let end = end.unwrap_or_else(|| Utc::now().date_naive());
        let start = match start {
            Some(s) => s,
            None => end
                .checked_sub_months(Months::new(12 * DEFAULT_SEED_YEARS))
                .ok_or_else(|| {
                    StockLensError::InvalidInput(format!("seed range underflow from {end}"))
                })?,
        };
        if start > end {
            return Err(StockLensError::InvalidInput(format!(
                "seed range {start}..{end} is inverted"
            )));
        }

        self.refresh_metadata(store, ticker).await?;

        let query = FinancialsQuery::default()
            .with_ticker(ticker)
            .with_filing_date_gte(start)
            .with_filing_date_lte(end)
            .with_limit(100)
            .with_sort("filing_date")
            .with_order(SortOrder::Asc);
        let statements = self.client.get_all_financials(&query).await?;
        let records: Vec<FiscalRecord> = statements
            .iter()
            .filter_map(FiscalRecord::from_statement)
            .collect();
        if records.len() < statements.len() {
            warn!(
                ticker,
                dropped = statements.len() - records.len(),
                "skipped filings missing period identity"
            );
        }
        store.upsert_fiscal_records(&records)?;

        let prices = self.yahoo.daily_closes(ticker, start, end).await?;
        store.upsert_price_points(&prices)?;

        info!(
            ticker,
            fundamentals = records.len(),
            prices = prices.len(),
            "seeded"
        );
        Ok(SeedStats {
            fundamentals: records.len(),
            prices: prices.len(),
        })
    }

    /// Incremental catch-up for one ticker: prices after the stored latest
    /// date, filings after the stored latest filing date. A ticker with no
    /// stored history falls back to a full seed.
    pub async fn sync_ticker(
        &self,
        store: &mut Store,
        ticker: &str,
    ) -> Result<SeedStats, StockLensError> {
        let last_price = store.latest_price_date(ticker)?;
        let last_filing = store.latest_filing_date(ticker)?;
        if last_price.is_none() && last_filing.is_none() {
            return self.seed_ticker(store, ticker, None, None).await;
        }

        let today = Utc::now().date_naive();
        let mut stats = SeedStats::default();

        if let Some(since) = last_filing {
            // gte is inclusive; the unique filing key makes the overlap a
            // no-op re-upsert.
            let query = FinancialsQuery::default()
                .with_ticker(ticker)
                .with_filing_date_gte(since)
                .with_limit(100)
                .with_sort("filing_date")
                .with_order(SortOrder::Asc);
            let statements = self.client.get_all_financials(&query).await?;
            let records: Vec<FiscalRecord> = statements
                .iter()
                .filter_map(FiscalRecord::from_statement)
                .collect();
            store.upsert_fiscal_records(&records)?;
            stats.fundamentals = records.len();
        }

        if let Some(since) = last_price {
            if since < today {
                let prices = self.yahoo.daily_closes(ticker, since, today).await?;
                store.upsert_price_points(&prices)?;
                stats.prices = prices.len();
            }
        }

        info!(
            ticker,
            fundamentals = stats.fundamentals,
            prices = stats.prices,
            "synced"
        );
        Ok(stats)
    }

    /// Fetches reference metadata and stores it with a derived sector.
    pub async fn refresh_metadata(
        &self,
        store: &Store,
        ticker: &str,
    ) -> Result<TickerMeta, StockLensError> {
        let detail = self
            .client
            .get_ticker_detail(ticker)
            .await?
            .results
            .ok_or_else(|| {
                StockLensError::InvalidInput(format!("provider has no metadata for {ticker}"))
            })?;
        let mut meta = TickerMeta::from_detail(&detail);
        meta.sector = sector::classify(&self.overrides, &meta.ticker, meta.sic_code.as_deref());
        store.upsert_metadata(&meta)?;
        Ok(meta)
    }
}

/// Splits a comma-separated ticker argument, uppercasing and deduplicating
/// while preserving order.
pub fn parse_ticker_list(arg: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    arg.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_uppercase)
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_list_parsing() {
        assert_eq!(
            parse_ticker_list("aapl, msft,,AAPL "),
            vec!["AAPL".to_string(), "MSFT".to_string()]
        );
        assert!(parse_ticker_list(" ,").is_empty());
    }
}
