//! Query builder for the `/vX/reference/financials` endpoint.

use chrono::NaiveDate;
use url::Url;

use super::common::{Query, QueryCommon};

/// Reporting timeframe filter for filings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timeframe {
    /// Quarterly filings (Q1-Q4).
    Quarterly,
    /// Annual filings (FY).
    Annual,
}

impl Timeframe {
    fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Quarterly => "quarterly",
            Timeframe::Annual => "annual",
        }
    }
}

/// Query for fundamentals filings, filtered by ticker and filing date range.
#[derive(Clone, Default)]
pub struct FinancialsQuery {
    /// Shared paging and sort fields.
    pub common: QueryCommon,
    /// Restrict to a single ticker symbol.
    pub ticker: Option<String>,
    /// Only filings filed on or after this date.
    pub filing_date_gte: Option<NaiveDate>,
    /// Only filings filed on or before this date.
    pub filing_date_lte: Option<NaiveDate>,
    /// Restrict to quarterly or annual filings. `None` returns both.
    pub timeframe: Option<Timeframe>,
}

impl FinancialsQuery {
    /// Restricts results to the given ticker symbol.
    pub fn with_ticker(mut self, ticker: &str) -> Self {
        self.ticker = Some(ticker.to_uppercase());
        self
    }

    /// Only filings filed on or after `date`.
    pub fn with_filing_date_gte(mut self, date: NaiveDate) -> Self {
        self.filing_date_gte = Some(date);
        self
    }

    /// Only filings filed on or before `date`.
    pub fn with_filing_date_lte(mut self, date: NaiveDate) -> Self {
        self.filing_date_lte = Some(date);
        self
    }

    /// Restricts results to quarterly or annual filings.
    pub fn with_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = Some(timeframe);
        self
    }
}

impl Query for FinancialsQuery {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = self.common.add_to_url(url);
        if let Some(ref ticker) = self.ticker {
            url.query_pairs_mut().append_pair("ticker", ticker);
        }
        if let Some(date) = self.filing_date_gte {
            url.query_pairs_mut()
                .append_pair("filing_date.gte", &date.format("%Y-%m-%d").to_string());
        }
        if let Some(date) = self.filing_date_lte {
            url.query_pairs_mut()
                .append_pair("filing_date.lte", &date.format("%Y-%m-%d").to_string());
        }
        if let Some(timeframe) = self.timeframe {
            url.query_pairs_mut()
                .append_pair("timeframe", timeframe.as_str());
        }
        url
    }

    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
}
