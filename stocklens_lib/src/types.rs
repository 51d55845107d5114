//! Domain records stored and computed by StockLens.
//!
//! Input records ([`FiscalRecord`], [`PricePoint`], [`TickerMeta`]) are flat
//! rows with explicit optional fields: absence of a reported figure is a
//! first-class value, never a missing key. Derived types ([`QuarterPoint`],
//! [`TtmPoint`], [`SummaryDoc`]) are produced by the `core` modules.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stocklens_api::types::{StatementRecord, TickerDetail};

/// Fiscal reporting bucket. Ordered: Q1 < Q2 < Q3 < Q4 < FY.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FiscalPeriod {
    Q1,
    Q2,
    Q3,
    Q4,
    FY,
}

impl FiscalPeriod {
    /// The literal period string, e.g. `"Q1"` or `"FY"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FiscalPeriod::Q1 => "Q1",
            FiscalPeriod::Q2 => "Q2",
            FiscalPeriod::Q3 => "Q3",
            FiscalPeriod::Q4 => "Q4",
            FiscalPeriod::FY => "FY",
        }
    }
}

impl FromStr for FiscalPeriod {
    type Err = ();

    /// Parses the reported period string, case-insensitively. Unknown
    /// buckets (e.g. the provider's `TTM` rows) are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "Q1" => Ok(FiscalPeriod::Q1),
            "Q2" => Ok(FiscalPeriod::Q2),
            "Q3" => Ok(FiscalPeriod::Q3),
            "Q4" => Ok(FiscalPeriod::Q4),
            "FY" => Ok(FiscalPeriod::FY),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for FiscalPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One filing's worth of fundamentals for a ticker, flattened from the
/// provider's nested statement structure. Immutable input to the core.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FiscalRecord {
    pub ticker: String,
    pub company_name: Option<String>,
    pub fiscal_year: i32,
    pub fiscal_period: FiscalPeriod,
    /// Date the filing was submitted. Used as the duplicate tie-breaker.
    pub filing_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    /// Last day of the reporting period.
    pub end_date: NaiveDate,
    pub revenues: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
    pub basic_eps: Option<f64>,
    pub diluted_eps: Option<f64>,
    pub assets: Option<f64>,
    pub liabilities: Option<f64>,
    pub equity: Option<f64>,
    pub cash_flow: Option<f64>,
    pub basic_shares: Option<f64>,
    pub diluted_shares: Option<f64>,
}

impl FiscalRecord {
    /// EPS for this filing: diluted preferred over basic.
    pub fn chosen_eps(&self) -> Option<f64> {
        self.diluted_eps.or(self.basic_eps)
    }

    /// Shares outstanding for this filing: diluted preferred over basic.
    pub fn chosen_shares(&self) -> Option<f64> {
        self.diluted_shares.or(self.basic_shares)
    }

    /// Flattens a raw provider filing. Returns `None` when the filing lacks
    /// a ticker, parseable fiscal year/period, or a period end date.
    pub fn from_statement(raw: &StatementRecord) -> Option<Self> {
        let ticker = raw.primary_ticker()?.to_uppercase();
        let fiscal_year = raw.fiscal_year.as_deref()?.trim().parse::<i32>().ok()?;
        let fiscal_period = raw.fiscal_period.as_deref()?.parse::<FiscalPeriod>().ok()?;
        let end_date = parse_date(raw.end_date.as_deref())?;
        Some(Self {
            ticker,
            company_name: raw.company_name.clone(),
            fiscal_year,
            fiscal_period,
            filing_date: parse_date(raw.filing_date.as_deref()),
            start_date: parse_date(raw.start_date.as_deref()),
            end_date,
            revenues: raw.financials.revenues(),
            operating_income: raw.financials.operating_income(),
            net_income: raw.financials.net_income(),
            basic_eps: raw.financials.basic_eps(),
            diluted_eps: raw.financials.diluted_eps(),
            assets: raw.financials.assets(),
            liabilities: raw.financials.liabilities(),
            equity: raw.financials.equity(),
            cash_flow: raw.financials.net_cash_flow(),
            basic_shares: raw.financials.basic_shares(),
            diluted_shares: raw.financials.diluted_shares(),
        })
    }
}

/// Dates in provider payloads occasionally carry a time suffix; only the
/// leading `YYYY-MM-DD` is significant.
fn parse_date(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?;
    let day = if s.len() > 10 { s.get(..10)? } else { s };
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// One trading day's prices for a ticker. Dense daily series, read-only.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PricePoint {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub adj_close: Option<f64>,
    pub volume: i64,
    /// Provider-supplied trailing dividend yield, when present.
    pub dividend_yield: Option<f64>,
    /// Provider-precomputed P/E for the day, when present.
    pub pe_ratio: Option<f64>,
}

/// Reference metadata for a ticker, as stored in the catalog.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TickerMeta {
    pub ticker: String,
    pub name: Option<String>,
    pub active: bool,
    pub security_type: Option<String>,
    pub primary_exchange: Option<String>,
    pub currency_name: Option<String>,
    pub sic_code: Option<String>,
    pub sic_description: Option<String>,
    /// Sector label, derived from the SIC code or an override at ingest.
    pub sector: Option<String>,
    pub share_class_shares_outstanding: Option<f64>,
    pub weighted_shares_outstanding: Option<f64>,
    pub updated_utc: Option<String>,
}

impl TickerMeta {
    /// Builds catalog metadata from a provider reference record. The sector
    /// is left unset; classification happens at ingest.
    pub fn from_detail(detail: &TickerDetail) -> Self {
        Self {
            ticker: detail.ticker.to_uppercase(),
            name: detail.name.clone(),
            active: detail.active.unwrap_or(true),
            security_type: detail.security_type.clone(),
            primary_exchange: detail.primary_exchange.clone(),
            currency_name: detail.currency_name.clone(),
            sic_code: detail.sic_code.clone(),
            sic_description: detail.sic_description.clone(),
            sector: None,
            share_class_shares_outstanding: detail.share_class_shares_outstanding,
            weighted_shares_outstanding: detail.weighted_shares_outstanding,
            updated_utc: detail.updated_utc.clone(),
        }
    }

    /// Shares outstanding: weighted across classes preferred.
    pub fn shares_outstanding(&self) -> Option<f64> {
        self.weighted_shares_outstanding
            .or(self.share_class_shares_outstanding)
    }
}

/// One reconstructed quarter of EPS, dated at the quarter's end.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct QuarterPoint {
    pub date: NaiveDate,
    pub eps: f64,
}

/// Rolling four-quarter EPS sum, dated at the newest contributing quarter.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TtmPoint {
    pub date: NaiveDate,
    pub eps_ttm: f64,
}

/// A daily price annotated with trailing EPS and P/E where a TTM point
/// aligned to it. Absent fields are omitted from JSON output.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AnnotatedPrice {
    pub date: NaiveDate,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe: Option<f64>,
}

/// One quarter's metric row for the serving layer.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct QuarterlyRow {
    /// Display label, e.g. `"2024 Q2"`.
    pub quarter: String,
    pub date: NaiveDate,
    pub eps: f64,
    /// Close on the last trading day at or before the quarter end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttm_eps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<f64>,
}

/// One year of revenue history. `estimated` marks years where the annual
/// total was extrapolated from a partial set of quarters.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AnnualRevenue {
    pub year: i32,
    pub revenue: f64,
    pub estimated: bool,
}

/// Per-ticker derived metrics document. Fully rebuilt and overwritten on
/// every summary run; absent metrics are omitted, never null.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SummaryDoc {
    pub ticker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttm_pe_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_growth_1y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_growth_3y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_growth_5y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_growth_1y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_growth_3y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_growth_5y: Option<f64>,
    /// Quarter-end closes over the trailing five years.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub price_history: Vec<f64>,
    /// Annual revenues over the trailing five fiscal years.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub revenue_history: Vec<AnnualRevenue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roa: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roe: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_to_equity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fiscal_period_ordering() {
        assert!(FiscalPeriod::Q1 < FiscalPeriod::Q2);
        assert!(FiscalPeriod::Q4 < FiscalPeriod::FY);
    }

    #[test]
    fn fiscal_period_parses_case_insensitively() {
        assert_eq!("q2".parse::<FiscalPeriod>(), Ok(FiscalPeriod::Q2));
        assert_eq!("FY".parse::<FiscalPeriod>(), Ok(FiscalPeriod::FY));
        assert!("TTM".parse::<FiscalPeriod>().is_err());
    }

    #[test]
    fn chosen_eps_prefers_diluted() {
        let mut rec = sample_record();
        rec.basic_eps = Some(2.0);
        rec.diluted_eps = Some(1.9);
        assert_eq!(rec.chosen_eps(), Some(1.9));
        rec.diluted_eps = None;
        assert_eq!(rec.chosen_eps(), Some(2.0));
        rec.basic_eps = None;
        assert_eq!(rec.chosen_eps(), None);
    }

    #[test]
    fn parse_date_trims_time_suffix() {
        assert_eq!(
            parse_date(Some("2024-03-30T00:00:00Z")),
            NaiveDate::from_ymd_opt(2024, 3, 30)
        );
        assert_eq!(parse_date(Some("not a date")), None);
        // Multibyte garbage inside the first ten bytes must not panic.
        assert_eq!(parse_date(Some("2024-03-3\u{00e9}T00:00:00Z")), None);
        assert_eq!(parse_date(None), None);
    }

    #[test]
    fn summary_doc_omits_absent_fields() {
        let doc = SummaryDoc {
            ticker: "AAPL".to_string(),
            ttm_pe_ratio: Some(28.5),
            ..Default::default()
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["ttm_pe_ratio"], 28.5);
        assert!(json.get("roa").is_none());
        assert!(json.get("price_growth_5y").is_none());
        assert!(json.get("price_history").is_none());
    }

    fn sample_record() -> FiscalRecord {
        FiscalRecord {
            ticker: "TEST".to_string(),
            company_name: None,
            fiscal_year: 2024,
            fiscal_period: FiscalPeriod::Q1,
            filing_date: None,
            start_date: None,
            end_date: NaiveDate::from_ymd_opt(2024, 3, 30).unwrap(),
            revenues: None,
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
}
