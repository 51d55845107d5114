//! Ticker reference metadata from the `/v3/reference/tickers` endpoints.

use serde::{Deserialize, Serialize};

/// Reference metadata for a listed security.
#[derive(Serialize, Deserialize, Clone)]
pub struct TickerDetail {
    /// Ticker symbol, e.g. `AAPL`.
    pub ticker: String,

    /// Registered company name.
    pub name: Option<String>,

    /// Market the security trades on, e.g. `stocks`.
    pub market: Option<String>,

    pub locale: Option<String>,

    /// Exchange MIC code, e.g. `XNAS`.
    pub primary_exchange: Option<String>,

    /// Security type code, e.g. `CS` for common stock.
    #[serde(rename = "type")]
    pub security_type: Option<String>,

    /// Whether the ticker is actively listed.
    pub active: Option<bool>,

    pub currency_name: Option<String>,

    /// Standard industrial classification code as reported (string form).
    pub sic_code: Option<String>,

    /// Human-readable description of the SIC code.
    pub sic_description: Option<String>,

    /// Shares outstanding for this share class.
    pub share_class_shares_outstanding: Option<f64>,

    /// Weighted shares outstanding across classes.
    pub weighted_shares_outstanding: Option<f64>,

    pub homepage_url: Option<String>,

    /// Company description blurb.
    pub description: Option<String>,

    /// When the provider last refreshed this record.
    pub updated_utc: Option<String>,
}
