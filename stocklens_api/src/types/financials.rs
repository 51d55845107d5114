//! Fundamentals filing types returned by the `/vX/reference/financials` endpoint.
//!
//! The provider nests every reported figure inside a labelled [`DataPoint`];
//! any statement, section, or value may be absent for a given filing. Callers
//! flatten these into their own record types.

use serde::{Deserialize, Serialize};

/// One filing (quarterly or annual) for a company.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatementRecord {
    /// Ticker symbols this filing applies to. Usually a single entry.
    #[serde(default = "Vec::new")]
    pub tickers: Vec<String>,

    /// Registered company name.
    pub company_name: Option<String>,

    /// Fiscal year as reported, e.g. `"2024"`.
    pub fiscal_year: Option<String>,

    /// Fiscal period as reported: `Q1`-`Q4`, `FY`, or `TTM`.
    pub fiscal_period: Option<String>,

    /// Date the filing was submitted (`YYYY-MM-DD`).
    pub filing_date: Option<String>,

    /// First day of the reporting period.
    pub start_date: Option<String>,

    /// Last day of the reporting period.
    pub end_date: Option<String>,

    /// The reported statements. Sections may be missing entirely.
    #[serde(default)]
    pub financials: Financials,
}

/// Container for the statements reported in a filing.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Financials {
    pub income_statement: Option<IncomeStatement>,
    pub balance_sheet: Option<BalanceSheet>,
    pub cash_flow_statement: Option<CashFlowStatement>,
}

/// Income statement line items.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct IncomeStatement {
    pub revenues: Option<DataPoint>,
    pub operating_income_loss: Option<DataPoint>,
    pub net_income_loss: Option<DataPoint>,
    pub basic_earnings_per_share: Option<DataPoint>,
    pub diluted_earnings_per_share: Option<DataPoint>,
    pub basic_average_shares: Option<DataPoint>,
    pub diluted_average_shares: Option<DataPoint>,
}

/// Balance sheet line items.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct BalanceSheet {
    pub assets: Option<DataPoint>,
    pub liabilities: Option<DataPoint>,
    pub equity: Option<DataPoint>,
}

/// Cash flow statement line items.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct CashFlowStatement {
    pub net_cash_flow: Option<DataPoint>,
}

/// A single reported figure with its unit and display label.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct DataPoint {
    /// The reported value. Absent when the company did not report the item.
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub label: Option<String>,
}

impl StatementRecord {
    /// Primary ticker for this filing, if any.
    pub fn primary_ticker(&self) -> Option<&str> {
        self.tickers.first().map(String::as_str)
    }
}

/// Extracts the value from an optional data point.
pub(crate) fn point_value(point: &Option<DataPoint>) -> Option<f64> {
    point.as_ref().and_then(|p| p.value)
}

impl Financials {
    /// Reported revenues, if present.
    pub fn revenues(&self) -> Option<f64> {
        point_value(&self.income_statement.as_ref()?.revenues)
    }

    /// Reported operating income, if present.
    pub fn operating_income(&self) -> Option<f64> {
        point_value(&self.income_statement.as_ref()?.operating_income_loss)
    }

    /// Reported net income, if present.
    pub fn net_income(&self) -> Option<f64> {
        point_value(&self.income_statement.as_ref()?.net_income_loss)
    }

    /// Reported basic earnings per share, if present.
    pub fn basic_eps(&self) -> Option<f64> {
        point_value(&self.income_statement.as_ref()?.basic_earnings_per_share)
    }

    /// Reported diluted earnings per share, if present.
    pub fn diluted_eps(&self) -> Option<f64> {
        point_value(&self.income_statement.as_ref()?.diluted_earnings_per_share)
    }

    /// Basic weighted-average shares outstanding, if present.
    pub fn basic_shares(&self) -> Option<f64> {
        point_value(&self.income_statement.as_ref()?.basic_average_shares)
    }

    /// Diluted weighted-average shares outstanding, if present.
    pub fn diluted_shares(&self) -> Option<f64> {
        point_value(&self.income_statement.as_ref()?.diluted_average_shares)
    }

    /// Reported total assets, if present.
    pub fn assets(&self) -> Option<f64> {
        point_value(&self.balance_sheet.as_ref()?.assets)
    }

    /// Reported total liabilities, if present.
    pub fn liabilities(&self) -> Option<f64> {
        point_value(&self.balance_sheet.as_ref()?.liabilities)
    }

    /// Reported shareholder equity, if present.
    pub fn equity(&self) -> Option<f64> {
        point_value(&self.balance_sheet.as_ref()?.equity)
    }

    /// Reported net cash flow, if present.
    pub fn net_cash_flow(&self) -> Option<f64> {
        point_value(&self.cash_flow_statement.as_ref()?.net_cash_flow)
    }
}
