//! Response types for the market-data provider API.

mod financials;
mod meta;
mod reference;

pub use financials::{
    BalanceSheet, CashFlowStatement, DataPoint, Financials, IncomeStatement, StatementRecord,
};
pub use meta::{PaginatedResponse, Response};
pub use reference::TickerDetail;
