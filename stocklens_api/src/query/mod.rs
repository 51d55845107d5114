mod common;
mod financials;
mod tickers;

pub use common::{Query, QueryCommon, SortOrder};
pub use financials::{FinancialsQuery, Timeframe};
pub use tickers::TickersQuery;
