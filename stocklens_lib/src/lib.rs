//! Library layer for StockLens: document store, ingest pipeline, and the
//! derived-metrics core.
//!
//! Wraps the `stocklens_api` provider client with a SQLite-backed document
//! store and pure computation over stored fundamentals and daily prices:
//! quarterly EPS reconstruction, trailing-twelve-month aggregation, price
//! alignment, growth and ratio metrics, ticker resolution, and sector
//! classification.

pub mod core;
pub mod error;
pub mod ingest;
pub mod payload;
pub mod store;
pub mod summary;
pub mod types;
pub mod yahoo;

pub use stocklens_api;
pub use stocklens_api::{FinancialsQuery, Query, SortOrder, TickersQuery, Timeframe};

pub use crate::core::resolver::{resolve, Candidate, MetadataCatalog, ResolveError};
pub use error::StockLensError;
pub use ingest::{parse_ticker_list, Ingestor, SeedStats};
pub use payload::{build_payload, history, TickerPayload};
pub use store::{ScreenFilter, Store, StoreError};
pub use summary::{build_summary, rebuild_all, RebuildStats};
pub use types::{
    AnnotatedPrice, AnnualRevenue, FiscalPeriod, FiscalRecord, PricePoint, QuarterPoint,
    QuarterlyRow, SummaryDoc, TickerMeta, TtmPoint,
};
