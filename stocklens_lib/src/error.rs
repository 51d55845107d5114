//! Error types for the library layer.

use std::fmt;

use crate::core::resolver::ResolveError;
use crate::store::StoreError;
use crate::yahoo::YahooError;

/// Errors produced by the library layer, wrapping upstream API errors
/// and adding store, price-feed, and input validation failures.
#[derive(Debug)]
pub enum StockLensError {
    /// An error from the underlying provider API client.
    Api(stocklens_api::Error),
    /// A document store operation failed.
    Store(StoreError),
    /// The daily price feed failed.
    Yahoo(YahooError),
    /// Ticker resolution failed.
    Resolve(ResolveError),
    /// JSON serialization or deserialization failed.
    Serialization(serde_json::Error),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl fmt::Display for StockLensError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::Store(e) => write!(f, "Store error: {}", e),
            Self::Yahoo(e) => write!(f, "Price feed error: {}", e),
            Self::Resolve(e) => write!(f, "{}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for StockLensError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Store(e) => Some(e),
            Self::Yahoo(e) => Some(e),
            Self::Resolve(e) => Some(e),
            Self::Serialization(e) => Some(e),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<stocklens_api::Error> for StockLensError {
    fn from(e: stocklens_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<StoreError> for StockLensError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<YahooError> for StockLensError {
    fn from(e: YahooError) -> Self {
        Self::Yahoo(e)
    }
}

impl From<ResolveError> for StockLensError {
    fn from(e: ResolveError) -> Self {
        Self::Resolve(e)
    }
}

impl From<serde_json::Error> for StockLensError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}
