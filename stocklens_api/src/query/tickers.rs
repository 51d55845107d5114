//! Query builder for the `/v3/reference/tickers` search endpoint.

use url::Url;

use super::common::{Query, QueryCommon};

/// Query for the ticker reference catalog: free-text search over symbols
/// and company names, optionally restricted to active listings.
#[derive(Clone, Default)]
pub struct TickersQuery {
    /// Shared paging and sort fields.
    pub common: QueryCommon,
    /// Free-text search over ticker symbols and company names.
    pub search: Option<String>,
    /// Restrict to active (`true`) or delisted (`false`) tickers.
    pub active: Option<bool>,
}

impl TickersQuery {
    /// Sets the free-text search term.
    pub fn with_search(mut self, search: &str) -> Self {
        self.search = Some(search.to_string());
        self
    }

    /// Restricts results by listing status.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }
}

impl Query for TickersQuery {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = self.common.add_to_url(url);
        if let Some(ref search) = self.search {
            url.query_pairs_mut().append_pair("search", search);
        }
        if let Some(active) = self.active {
            url.query_pairs_mut()
                .append_pair("active", if active { "true" } else { "false" });
        }
        url
    }

    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
}
