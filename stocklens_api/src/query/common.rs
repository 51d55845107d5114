//! Shared query infrastructure: the [`Query`] trait, [`QueryCommon`] fields, and [`SortOrder`].

use std::str::FromStr;

use url::Url;

/// Trait implemented by all query builders. Provides URL serialization and
/// shared builder methods for page size and sort order.
pub trait Query {
    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;

    /// Returns a mutable reference to the common query fields.
    fn get_common(&mut self) -> &mut QueryCommon;

    /// Sets the number of results per page.
    fn with_limit(mut self, limit: i64) -> Self
    where
        Self: Sized,
    {
        self.get_common().limit = Some(limit);
        self
    }

    /// Sets the field to sort results by (e.g. `filing_date`).
    fn with_sort(mut self, sort: &str) -> Self
    where
        Self: Sized,
    {
        self.get_common().sort = Some(sort.to_string());
        self
    }

    /// Sets the sort order (ascending or descending).
    fn with_order(mut self, order: SortOrder) -> Self
    where
        Self: Sized,
    {
        self.get_common().order = order;
        self
    }
}

/// Sort order for API results.
#[derive(Clone, Copy, Default)]
pub enum SortOrder {
    /// Ascending order (oldest/smallest first).
    Asc = 0,
    /// Descending order (newest/largest first). This is the default.
    #[default]
    Desc = 1,
}

impl SortOrder {
    /// API parameter value for this order.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(()),
        }
    }
}

/// Fields shared by all query types: page size and sort settings.
#[derive(Clone, Default)]
pub struct QueryCommon {
    /// Results per page. `None` uses the API default.
    pub limit: Option<i64>,
    /// Field to sort by. `None` uses the API default.
    pub sort: Option<String>,
    /// Sort order. Defaults to descending.
    pub order: SortOrder,
}

impl QueryCommon {
    /// Appends the common paging and sort parameters to the URL.
    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if let Some(limit) = self.limit {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        };
        if let Some(ref sort) = self.sort {
            url.query_pairs_mut().append_pair("sort", sort);
            url.query_pairs_mut()
                .append_pair("order", self.order.as_str());
        };
        url
    }
}
