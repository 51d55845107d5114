//! Response envelopes shared by all endpoints.

use serde::{Deserialize, Serialize};

/// Envelope for list endpoints. Paging continues through `next_url` until
/// the API stops returning one.
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// The page of results. Missing in the body is treated as empty.
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,

    /// Request status string, e.g. `"OK"`.
    pub status: Option<String>,

    /// Opaque request identifier, useful when reporting API issues.
    pub request_id: Option<String>,

    /// Number of results in this page, when the API reports it.
    pub count: Option<i64>,

    /// URL of the next page. `None` on the last page.
    pub next_url: Option<String>,
}

/// Envelope for single-resource endpoints.
#[derive(Serialize, Deserialize)]
pub struct Response<T> {
    /// The resource, if found.
    pub results: Option<T>,

    /// Request status string, e.g. `"OK"`.
    pub status: Option<String>,

    /// Opaque request identifier.
    pub request_id: Option<String>,
}
