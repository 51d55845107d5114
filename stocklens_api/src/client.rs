//! HTTP client for the market-data provider REST API.

use std::time::Duration;

use rand::Rng;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    query::{FinancialsQuery, Query, TickersQuery},
    types::{PaginatedResponse, Response, StatementRecord, TickerDetail},
    Error,
};

/// Pause between pages when walking a paginated result set, to keep
/// requests-per-minute modest on metered plans.
const PAGE_PACING: Duration = Duration::from_millis(1200);

/// HTTP client for the provider's reference endpoints (financial filings and
/// ticker metadata).
///
/// Authenticates with an `apiKey` query parameter. Requests that hit the
/// provider's rate limit (HTTP 429) are retried with exponential backoff and
/// jitter; authentication failures are surfaced immediately.
pub struct Client {
    /// Base URL for the API. Defaults to `https://api.polygon.io`.
    base_api_url: String,
    api_key: String,
}

struct RetryConfig {
    max_retries: usize,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl RetryConfig {
    fn from_env() -> Self {
        Self {
            max_retries: env_usize("STOCKLENS_RETRY_MAX", 5),
            base_delay_ms: env_u64("STOCKLENS_RETRY_BASE_MS", 2000),
            max_delay_ms: env_u64("STOCKLENS_RETRY_MAX_MS", 30000),
        }
    }

    fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(30) as u32;
        let exp = 1u64 << shift;
        let base = self
            .base_delay_ms
            .saturating_mul(exp)
            .min(self.max_delay_ms);
        let jitter = rand::thread_rng().gen_range(0.8..1.2);
        Duration::from_millis((base as f64 * jitter) as u64)
    }
}

impl Client {
    /// Creates a new client pointing at the production API.
    pub fn new(api_key: &str) -> Self {
        Self {
            base_api_url: "https://api.polygon.io".to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Creates a new client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        Self {
            base_api_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn get_url(&self, path: &str, query: Option<&impl Query>) -> Result<Url, Error> {
        let url = Url::parse(format!("{}{}", &self.base_api_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::RequestFailed
        })?;
        Ok(match query {
            Some(query) => query.add_to_url(&url),
            None => url,
        })
    }

    /// Ensures `apiKey` is present exactly once on the URL.
    fn with_key(&self, url: &Url) -> Url {
        if url.query_pairs().any(|(k, _)| k == "apiKey") {
            return url.clone();
        }
        let mut url = url.clone();
        url.query_pairs_mut().append_pair("apiKey", &self.api_key);
        url
    }

    async fn get_retrying<T>(&self, url: Url) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let cfg = RetryConfig::from_env();
        let mut attempt = 0usize;
        loop {
            match self.get_once(url.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt > cfg.max_retries || !is_retryable(&err) {
                        return Err(err);
                    }
                    let delay = cfg.delay_for_attempt(attempt);
                    tracing::warn!(
                        "request failed (attempt {}/{}), retrying in {:.1}s: {}",
                        attempt,
                        cfg.max_retries,
                        delay.as_secs_f64(),
                        err
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn get_once<T>(&self, url: Url) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        let resp = client
            .get(self.with_key(&url))
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get resource: {}", e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if status.as_u16() == 401 || status.as_u16() == 403 {
            tracing::error!("Authentication failed with status {}", status);
            return Err(Error::Unauthorized);
        }
        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        let parsed = serde_json::from_str::<T>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
            Error::RequestFailed
        })?;

        Ok(parsed)
    }

    /// Fetches one page of financial filings matching the given query.
    pub async fn get_financials(
        &self,
        query: &FinancialsQuery,
    ) -> Result<PaginatedResponse<StatementRecord>, Error> {
        let url = self.get_url("/vX/reference/financials", Some(query))?;
        self.get_retrying(url).await
    }

    /// Fetches every page of financial filings matching the given query,
    /// following `next_url` until the result set is exhausted.
    pub async fn get_all_financials(
        &self,
        query: &FinancialsQuery,
    ) -> Result<Vec<StatementRecord>, Error> {
        let mut page = self.get_financials(query).await?;
        let mut results = std::mem::take(&mut page.results);
        while let Some(next) = page.next_url {
            tokio::time::sleep(PAGE_PACING).await;
            let url = Url::parse(&next).map_err(|e| {
                tracing::error!("Invalid next_url from API: {}", e);
                Error::RequestFailed
            })?;
            page = self.get_retrying(url).await?;
            results.append(&mut page.results);
        }
        Ok(results)
    }

    /// Fetches reference metadata for a single ticker.
    pub async fn get_ticker_detail(&self, ticker: &str) -> Result<Response<TickerDetail>, Error> {
        let url = self.get_url(
            format!("/v3/reference/tickers/{}", ticker.to_uppercase()).as_str(),
            None::<&TickersQuery>,
        )?;
        self.get_retrying(url).await
    }

    /// Searches the ticker reference catalog.
    pub async fn get_tickers(
        &self,
        query: &TickersQuery,
    ) -> Result<PaginatedResponse<TickerDetail>, Error> {
        let url = self.get_url("/v3/reference/tickers", Some(query))?;
        self.get_retrying(url).await
    }
}

fn is_retryable(err: &Error) -> bool {
    match err {
        Error::RequestFailed => false,
        Error::Unauthorized => false,
        Error::HttpStatus { status, .. } => *status == 429 || *status >= 500,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(default)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
