use std::sync::Once;

use stocklens_api::{Client, Error, FinancialsQuery, TickersQuery};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

static RETRY_ENV: Once = Once::new();

/// Shrink retry backoff so failure-path tests finish quickly.
fn fast_retries() {
    RETRY_ENV.call_once(|| {
        std::env::set_var("STOCKLENS_RETRY_MAX", "2");
        std::env::set_var("STOCKLENS_RETRY_BASE_MS", "10");
        std::env::set_var("STOCKLENS_RETRY_MAX_MS", "20");
    });
}

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[tokio::test]
async fn get_financials_success() {
    fast_retries();
    let mock_server = MockServer::start().await;
    let body = load_fixture("financials.json");

    Mock::given(method("GET"))
        .and(path("/vX/reference/financials"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "test-key");
    let resp = client
        .get_financials(&FinancialsQuery::default().with_ticker("aapl"))
        .await
        .unwrap();

    assert_eq!(resp.results.len(), 2);
    assert_eq!(resp.results[0].primary_ticker(), Some("AAPL"));
    assert_eq!(resp.results[0].fiscal_period.as_deref(), Some("Q1"));
    assert_eq!(resp.results[0].financials.diluted_eps(), Some(2.18));
    // Q2 filing omits the cash flow statement entirely.
    assert_eq!(resp.results[1].financials.net_cash_flow(), None);
}

#[tokio::test]
async fn get_all_financials_follows_next_url() {
    fast_retries();
    let mock_server = MockServer::start().await;

    let mut page1: serde_json::Value =
        serde_json::from_str(&load_fixture("financials.json")).unwrap();
    page1["next_url"] = serde_json::Value::String(format!(
        "{}/vX/reference/financials?cursor=abc",
        mock_server.uri()
    ));
    let page2 = serde_json::json!({
        "results": [{
            "tickers": ["AAPL"],
            "fiscal_year": "2024",
            "fiscal_period": "Q3",
            "filing_date": "2024-08-02",
            "end_date": "2024-06-29",
            "financials": {}
        }],
        "status": "OK"
    });

    Mock::given(method("GET"))
        .and(path("/vX/reference/financials"))
        .and(query_param("cursor", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page2))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vX/reference/financials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page1))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "test-key");
    let results = client
        .get_all_financials(&FinancialsQuery::default().with_ticker("AAPL"))
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[2].fiscal_period.as_deref(), Some("Q3"));
}

#[tokio::test]
async fn get_financials_retries_rate_limit() {
    fast_retries();
    let mock_server = MockServer::start().await;
    let body = load_fixture("financials.json");

    Mock::given(method("GET"))
        .and(path("/vX/reference/financials"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vX/reference/financials"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "test-key");
    let resp = client
        .get_financials(&FinancialsQuery::default())
        .await
        .unwrap();
    assert_eq!(resp.results.len(), 2);
}

#[tokio::test]
async fn get_financials_server_error() {
    fast_retries();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vX/reference/financials"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "test-key");
    let result = client.get_financials(&FinancialsQuery::default()).await;
    assert!(matches!(
        result.unwrap_err(),
        Error::HttpStatus { status: 500, .. }
    ));
}

#[tokio::test]
async fn unauthorized_is_not_retried() {
    fast_retries();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vX/reference/financials"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unknown api key"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "bad-key");
    let result = client.get_financials(&FinancialsQuery::default()).await;
    assert!(matches!(result.unwrap_err(), Error::Unauthorized));
}

#[tokio::test]
async fn get_financials_malformed_json() {
    fast_retries();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vX/reference/financials"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not valid json}"))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "test-key");
    let result = client.get_financials(&FinancialsQuery::default()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn get_ticker_detail_success() {
    fast_retries();
    let mock_server = MockServer::start().await;
    let body = load_fixture("ticker_detail.json");

    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers/AAPL"))
        .and(query_param("apiKey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "test-key");
    let resp = client.get_ticker_detail("aapl").await.unwrap();
    let detail = resp.results.unwrap();
    assert_eq!(detail.ticker, "AAPL");
    assert_eq!(detail.sic_code.as_deref(), Some("3571"));
    assert_eq!(detail.active, Some(true));
}

#[tokio::test]
async fn get_tickers_search_success() {
    fast_retries();
    let mock_server = MockServer::start().await;
    let body = load_fixture("tickers.json");

    Mock::given(method("GET"))
        .and(path("/v3/reference/tickers"))
        .and(query_param("search", "apple"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "test-key");
    let resp = client
        .get_tickers(&TickersQuery::default().with_search("apple"))
        .await
        .unwrap();
    assert_eq!(resp.results.len(), 2);
    assert_eq!(resp.results[1].ticker, "APLE");
}
