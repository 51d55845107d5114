use chrono::NaiveDate;
use stocklens_api::{FinancialsQuery, Query, SortOrder, TickersQuery, Timeframe};
use url::Url;

fn base_url() -> Url {
    Url::parse("https://example.com/vX/reference/financials").unwrap()
}

#[test]
fn financials_query_defaults() {
    let url = FinancialsQuery::default().add_to_url(&base_url());
    assert_eq!(url.query(), None);
}

#[test]
fn financials_query_with_ticker_uppercases() {
    let url = FinancialsQuery::default()
        .with_ticker("aapl")
        .add_to_url(&base_url());
    assert!(url.query().unwrap().contains("ticker=AAPL"));
}

#[test]
fn financials_query_with_filing_date_range() {
    let url = FinancialsQuery::default()
        .with_filing_date_gte(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
        .with_filing_date_lte(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
        .add_to_url(&base_url());
    let query = url.query().unwrap();
    assert!(query.contains("filing_date.gte=2020-01-01"));
    assert!(query.contains("filing_date.lte=2024-12-31"));
}

#[test]
fn financials_query_with_timeframe() {
    let url = FinancialsQuery::default()
        .with_timeframe(Timeframe::Annual)
        .add_to_url(&base_url());
    assert!(url.query().unwrap().contains("timeframe=annual"));

    let url = FinancialsQuery::default()
        .with_timeframe(Timeframe::Quarterly)
        .add_to_url(&base_url());
    assert!(url.query().unwrap().contains("timeframe=quarterly"));
}

#[test]
fn financials_query_sort_and_limit() {
    let url = FinancialsQuery::default()
        .with_limit(100)
        .with_sort("filing_date")
        .with_order(SortOrder::Desc)
        .add_to_url(&base_url());
    let query = url.query().unwrap();
    assert!(query.contains("limit=100"));
    assert!(query.contains("sort=filing_date"));
    assert!(query.contains("order=desc"));
}

#[test]
fn tickers_query_search_and_active() {
    let url = TickersQuery::default()
        .with_search("apple")
        .with_active(true)
        .with_limit(5)
        .add_to_url(&Url::parse("https://example.com/v3/reference/tickers").unwrap());
    let query = url.query().unwrap();
    assert!(query.contains("search=apple"));
    assert!(query.contains("active=true"));
    assert!(query.contains("limit=5"));
}

#[test]
fn sort_order_parses_from_str() {
    assert!(matches!("asc".parse::<SortOrder>(), Ok(SortOrder::Asc)));
    assert!(matches!("desc".parse::<SortOrder>(), Ok(SortOrder::Desc)));
    assert!("up".parse::<SortOrder>().is_err());
}
