//! SQLite document store for fundamentals, prices, metadata and summaries.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::core::resolver::{Candidate, MetadataCatalog};
use crate::types::{FiscalRecord, PricePoint, SummaryDoc, TickerMeta};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("date parse error: {0}")]
    Date(#[from] chrono::ParseError),
}

/// Screener criteria over stored summaries. Unset fields do not filter.
#[derive(Clone, Debug, Default)]
pub struct ScreenFilter {
    pub max_pe: Option<f64>,
    pub min_price_growth_5y: Option<f64>,
    pub min_revenue_growth_5y: Option<f64>,
    pub sector: Option<String>,
}

pub struct Store {
    conn: Connection,
}

const DATE_FMT: &str = "%Y-%m-%d";

fn date_str(d: NaiveDate) -> String {
    d.format(DATE_FMT).to_string()
}

fn opt_date_str(d: Option<NaiveDate>) -> Option<String> {
    d.map(date_str)
}

fn parse_date(s: &str) -> Result<NaiveDate, StoreError> {
    Ok(NaiveDate::parse_from_str(s, DATE_FMT)?)
}

fn parse_opt_date(s: Option<String>) -> Result<Option<NaiveDate>, StoreError> {
    s.as_deref().map(parse_date).transpose()
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<(), StoreError> {
        // Migrations run before the idempotent DDL so later schema versions
        // can add columns the base DDL's indexes reference.
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.pragma_update(None, "user_version", 1)?;
        }

        let schema = include_str!("../../schema/sqlite.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM ingest_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn set_meta(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO ingest_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn upsert_fiscal_records(&mut self, records: &[FiscalRecord]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO fundamentals (
                    ticker, fiscal_year, fiscal_period, filing_date, start_date,
                    end_date, company_name, revenues, operating_income, net_income,
                    basic_eps, diluted_eps, assets, liabilities, equity, cash_flow,
                    basic_shares, diluted_shares
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
                 ON CONFLICT(ticker, fiscal_year, fiscal_period, filing_date) DO UPDATE SET
                    start_date = excluded.start_date,
                    end_date = excluded.end_date,
                    company_name = excluded.company_name,
                    revenues = excluded.revenues,
                    operating_income = excluded.operating_income,
                    net_income = excluded.net_income,
                    basic_eps = excluded.basic_eps,
                    diluted_eps = excluded.diluted_eps,
                    assets = excluded.assets,
                    liabilities = excluded.liabilities,
                    equity = excluded.equity,
                    cash_flow = excluded.cash_flow,
                    basic_shares = excluded.basic_shares,
                    diluted_shares = excluded.diluted_shares",
            )?;
            for r in records {
                stmt.execute(params![
                    r.ticker,
                    r.fiscal_year,
                    r.fiscal_period.as_str(),
                    opt_date_str(r.filing_date),
                    opt_date_str(r.start_date),
                    date_str(r.end_date),
                    r.company_name,
                    r.revenues,
                    r.operating_income,
                    r.net_income,
                    r.basic_eps,
                    r.diluted_eps,
                    r.assets,
                    r.liabilities,
                    r.equity,
                    r.cash_flow,
                    r.basic_shares,
                    r.diluted_shares,
                ])?;
            }
        }
        tx.commit()?;
        debug!(count = records.len(), "upserted fiscal records");
        Ok(())
    }

    pub fn upsert_price_points(&mut self, points: &[PricePoint]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO prices (
                    ticker, date, open, high, low, close, adj_close, volume,
                    dividend_yield, pe_ratio
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(ticker, date) DO UPDATE SET
                    open = excluded.open,
                    high = excluded.high,
                    low = excluded.low,
                    close = excluded.close,
                    adj_close = excluded.adj_close,
                    volume = excluded.volume,
                    dividend_yield = excluded.dividend_yield,
                    pe_ratio = excluded.pe_ratio",
            )?;
            for p in points {
                stmt.execute(params![
                    p.ticker,
                    date_str(p.date),
                    p.open,
                    p.high,
                    p.low,
                    p.close,
                    p.adj_close,
                    p.volume,
                    p.dividend_yield,
                    p.pe_ratio,
                ])?;
            }
        }
        tx.commit()?;
        debug!(count = points.len(), "upserted price points");
        Ok(())
    }

    pub fn upsert_metadata(&self, meta: &TickerMeta) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO metadata (
                ticker, name, active, security_type, primary_exchange,
                currency_name, sic_code, sic_description, sector,
                share_class_shares_outstanding, weighted_shares_outstanding,
                updated_utc
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(ticker) DO UPDATE SET
                name = excluded.name,
                active = excluded.active,
                security_type = excluded.security_type,
                primary_exchange = excluded.primary_exchange,
                currency_name = excluded.currency_name,
                sic_code = excluded.sic_code,
                sic_description = excluded.sic_description,
                sector = excluded.sector,
                share_class_shares_outstanding = excluded.share_class_shares_outstanding,
                weighted_shares_outstanding = excluded.weighted_shares_outstanding,
                updated_utc = excluded.updated_utc",
            params![
                meta.ticker,
                meta.name,
                meta.active,
                meta.security_type,
                meta.primary_exchange,
                meta.currency_name,
                meta.sic_code,
                meta.sic_description,
                meta.sector,
                meta.share_class_shares_outstanding,
                meta.weighted_shares_outstanding,
                meta.updated_utc,
            ],
        )?;
        Ok(())
    }

    pub fn get_metadata(&self, ticker: &str) -> Result<Option<TickerMeta>, StoreError> {
        self.conn
            .query_row(
                "SELECT ticker, name, active, security_type, primary_exchange,
                        currency_name, sic_code, sic_description, sector,
                        share_class_shares_outstanding, weighted_shares_outstanding,
                        updated_utc
                 FROM metadata WHERE ticker = UPPER(?1)",
                params![ticker],
                |row| {
                    Ok(TickerMeta {
                        ticker: row.get(0)?,
                        name: row.get(1)?,
                        active: row.get(2)?,
                        security_type: row.get(3)?,
                        primary_exchange: row.get(4)?,
                        currency_name: row.get(5)?,
                        sic_code: row.get(6)?,
                        sic_description: row.get(7)?,
                        sector: row.get(8)?,
                        share_class_shares_outstanding: row.get(9)?,
                        weighted_shares_outstanding: row.get(10)?,
                        updated_utc: row.get(11)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn fiscal_records(&self, ticker: &str) -> Result<Vec<FiscalRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT ticker, fiscal_year, fiscal_period, filing_date, start_date,
                    end_date, company_name, revenues, operating_income, net_income,
                    basic_eps, diluted_eps, assets, liabilities, equity, cash_flow,
                    basic_shares, diluted_shares
             FROM fundamentals WHERE ticker = UPPER(?1)
             ORDER BY end_date, filing_date",
        )?;
        let rows = stmt.query_map(params![ticker], fiscal_row)?;
        let mut records = Vec::new();
        for row in rows {
            let raw = row?;
            records.push(raw.try_into_record()?);
        }
        Ok(records)
    }

    /// The daily price series, ascending, optionally restricted to dates
    /// strictly after `since`.
    pub fn price_points(
        &self,
        ticker: &str,
        since: Option<NaiveDate>,
    ) -> Result<Vec<PricePoint>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT ticker, date, open, high, low, close, adj_close, volume,
                    dividend_yield, pe_ratio
             FROM prices
             WHERE ticker = UPPER(?1) AND (?2 IS NULL OR date > ?2)
             ORDER BY date",
        )?;
        let rows = stmt.query_map(params![ticker, opt_date_str(since)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<f64>>(2)?,
                row.get::<_, Option<f64>>(3)?,
                row.get::<_, Option<f64>>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, Option<f64>>(6)?,
                row.get::<_, i64>(7)?,
                row.get::<_, Option<f64>>(8)?,
                row.get::<_, Option<f64>>(9)?,
            ))
        })?;
        let mut points = Vec::new();
        for row in rows {
            let (ticker, date, open, high, low, close, adj_close, volume, dy, pe) = row?;
            points.push(PricePoint {
                ticker,
                date: parse_date(&date)?,
                open,
                high,
                low,
                close,
                adj_close,
                volume,
                dividend_yield: dy,
                pe_ratio: pe,
            });
        }
        Ok(points)
    }

    pub fn latest_price_date(&self, ticker: &str) -> Result<Option<NaiveDate>, StoreError> {
        let s: Option<String> = self.conn.query_row(
            "SELECT MAX(date) FROM prices WHERE ticker = UPPER(?1)",
            params![ticker],
            |row| row.get(0),
        )?;
        parse_opt_date(s)
    }

    pub fn latest_filing_date(&self, ticker: &str) -> Result<Option<NaiveDate>, StoreError> {
        let s: Option<String> = self.conn.query_row(
            "SELECT MAX(filing_date) FROM fundamentals WHERE ticker = UPPER(?1)",
            params![ticker],
            |row| row.get(0),
        )?;
        parse_opt_date(s)
    }

    pub fn distinct_fundamentals_tickers(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT ticker FROM fundamentals ORDER BY ticker")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    /// Replaces the summary document for a ticker wholesale.
    pub fn put_summary(&self, ticker: &str, doc: &SummaryDoc) -> Result<(), StoreError> {
        let json = serde_json::to_string(doc)?;
        self.conn.execute(
            "INSERT INTO summaries (ticker, doc) VALUES (UPPER(?1), ?2)
             ON CONFLICT(ticker) DO UPDATE SET doc = excluded.doc",
            params![ticker, json],
        )?;
        Ok(())
    }

    pub fn get_summary(&self, ticker: &str) -> Result<Option<SummaryDoc>, StoreError> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT doc FROM summaries WHERE ticker = UPPER(?1)",
                params![ticker],
                |row| row.get(0),
            )
            .optional()?;
        Ok(json.as_deref().map(serde_json::from_str).transpose()?)
    }

    /// Screens stored summaries through the generated query columns, never
    /// deserializing documents that cannot match.
    pub fn screen(&self, filter: &ScreenFilter) -> Result<Vec<SummaryDoc>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT doc FROM summaries
             WHERE (?1 IS NULL OR ttm_pe_ratio <= ?1)
               AND (?2 IS NULL OR price_growth_5y >= ?2)
               AND (?3 IS NULL OR revenue_growth_5y >= ?3)
               AND (?4 IS NULL OR sector = ?4)
             ORDER BY ticker",
        )?;
        let rows = stmt.query_map(
            params![
                filter.max_pe,
                filter.min_price_growth_5y,
                filter.min_revenue_growth_5y,
                filter.sector,
            ],
            |row| row.get::<_, String>(0),
        )?;
        let mut docs = Vec::new();
        for row in rows {
            docs.push(serde_json::from_str(&row?)?);
        }
        Ok(docs)
    }
}

fn candidate_row(row: &Row<'_>) -> rusqlite::Result<Candidate> {
    Ok(Candidate {
        ticker: row.get(0)?,
        name: row.get(1)?,
        active: row.get(2)?,
    })
}

impl MetadataCatalog for Store {
    fn find_ticker(&self, ticker: &str) -> Result<Option<Candidate>, StoreError> {
        self.conn
            .query_row(
                "SELECT ticker, name, active FROM metadata WHERE ticker = UPPER(?1)",
                params![ticker],
                candidate_row,
            )
            .optional()
            .map_err(Into::into)
    }

    fn match_name_phrase(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT ticker, name, active FROM metadata
             WHERE name LIKE '%' || ?1 || '%'
             ORDER BY ticker LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![query, limit as i64], candidate_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn match_name_all_tokens(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>, StoreError> {
        // LIKE per token, ANDed together. Token count is user-controlled so
        // the SQL is assembled with placeholders only.
        let tokens: Vec<&str> = query.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let clauses = vec!["name LIKE '%' || ? || '%'"; tokens.len()].join(" AND ");
        let sql = format!(
            "SELECT ticker, name, active FROM metadata WHERE {clauses} ORDER BY ticker LIMIT ?"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let limit = limit as i64;
        let mut values: Vec<&dyn rusqlite::ToSql> =
            tokens.iter().map(|t| t as &dyn rusqlite::ToSql).collect();
        values.push(&limit);
        let rows = stmt.query_map(&values[..], candidate_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn match_name_prefix(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT ticker, name, active FROM metadata
             WHERE name LIKE ?1 || '%'
             ORDER BY ticker LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![query, limit as i64], candidate_row)?;
        Ok(rows.collect::<Result<_, _>>()?)
    }
}

struct FiscalRow {
    ticker: String,
    fiscal_year: i32,
    fiscal_period: String,
    filing_date: Option<String>,
    start_date: Option<String>,
    end_date: String,
    company_name: Option<String>,
    revenues: Option<f64>,
    operating_income: Option<f64>,
    net_income: Option<f64>,
    basic_eps: Option<f64>,
    diluted_eps: Option<f64>,
    assets: Option<f64>,
    liabilities: Option<f64>,
    equity: Option<f64>,
    cash_flow: Option<f64>,
    basic_shares: Option<f64>,
    diluted_shares: Option<f64>,
}

fn fiscal_row(row: &Row<'_>) -> rusqlite::Result<FiscalRow> {
    Ok(FiscalRow {
        ticker: row.get(0)?,
        fiscal_year: row.get(1)?,
        fiscal_period: row.get(2)?,
        filing_date: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        company_name: row.get(6)?,
        revenues: row.get(7)?,
        operating_income: row.get(8)?,
        net_income: row.get(9)?,
        basic_eps: row.get(10)?,
        diluted_eps: row.get(11)?,
        assets: row.get(12)?,
        liabilities: row.get(13)?,
        equity: row.get(14)?,
        cash_flow: row.get(15)?,
        basic_shares: row.get(16)?,
        diluted_shares: row.get(17)?,
    })
}

impl FiscalRow {
    fn try_into_record(self) -> Result<FiscalRecord, StoreError> {
        // A stored period string that fails to parse means the table was
        // written by something else entirely; surface it as a sqlite-level
        // type mismatch rather than silently dropping the row.
        let fiscal_period = self.fiscal_period.parse().map_err(|()| {
            StoreError::Sqlite(rusqlite::Error::InvalidColumnType(
                2,
                "fiscal_period".to_string(),
                rusqlite::types::Type::Text,
            ))
        })?;
        Ok(FiscalRecord {
            ticker: self.ticker,
            company_name: self.company_name,
            fiscal_year: self.fiscal_year,
            fiscal_period,
            filing_date: parse_opt_date(self.filing_date)?,
            start_date: parse_opt_date(self.start_date)?,
            end_date: parse_date(&self.end_date)?,
            revenues: self.revenues,
            operating_income: self.operating_income,
            net_income: self.net_income,
            basic_eps: self.basic_eps,
            diluted_eps: self.diluted_eps,
            assets: self.assets,
            liabilities: self.liabilities,
            equity: self.equity,
            cash_flow: self.cash_flow,
            basic_shares: self.basic_shares,
            diluted_shares: self.diluted_shares,
        })
    }
}
