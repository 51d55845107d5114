//! Resolving free-form identifiers (tickers or company names) to tickers.

use thiserror::Error;

use crate::store::StoreError;

/// A metadata row surfaced to callers when resolution is ambiguous.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub ticker: String,
    pub name: Option<String>,
    pub active: bool,
}

/// Search primitives the resolver composes. Implemented by the store;
/// tests substitute an in-memory double.
pub trait MetadataCatalog {
    /// Exact ticker match, case-insensitive.
    fn find_ticker(&self, ticker: &str) -> Result<Option<Candidate>, StoreError>;

    /// Names containing the query as a contiguous phrase.
    fn match_name_phrase(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, StoreError>;

    /// Names containing every whitespace-separated token of the query.
    fn match_name_all_tokens(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>, StoreError>;

    /// Names starting with the query.
    fn match_name_prefix(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, StoreError>;
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("no ticker or company name matched {query:?}")]
    NotFound { query: String },
    #[error("{query:?} is ambiguous across {} candidates", candidates.len())]
    Ambiguous {
        query: String,
        candidates: Vec<Candidate>,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

const CANDIDATE_LIMIT: usize = 5;

/// Resolves `query` to a single ticker.
///
/// An exact ticker match short-circuits everything. Otherwise the name
/// tiers run in order (phrase, all-tokens, prefix) and the first non-empty
/// tier is kept. Within that tier: a unique case-insensitive full-name
/// match wins, then a unique active candidate; anything still unsettled is
/// ambiguous, even a tier of one, because a partial name hit is a guess.
pub fn resolve<C: MetadataCatalog>(catalog: &C, query: &str) -> Result<Candidate, ResolveError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ResolveError::NotFound {
            query: String::new(),
        });
    }

    if let Some(hit) = catalog.find_ticker(query)? {
        return Ok(hit);
    }

    let mut candidates = catalog.match_name_phrase(query, CANDIDATE_LIMIT)?;
    if candidates.is_empty() {
        candidates = catalog.match_name_all_tokens(query, CANDIDATE_LIMIT)?;
    }
    if candidates.is_empty() {
        candidates = catalog.match_name_prefix(query, CANDIDATE_LIMIT)?;
    }
    if candidates.is_empty() {
        return Err(ResolveError::NotFound {
            query: query.to_string(),
        });
    }

    let full_name: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| {
            c.name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(query))
        })
        .collect();
    if let [only] = full_name[..] {
        return Ok(only.clone());
    }

    let active: Vec<&Candidate> = candidates.iter().filter(|c| c.active).collect();
    if let [only] = active[..] {
        return Ok(only.clone());
    }

    Err(ResolveError::Ambiguous {
        query: query.to_string(),
        candidates,
    })
}
