//! Sector classification from SIC codes, with per-ticker overrides.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

/// The closed set of sector labels.
pub const SECTORS: [&str; 9] = [
    "Technology",
    "HealthCare",
    "Finance",
    "Energy",
    "Utilities",
    "Consumer",
    "Industrial",
    "Materials",
    "Real Estate",
];

/// Inclusive SIC ranges, evaluated top to bottom; first match wins.
/// Specific industry carve-outs come before the broad division fallbacks,
/// so e.g. prepackaged software (7372) is Technology rather than the
/// services division it nominally sits in.
const SIC_RULES: &[(u32, u32, &str)] = &[
    (3570, 3579, "Technology"),
    (3660, 3699, "Technology"),
    (3670, 3679, "Technology"),
    (7370, 7379, "Technology"),
    (2830, 2839, "HealthCare"),
    (3840, 3851, "HealthCare"),
    (8000, 8099, "HealthCare"),
    (4910, 4999, "Utilities"),
    (1310, 1389, "Energy"),
    (2900, 2999, "Energy"),
    (6500, 6799, "Real Estate"),
    (100, 999, "Industrial"),
    (1000, 1499, "Materials"),
    (1500, 1799, "Industrial"),
    (2000, 2399, "Consumer"),
    (2500, 2599, "Consumer"),
    (3000, 3199, "Consumer"),
    (2000, 3999, "Industrial"),
    (4000, 4899, "Industrial"),
    (5000, 5999, "Consumer"),
    (6000, 6499, "Finance"),
    (7800, 7999, "Consumer"),
    (7000, 7999, "Industrial"),
    (9100, 9729, "Industrial"),
];

/// Maps a four-digit SIC code to a sector label.
pub fn classify_sic(code: u32) -> Option<&'static str> {
    SIC_RULES
        .iter()
        .find(|(lo, hi, _)| (*lo..=*hi).contains(&code))
        .map(|(_, _, label)| *label)
}

const BUNDLED_OVERRIDES: &str = include_str!("../../../seed_data/sector_overrides.yml");

#[derive(Error, Debug)]
pub enum OverrideError {
    #[error("malformed sector override file: {0}")]
    Parse(#[from] serde_yml::Error),
    #[error("override for {ticker} names unknown sector {label:?}")]
    UnknownLabel { ticker: String, label: String },
}

/// Per-ticker sector assignments that take precedence over SIC derivation.
#[derive(Debug, Default)]
pub struct SectorOverrides {
    by_ticker: HashMap<String, String>,
}

impl SectorOverrides {
    /// Parses a `ticker: label` YAML document, rejecting labels outside
    /// the known sector set. Ticker keys are normalized to uppercase.
    pub fn parse(yaml: &str) -> Result<Self, OverrideError> {
        let raw: HashMap<String, String> = serde_yml::from_str(yaml)?;
        let mut by_ticker = HashMap::with_capacity(raw.len());
        for (ticker, label) in raw {
            if !SECTORS.contains(&label.as_str()) {
                return Err(OverrideError::UnknownLabel { ticker, label });
            }
            by_ticker.insert(ticker.to_uppercase(), label);
        }
        Ok(Self { by_ticker })
    }

    /// The override set compiled into the binary.
    pub fn bundled() -> Result<Self, OverrideError> {
        Self::parse(BUNDLED_OVERRIDES)
    }

    pub fn get(&self, ticker: &str) -> Option<&str> {
        self.by_ticker.get(&ticker.to_uppercase()).map(String::as_str)
    }
}

/// Sector for a ticker: override first, then SIC derivation. Only the
/// first four characters of the SIC string are significant; a head that
/// does not parse as a number classifies as nothing.
pub fn classify(
    overrides: &SectorOverrides,
    ticker: &str,
    sic_code: Option<&str>,
) -> Option<String> {
    if let Some(label) = overrides.get(ticker) {
        debug!(ticker, label, "sector from override");
        return Some(label.to_string());
    }
    let head: String = sic_code?.trim().chars().take(4).collect();
    let code = head.parse::<u32>().ok()?;
    classify_sic(code).map(str::to_string)
}
