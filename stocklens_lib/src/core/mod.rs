//! The derived-metrics core: pure, synchronous functions over immutable
//! input records. No component here performs I/O or mutates caller data;
//! collaborators (the catalog, the store) are passed in explicitly.

pub mod align;
pub mod fundamentals;
pub mod growth;
pub mod ratios;
pub mod resolver;
pub mod sector;

/// Rounds to two decimal places. Applied only at output boundaries;
/// intermediate arithmetic stays unrounded.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Rounds to four decimal places.
pub(crate) fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_helpers() {
        assert_eq!(round2(4.299_999_9), 4.3);
        assert_eq!(round2(-1.005), -1.0);
        assert_eq!(round4(0.259_921_04), 0.2599);
    }
}
