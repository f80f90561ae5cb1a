//! # Folio Range Compression
//!
//! Folio sets travel in reports as minimal contiguous `(start, end)`
//! pairs. Compression sorts and deduplicates; a new range starts whenever
//! the next folio is not exactly `previous + 1`. Expansion is the exact
//! inverse.

/// A compressed set of folios: sorted, minimal, non-overlapping
/// inclusive ranges.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FolioRanges(Vec<(i64, i64)>);

impl FolioRanges {
    /// Compress an arbitrary folio set.
    pub fn compress(folios: &[i64]) -> Self {
        let mut sorted: Vec<i64> = folios.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut ranges = Vec::new();
        let mut iter = sorted.into_iter();
        if let Some(first) = iter.next() {
            let mut start = first;
            let mut end = first;
            for folio in iter {
                if folio == end + 1 {
                    end = folio;
                } else {
                    ranges.push((start, end));
                    start = folio;
                    end = folio;
                }
            }
            ranges.push((start, end));
        }
        Self(ranges)
    }

    /// Build directly from already-ordered disjoint pairs.
    pub(crate) fn from_pairs(pairs: Vec<(i64, i64)>) -> Self {
        Self(pairs)
    }

    /// Expand back into the individual folios.
    pub fn expand(&self) -> Vec<i64> {
        self.0
            .iter()
            .flat_map(|&(start, end)| start..=end)
            .collect()
    }

    /// The `(start, end)` pairs.
    pub fn pairs(&self) -> &[(i64, i64)] {
        &self.0
    }

    /// Total folio count covered.
    pub fn count(&self) -> i64 {
        self.0.iter().map(|&(start, end)| end - start + 1).sum()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Expanding the compressed pairs reproduces exactly the original
        /// set, for arbitrary non-contiguous inputs.
        #[test]
        fn compress_then_expand_is_identity(
            folios in proptest::collection::btree_set(1i64..10_000, 0..200)
        ) {
            let sorted: Vec<i64> = folios.into_iter().collect();
            let ranges = FolioRanges::compress(&sorted);
            prop_assert_eq!(ranges.expand(), sorted);
        }

        /// Ranges are minimal: consecutive pairs never touch.
        #[test]
        fn ranges_are_minimal(
            folios in proptest::collection::btree_set(1i64..10_000, 0..200)
        ) {
            let sorted: Vec<i64> = folios.into_iter().collect();
            let ranges = FolioRanges::compress(&sorted);
            for window in ranges.pairs().windows(2) {
                prop_assert!(window[0].1 + 1 < window[1].0);
            }
            for &(start, end) in ranges.pairs() {
                prop_assert!(start <= end);
            }
        }
    }
}
