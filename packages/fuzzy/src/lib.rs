#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fuzzy string similarity for loosely-labeled extracted content.
//!
//! Header cells, anchor lines, and footers in vendor price sheets drift
//! between editions (stray spaces, case changes, accents dropped by the
//! extractor). Every comparison in the extraction pipeline goes through
//! [`ratio`], which case-folds both sides and scores them on a 0–100 scale
//! using normalized Levenshtein similarity.

/// Score at or above which two strings are considered the same.
pub const DEFAULT_THRESHOLD: u8 = 75;

/// Returns the similarity of `a` and `b` in `0..=100`.
///
/// Both inputs are lowercased before comparison, so the score is symmetric
/// and case-insensitive. Two empty strings score 100.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn ratio(a: &str, b: &str) -> u8 {
    let similarity = strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase());
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Whether `a` and `b` score at least `threshold`.
#[must_use]
pub fn is_similar(a: &str, b: &str, threshold: u8) -> bool {
    ratio(a, b) >= threshold
}

/// The winning candidate of a [`best_match`] search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityMatch {
    /// Identity of the candidate (column or row index).
    pub index: usize,
    /// Score of the candidate against the query.
    pub score: u8,
}

/// Finds the candidate most similar to `query`.
///
/// A candidate is eligible when it scores at least `threshold` and strictly
/// more than the best candidate seen so far, so ties keep the earliest
/// candidate in iteration order.
#[must_use]
pub fn best_match<'a, I>(query: &str, candidates: I, threshold: u8) -> Option<SimilarityMatch>
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    let mut best: Option<SimilarityMatch> = None;

    for (index, candidate) in candidates {
        let score = ratio(query, candidate);
        if score < threshold {
            continue;
        }
        if best.is_none_or(|b| score > b.score) {
            best = Some(SimilarityMatch { index, score });
        }
    }

    best
}
