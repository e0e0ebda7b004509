//! Core traits for ranking.
//!
//! This module defines the Similarity trait so the ranker can be run with
//! a different set-similarity measure than Jaccard.

use text::TokenSet;

/// A similarity measure between two token sets.
///
/// ## Design Note
/// - `Send + Sync` lets the ranker score books in parallel with one shared measure
/// - Scores are expected in `[0, 1]`; the ranker drops books scoring 0
pub trait Similarity: Send + Sync {
    /// Returns the name of this measure (for logging/debugging)
    fn name(&self) -> &str;

    /// Score a query token set against a book's token set
    fn score(&self, query: &TokenSet, candidate: &TokenSet) -> f64;
}
