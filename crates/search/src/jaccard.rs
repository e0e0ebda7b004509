//! Jaccard set similarity.

use crate::traits::Similarity;
use text::TokenSet;

/// `|A ∩ B| / |A ∪ B|`, or 0 when both sets are empty
#[derive(Debug, Clone, Copy, Default)]
pub struct Jaccard;

impl Similarity for Jaccard {
    fn name(&self) -> &str {
        "jaccard"
    }

    fn score(&self, query: &TokenSet, candidate: &TokenSet) -> f64 {
        jaccard(query, candidate)
    }
}

pub fn jaccard(a: &TokenSet, b: &TokenSet) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}
