//! Ranking of catalog entries against free-text queries.
//!
//! This crate provides:
//! - Similarity trait and the Jaccard measure
//! - SearchScope for choosing which book fields are matched
//! - SimilarityRanker for scoring and ordering a catalog snapshot
//!
//! ## Architecture
//! The ranker processes a query in stages:
//! 1. The query and each book's scoped text go through the same TextNormalizer
//! 2. Each book is scored by set similarity, in parallel
//! 3. Zero scores are dropped and the rest sorted, highest first
//!
//! The ranker never reads the ledger itself. Callers hand it a snapshot, so
//! a search never sees a half-applied mutation.
//!
//! ## Example Usage
//! ```ignore
//! use search::{SearchScope, SimilarityRanker};
//!
//! let snapshot = ledger.snapshot();
//! let ranker = SimilarityRanker::new();
//! let ids = ranker.search("great gatsby", SearchScope::All, snapshot.books.values());
//! ```

pub mod jaccard;
pub mod ranker;
pub mod scope;
pub mod traits;

// Re-export main types
pub use jaccard::{jaccard, Jaccard};
pub use ranker::{ScoredBook, SimilarityRanker};
pub use scope::{ParseScopeError, SearchScope};
pub use traits::Similarity;
