//! The SimilarityRanker scores catalog entries against a free-text query.

use crate::jaccard::Jaccard;
use crate::scope::SearchScope;
use crate::traits::Similarity;
use catalog::{Book, BookId};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;
use text::TextNormalizer;
use tracing::{debug, instrument};

/// A book id with its similarity to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredBook {
    pub book_id: BookId,
    pub score: f64,
}

/// Ranks books by token-set similarity to a query.
///
/// ## Usage
/// ```ignore
/// let ranker = SimilarityRanker::new();
/// let ids = ranker.search("great gatsby", SearchScope::Title, &books);
/// ```
#[derive(Clone)]
pub struct SimilarityRanker {
    normalizer: TextNormalizer,
    similarity: Arc<dyn Similarity>,
}

impl SimilarityRanker {
    /// Create a ranker using Jaccard similarity
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            similarity: Arc::new(Jaccard),
        }
    }

    /// Swap the similarity measure (builder pattern)
    pub fn with_similarity(mut self, similarity: impl Similarity + 'static) -> Self {
        self.similarity = Arc::new(similarity);
        self
    }

    pub fn similarity_name(&self) -> &str {
        self.similarity.name()
    }

    /// Score and order books against `query`.
    ///
    /// ## Algorithm
    /// 1. Normalize the query into token set Q
    /// 2. For each book (in parallel), normalize the scoped text into F and score Q against F
    /// 3. Keep books scoring strictly above 0
    /// 4. Stable sort by descending score, so ties keep catalog order
    ///
    /// Pure: an empty query or catalog yields an empty result.
    #[instrument(skip(self, catalog), fields(similarity = self.similarity.name()))]
    pub fn rank<'a, I>(&self, query: &str, scope: SearchScope, catalog: I) -> Vec<ScoredBook>
    where
        I: IntoIterator<Item = &'a Book>,
    {
        let query_tokens = self.normalizer.normalize(query);
        if query_tokens.is_empty() {
            debug!("query normalized to no tokens");
            return Vec::new();
        }

        let books: Vec<&Book> = catalog.into_iter().collect();
        let mut scored: Vec<ScoredBook> = books
            .par_iter()
            .filter_map(|book| {
                let tokens = self.normalizer.normalize(&scope.searchable_text(book));
                let score = self.similarity.score(&query_tokens, &tokens);
                (score > 0.0).then_some(ScoredBook {
                    book_id: book.id,
                    score,
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        debug!(
            query_tokens = query_tokens.len(),
            candidates = books.len(),
            matches = scored.len(),
            "ranked catalog"
        );
        scored
    }

    /// Ranked book ids only
    pub fn search<'a, I>(&self, query: &str, scope: SearchScope, catalog: I) -> Vec<BookId>
    where
        I: IntoIterator<Item = &'a Book>,
    {
        self.rank(query, scope, catalog)
            .into_iter()
            .map(|scored| scored.book_id)
            .collect()
    }
}

impl Default for SimilarityRanker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use text::TokenSet;

    fn book(id: u32, title: &str, author: &str, genre: &str) -> Book {
        Book {
            id: BookId(id),
            title: title.to_string(),
            author: author.to_string(),
            isbn: String::new(),
            genre: genre.to_string(),
            copies: 1,
            available: 1,
        }
    }

    fn catalog() -> Vec<Book> {
        vec![
            book(1, "The Great Gatsby", "F. Scott Fitzgerald", "Classic"),
            book(2, "Great Expectations", "Charles Dickens", "Classic"),
            book(3, "Dune", "Frank Herbert", "Science Fiction"),
            book(4, "Gatsby", "Anonymous", "Parody"),
        ]
    }

    #[test]
    fn test_exact_title_scores_one() {
        let ranker = SimilarityRanker::new();
        let ranked = ranker.rank("the great gatsby!", SearchScope::Title, &catalog());
        assert_eq!(ranked[0].book_id, BookId(1));
        assert_eq!(ranked[0].score, 1.0);
    }

    #[test]
    fn test_only_positive_scores_in_descending_order() {
        let ranker = SimilarityRanker::new();
        let ranked = ranker.rank("great gatsby", SearchScope::Title, &catalog());

        let ids: Vec<_> = ranked.iter().map(|s| s.book_id).collect();
        // {great, gatsbi} against: book 1 = 1.0, book 4 = 1/2, book 2 = 1/3
        assert_eq!(ids, vec![BookId(1), BookId(4), BookId(2)]);
        assert!(ranked.iter().all(|s| s.score > 0.0));
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let ranker = SimilarityRanker::new();
        let books = vec![
            book(7, "Persuasion", "Jane Austen", "Classic"),
            book(3, "Emma", "Jane Austen", "Classic"),
            book(5, "Sanditon", "Jane Austen", "Classic"),
        ];
        assert_eq!(
            ranker.search("austen", SearchScope::Author, &books),
            vec![BookId(7), BookId(3), BookId(5)]
        );
    }

    #[test]
    fn test_scopes() {
        let ranker = SimilarityRanker::new();
        let books = catalog();

        assert_eq!(ranker.search("dickens", SearchScope::Author, &books), vec![BookId(2)]);
        assert!(ranker.search("dickens", SearchScope::Title, &books).is_empty());
        assert_eq!(
            ranker.search("classic", SearchScope::Genre, &books),
            vec![BookId(1), BookId(2)]
        );
        assert_eq!(ranker.search("herbert dune", SearchScope::All, &books)[0], BookId(3));
    }

    #[test]
    fn test_empty_inputs() {
        let ranker = SimilarityRanker::new();
        assert!(ranker.search("", SearchScope::All, &catalog()).is_empty());
        assert!(ranker.search("the of and", SearchScope::All, &catalog()).is_empty());
        assert!(ranker.search("gatsby", SearchScope::All, &Vec::<Book>::new()).is_empty());
    }

    struct Overlap;

    impl Similarity for Overlap {
        fn name(&self) -> &str {
            "overlap"
        }

        fn score(&self, query: &TokenSet, candidate: &TokenSet) -> f64 {
            query.intersection(candidate).count() as f64
        }
    }

    #[test]
    fn test_custom_similarity() {
        let ranker = SimilarityRanker::new().with_similarity(Overlap);
        assert_eq!(ranker.similarity_name(), "overlap");
        let ranked = ranker.rank("great gatsby", SearchScope::Title, &catalog());
        assert_eq!(ranked[0].score, 2.0);
    }
}
