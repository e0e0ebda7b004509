//! Review creation and per-book sentiment summaries.
//!
//! Sentiment is classified once, when a review is added, and stored with the
//! review. Summaries only count stored labels.

use crate::error::{LedgerError, Result};
use crate::ledger::CirculationLedger;
use crate::types::*;
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use text::{SentimentClassifier, SentimentLabel};
use tracing::{info, instrument};

/// Accepted rating range
pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Adds reviews to a ledger's book-keyed review collection
#[derive(Debug, Clone)]
pub struct ReviewAggregator {
    ledger: Arc<CirculationLedger>,
    classifier: SentimentClassifier,
}

/// Returned by a successful [`ReviewAggregator::add_review`]
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewReceipt {
    pub review_id: ReviewId,
    pub book_id: BookId,
    pub label: SentimentLabel,
}

impl fmt::Display for ReviewReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Review added with {} sentiment", self.label)
    }
}

/// Label counts over a book's reviews
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub total: usize,
}

impl SentimentCounts {
    fn record(mut self, label: SentimentLabel) -> Self {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
        self.total += 1;
        self
    }
}

/// Result of [`ReviewAggregator::summarize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SentimentSummary {
    NoReviews,
    Counts(SentimentCounts),
}

impl fmt::Display for SentimentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentSummary::NoReviews => f.write_str("No reviews available"),
            SentimentSummary::Counts(c) => write!(
                f,
                "{} reviews: {} positive, {} negative, {} neutral",
                c.total, c.positive, c.negative, c.neutral
            ),
        }
    }
}

impl ReviewAggregator {
    pub fn new(ledger: Arc<CirculationLedger>) -> Self {
        Self::with_classifier(ledger, SentimentClassifier::new())
    }

    pub fn with_classifier(ledger: Arc<CirculationLedger>, classifier: SentimentClassifier) -> Self {
        Self { ledger, classifier }
    }

    /// Classify `text` and append a review to the book.
    ///
    /// Fails with `InvalidInput` for a rating outside 1..=5 and with
    /// `InvalidReference` for an unknown book. The borrower id is recorded
    /// as given.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn add_review(
        &self,
        book_id: BookId,
        borrower_id: &BorrowerId,
        text: &str,
        rating: i64,
    ) -> Result<ReviewReceipt> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(LedgerError::invalid_input(
                "rating",
                format!("must be between {MIN_RATING} and {MAX_RATING}, got {rating}"),
            ));
        }
        // Checked above, fits in u8
        let rating = rating as u8;

        // Classification is pure; keep it outside the write lock
        let classification = self.classifier.classify(text);

        let receipt = self.ledger.mutate("add_review", |state| {
            if !state.books.contains_key(&book_id) {
                return Err(LedgerError::InvalidReference {
                    entity: "book",
                    id: book_id.to_string(),
                });
            }

            let reviews = state.reviews.entry(book_id).or_default();
            let review_id = ReviewId(reviews.len() as u32 + 1);
            reviews.push(Review {
                review_id,
                book_id,
                borrower_id: borrower_id.clone(),
                review_text: text.to_string(),
                rating,
                sentiment: classification.label,
                sentiment_scores: classification.scores,
                timestamp: Utc::now(),
            });

            Ok(ReviewReceipt {
                review_id,
                book_id,
                label: classification.label,
            })
        })?;

        info!(book = %book_id, review = %receipt.review_id, label = %receipt.label, "review added");
        Ok(receipt)
    }

    /// Reviews of a book in creation order
    pub fn reviews(&self, book_id: BookId) -> Vec<Review> {
        self.ledger.reviews(book_id)
    }

    /// Count stored labels. Unknown books and books without reviews both
    /// report `NoReviews`.
    pub fn summarize(&self, book_id: BookId) -> SentimentSummary {
        let snapshot = self.ledger.snapshot();
        let reviews = snapshot.book_reviews(book_id);
        if reviews.is_empty() {
            return SentimentSummary::NoReviews;
        }

        let counts = reviews
            .iter()
            .fold(SentimentCounts::default(), |counts, review| counts.record(review.sentiment));
        SentimentSummary::Counts(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn setup() -> (ReviewAggregator, BookId, BorrowerId) {
        let ledger = Arc::new(CirculationLedger::in_memory());
        let book = ledger
            .add_book(NewBook::new("Emma", "Jane Austen", "9780141439587", "Classic", 1))
            .unwrap();
        (ReviewAggregator::new(ledger), book.id, BorrowerId::from_sequence(1))
    }

    #[test]
    fn test_add_review_classifies_and_numbers() {
        let (reviews, book, borrower) = setup();

        let first = reviews
            .add_review(book, &borrower, "I loved this book, it was wonderful", 5)
            .unwrap();
        assert_eq!(first.review_id, ReviewId(1));
        assert_eq!(first.label, SentimentLabel::Positive);
        assert_eq!(first.to_string(), "Review added with positive sentiment");

        let second = reviews
            .add_review(book, &borrower, "I hated this terrible book", 1)
            .unwrap();
        assert_eq!(second.review_id, ReviewId(2));
        assert_eq!(second.label, SentimentLabel::Negative);

        let stored = reviews.reviews(book);
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].rating, 5);
        assert!(stored[0].sentiment_scores.compound > 0.05);
    }

    #[test]
    fn test_rating_bounds() {
        let (reviews, book, borrower) = setup();
        for rating in [0, 6, -3] {
            let err = reviews.add_review(book, &borrower, "fine", rating).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
        assert!(reviews.reviews(book).is_empty());
    }

    #[test]
    fn test_unknown_book() {
        let (reviews, _, borrower) = setup();
        let err = reviews.add_review(BookId(40), &borrower, "Great", 4).unwrap_err();
        assert_eq!(err.to_string(), "Invalid book ID: 40");
    }

    #[test]
    fn test_summarize() {
        let (reviews, book, borrower) = setup();
        assert_eq!(reviews.summarize(book), SentimentSummary::NoReviews);
        assert_eq!(reviews.summarize(book).to_string(), "No reviews available");

        reviews.add_review(book, &borrower, "I loved this book, it was wonderful", 5).unwrap();
        reviews.add_review(book, &borrower, "I hated this terrible book", 1).unwrap();
        reviews.add_review(book, &borrower, "It exists.", 3).unwrap();
        reviews.add_review(book, &borrower, "A good read", 4).unwrap();

        let expected = SentimentCounts {
            positive: 2,
            negative: 1,
            neutral: 1,
            total: 4,
        };
        assert_eq!(reviews.summarize(book), SentimentSummary::Counts(expected));
    }

    #[test]
    fn test_reviewer_id_not_reissued() {
        let (reviews, book, _) = setup();
        let ledger = Arc::clone(&reviews.ledger);
        let reviewer = ledger.add_borrower(NewBorrower::new("Ada", "", "")).unwrap();
        reviews.add_review(book, &reviewer.id, "A good read", 4).unwrap();
        ledger.delete_borrower(&reviewer.id).unwrap();

        let next = ledger.add_borrower(NewBorrower::new("Grace", "", "")).unwrap();
        assert_ne!(next.id, reviewer.id);
        assert_eq!(next.id, BorrowerId::from_sequence(2));
        assert_eq!(reviews.reviews(book)[0].borrower_id, reviewer.id);
    }

    #[test]
    fn test_reviews_survive_book_deletion() {
        let (reviews, book, borrower) = setup();
        reviews.add_review(book, &borrower, "It exists.", 3).unwrap();
        reviews.ledger.delete_book(book).unwrap();

        assert_eq!(reviews.reviews(book).len(), 1);
        assert!(matches!(reviews.summarize(book), SentimentSummary::Counts(_)));
    }
}
