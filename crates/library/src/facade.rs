//! # Library Facade
//!
//! This module is the single entry point for callers (CLI, web layer):
//! 1. Catalog: create/read/update/delete books and borrowers
//! 2. Circulation: borrow, return, list transactions
//! 3. Search: rank books against a query over one snapshot
//! 4. Reviews: add, list and summarize
//!
//! Circulation and review calls answer with an [`Outcome`] (success flag plus
//! message). Catalog calls return the record itself so callers can show it.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use catalog::{
    ActiveTransactions, Book, BookId, BookPatch, Borrower, BorrowerId, BorrowerPatch,
    CirculationLedger, JsonFileStore, MemoryStore, NewBook, NewBorrower, Outcome, Review,
    ReviewAggregator, SentimentSummary, Transaction, TransactionId,
};
use search::{ScoredBook, SearchScope, SimilarityRanker};
use text::{Lexicon, SentimentClassifier};

use crate::config::LibraryConfig;

/// A ranked search hit resolved to its book
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub book: Book,
    pub score: f64,
}

/// Composes the ledger, the ranker and the review aggregator.
///
/// Cheap to clone; clones share one ledger.
#[derive(Clone)]
pub struct Library {
    ledger: Arc<CirculationLedger>,
    ranker: SimilarityRanker,
    reviews: ReviewAggregator,
    config: LibraryConfig,
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("ledger", &self.ledger)
            .field("reviews", &self.reviews)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Library {
    /// Open the library described by `config`, loading any stored data
    pub fn open(config: LibraryConfig) -> Result<Self> {
        let ledger = match config.data_file() {
            Some(path) => CirculationLedger::open(JsonFileStore::new(path)).with_context(|| {
                format!(
                    "Failed to open library data at {} (expected a libcat JSON document with \
                     `books`, `borrowers`, `transactions` and `reviews`)",
                    path.display()
                )
            })?,
            None => CirculationLedger::open(MemoryStore::new())
                .context("Failed to open in-memory library")?,
        };

        let classifier = match config.lexicon_file() {
            Some(path) => {
                let lexicon = Lexicon::from_path(path)
                    .with_context(|| format!("Failed to load sentiment lexicon {}", path.display()))?;
                info!(words = lexicon.len(), path = %path.display(), "loaded sentiment lexicon");
                SentimentClassifier::with_lexicon(lexicon)
            }
            None => SentimentClassifier::new(),
        };

        Ok(Self::from_ledger(
            ledger.with_loan_days(config.loan_days),
            classifier,
            config,
        ))
    }

    /// Empty in-memory library with default settings
    pub fn in_memory() -> Self {
        Self::from_ledger(
            CirculationLedger::in_memory(),
            SentimentClassifier::new(),
            LibraryConfig::in_memory(),
        )
    }

    fn from_ledger(ledger: CirculationLedger, classifier: SentimentClassifier, config: LibraryConfig) -> Self {
        let ledger = Arc::new(ledger);
        Self {
            reviews: ReviewAggregator::with_classifier(Arc::clone(&ledger), classifier),
            ranker: SimilarityRanker::new(),
            ledger,
            config,
        }
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<CirculationLedger> {
        &self.ledger
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub fn add_book(&self, new: NewBook) -> catalog::Result<Book> {
        self.ledger.add_book(new)
    }

    pub fn book(&self, id: BookId) -> Option<Book> {
        self.ledger.book(id)
    }

    pub fn books(&self) -> Vec<Book> {
        self.ledger.books()
    }

    pub fn update_book(&self, id: BookId, patch: BookPatch) -> catalog::Result<Book> {
        self.ledger.update_book(id, patch)
    }

    pub fn delete_book(&self, id: BookId) -> catalog::Result<Book> {
        self.ledger.delete_book(id)
    }

    pub fn add_borrower(&self, new: NewBorrower) -> catalog::Result<Borrower> {
        self.ledger.add_borrower(new)
    }

    pub fn borrower(&self, id: &BorrowerId) -> Option<Borrower> {
        self.ledger.borrower(id)
    }

    pub fn borrowers(&self) -> Vec<Borrower> {
        self.ledger.borrowers()
    }

    pub fn update_borrower(&self, id: &BorrowerId, patch: BorrowerPatch) -> catalog::Result<Borrower> {
        self.ledger.update_borrower(id, patch)
    }

    pub fn delete_borrower(&self, id: &BorrowerId) -> catalog::Result<Borrower> {
        self.ledger.delete_borrower(id)
    }

    // =========================================================================
    // Circulation
    // =========================================================================

    /// Borrow one copy, for `days` or the configured loan period
    pub fn borrow(&self, book_id: BookId, borrower_id: &BorrowerId, days: Option<u32>) -> Outcome {
        let days = days.unwrap_or(self.config.loan_days);
        Outcome::from(self.ledger.borrow_for(book_id, borrower_id, days))
    }

    pub fn return_book(&self, transaction_id: TransactionId) -> Outcome {
        Outcome::from(self.ledger.return_book(transaction_id))
    }

    pub fn list_active_transactions(&self) -> ActiveTransactions {
        self.ledger.active_transactions()
    }

    pub fn list_all_transactions(&self) -> Vec<Transaction> {
        self.ledger.transactions()
    }

    pub fn overdue_transactions(&self, at: DateTime<Utc>) -> Vec<Transaction> {
        self.ledger.overdue_transactions(at)
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Ranked book ids, best match first
    pub fn search(&self, query: &str, scope: SearchScope) -> Vec<BookId> {
        self.rank(query, scope)
            .into_iter()
            .map(|scored| scored.book_id)
            .collect()
    }

    /// Ranked hits resolved to books. Everything is read from one snapshot,
    /// so every ranked id resolves.
    pub fn search_books(&self, query: &str, scope: SearchScope) -> Vec<SearchHit> {
        let start_time = Instant::now();
        let snapshot = self.ledger.snapshot();

        let hits: Vec<SearchHit> = self
            .ranker
            .rank(query, scope, snapshot.books.values())
            .into_iter()
            .filter_map(|scored| {
                let book = snapshot.books.get(&scored.book_id)?;
                Some(SearchHit {
                    book: book.clone(),
                    score: scored.score,
                })
            })
            .collect();

        debug!(
            query,
            scope = %scope,
            hits = hits.len(),
            "search completed in {:.2?}",
            start_time.elapsed()
        );
        hits
    }

    fn rank(&self, query: &str, scope: SearchScope) -> Vec<ScoredBook> {
        let snapshot = self.ledger.snapshot();
        self.ranker.rank(query, scope, snapshot.books.values())
    }

    /// Resolve ids from an earlier [`search`](Self::search) against the
    /// current state, skipping books deleted since
    pub fn resolve(&self, ids: &[BookId]) -> Vec<Book> {
        let snapshot = self.ledger.snapshot();
        ids.iter()
            .filter_map(|id| snapshot.books.get(id).cloned())
            .collect()
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    pub fn add_review(&self, book_id: BookId, borrower_id: &BorrowerId, text: &str, rating: i64) -> Outcome {
        let outcome = Outcome::from(self.reviews.add_review(book_id, borrower_id, text, rating));
        if outcome.ok {
            info!(book = %book_id, "{}", outcome.message);
        }
        outcome
    }

    pub fn list_reviews(&self, book_id: BookId) -> Vec<Review> {
        self.reviews.reviews(book_id)
    }

    pub fn summarize_sentiment(&self, book_id: BookId) -> SentimentSummary {
        self.reviews.summarize(book_id)
    }
}
