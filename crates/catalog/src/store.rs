//! Library state and the storage interface.
//!
//! `LibraryState` holds the four record collections. A `CatalogStore` loads
//! the whole state at start-up and receives the whole state after every
//! successful mutation. The ledger depends only on the trait, so any backend
//! (local JSON file, in-memory, a remote table store) can sit behind it.

use crate::error::StoreError;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// The four record collections of a library.
///
/// Ordered maps keep iteration deterministic: books by id, borrowers by id,
/// transactions in creation (and therefore id) order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryState {
    #[serde(default)]
    pub books: BTreeMap<BookId, Book>,
    #[serde(default)]
    pub borrowers: BTreeMap<BorrowerId, Borrower>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// Reviews grouped by the book they belong to. Entries may outlive the book.
    #[serde(default)]
    pub reviews: BTreeMap<BookId, Vec<Review>>,
}

impl LibraryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused book id.
    ///
    /// Considers ids still referenced by transactions and reviews of deleted
    /// books, so a new book never inherits another book's history.
    pub fn next_book_id(&self) -> BookId {
        let max = self
            .books
            .keys()
            .copied()
            .chain(self.transactions.iter().map(|t| t.book_id))
            .chain(self.reviews.keys().copied())
            .map(|id| id.0)
            .max()
            .unwrap_or(0);
        BookId(max + 1)
    }

    /// Next unused borrower id, `B` + zero-padded sequence
    pub fn next_borrower_id(&self) -> BorrowerId {
        let max = self
            .borrowers
            .keys()
            .chain(self.transactions.iter().map(|t| &t.borrower_id))
            .chain(self.reviews.values().flatten().map(|r| &r.borrower_id))
            .filter_map(BorrowerId::sequence)
            .max()
            .unwrap_or(0);
        BorrowerId::from_sequence(max + 1)
    }

    pub fn next_transaction_id(&self) -> TransactionId {
        let max = self
            .transactions
            .iter()
            .map(|t| t.transaction_id.0)
            .max()
            .unwrap_or(0);
        TransactionId(max + 1)
    }

    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.transaction_id == id)
    }

    pub fn transaction_mut(&mut self, id: TransactionId) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|t| t.transaction_id == id)
    }

    /// Reviews stored for a book, empty if none
    pub fn book_reviews(&self, book_id: BookId) -> &[Review] {
        self.reviews
            .get(&book_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Record counts (books, borrowers, transactions, reviews)
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        let reviews = self.reviews.values().map(|v| v.len()).sum();
        (
            self.books.len(),
            self.borrowers.len(),
            self.transactions.len(),
            reviews,
        )
    }
}

/// Persistence backend for the ledger.
///
/// `Send + Sync` so a ledger can be shared across request threads. Backends
/// report failures as `StoreError`; they don't retry on the ledger's behalf.
pub trait CatalogStore: Send + Sync {
    /// Returns the name of this backend (for logging)
    fn name(&self) -> &str;

    /// Load the full state. A backend with nothing stored yet returns an empty state.
    fn load(&self) -> Result<LibraryState, StoreError>;

    /// Persist the full state
    fn flush(&self, state: &LibraryState) -> Result<(), StoreError>;
}

/// Keeps the last flushed state in memory.
///
/// Used for tests and for running without a data file.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<LibraryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing records
    pub fn with_state(state: LibraryState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Copy of the last flushed state
    pub fn stored(&self) -> Result<LibraryState, StoreError> {
        self.state
            .lock()
            .map(|state| state.clone())
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl CatalogStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> Result<LibraryState, StoreError> {
        self.stored()
    }

    fn flush(&self, state: &LibraryState) -> Result<(), StoreError> {
        let mut stored = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        *stored = state.clone();
        Ok(())
    }
}
