//! # Catalog Crate
//!
//! Records, storage and circulation for the library.
//!
//! ## Main Components
//!
//! - **types**: Typed ids, Book/Borrower/Transaction/Review records, inputs and patches
//! - **store**: `LibraryState` plus the `CatalogStore` repository trait and `MemoryStore`
//! - **json_store**: JSON-file backend
//! - **ledger**: `CirculationLedger`, the only writer of books, borrowers and transactions
//! - **reviews**: `ReviewAggregator`, review creation and sentiment summaries
//! - **error**: Error taxonomy and the `Outcome` success-flag wrapper
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CirculationLedger, JsonFileStore, NewBook, NewBorrower, Outcome};
//!
//! let ledger = CirculationLedger::open(JsonFileStore::new("libcat_data.json"))?;
//!
//! let book = ledger.add_book(NewBook::new("Dune", "Frank Herbert", "9780441013593", "Science Fiction", 2))?;
//! let member = ledger.add_borrower(NewBorrower::new("Ada", "ada@example.com", "555-0100"))?;
//!
//! let outcome = Outcome::from(ledger.borrow(book.id, &member.id));
//! println!("{}", outcome.message); // Book borrowed successfully. Due date: ...
//!
//! for transaction in &ledger.active_transactions() {
//!     println!("{} due {}", transaction.transaction_id, transaction.due_date);
//! }
//! ```

pub mod error;
pub mod json_store;
pub mod ledger;
pub mod reviews;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, LedgerError, Outcome, Result, StoreError};
pub use json_store::JsonFileStore;
pub use ledger::{
    ActiveIter, ActiveTransactions, BorrowReceipt, CirculationLedger, ReturnReceipt,
    DEFAULT_LOAN_DAYS,
};
pub use reviews::{ReviewAggregator, ReviewReceipt, SentimentCounts, SentimentSummary};
pub use store::{CatalogStore, LibraryState, MemoryStore};
pub use types::{
    // Identifiers
    BookId,
    BorrowerId,
    ParseIdError,
    ReviewId,
    TransactionId,
    // Records
    Book,
    Borrower,
    Review,
    Transaction,
    // Inputs
    BookPatch,
    BorrowerPatch,
    NewBook,
    NewBorrower,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ledger() {
        let ledger = CirculationLedger::in_memory();
        assert!(ledger.books().is_empty());
        assert!(ledger.borrowers().is_empty());
        assert!(ledger.active_transactions().is_empty());
        assert_eq!(ledger.loan_days(), DEFAULT_LOAN_DAYS);
        assert_eq!(ledger.store_name(), "memory");
    }

    #[test]
    fn test_outcome_for_borrow() {
        let ledger = CirculationLedger::in_memory();
        let book = ledger
            .add_book(NewBook::new("Beloved", "Toni Morrison", "9781400033416", "Fiction", 1))
            .unwrap();
        let member = ledger
            .add_borrower(NewBorrower::new("Ada", "ada@example.com", "555-0100"))
            .unwrap();

        let outcome = Outcome::from(ledger.borrow(book.id, &member.id));
        assert!(outcome.ok);
        assert!(outcome.message.starts_with("Book borrowed successfully. Due date: "));

        let outcome = Outcome::from(ledger.borrow(book.id, &member.id));
        assert!(!outcome.ok);
        assert_eq!(outcome.message, "No copies available");
        assert_eq!(outcome.kind, Some(ErrorKind::InvalidState));
    }

    #[test]
    fn test_queries_on_unknown_ids() {
        let ledger = CirculationLedger::in_memory();
        assert!(ledger.book(BookId(1)).is_none());
        assert!(ledger.borrower(&BorrowerId::from_sequence(1)).is_none());
        assert!(ledger.transaction(TransactionId(1)).is_none());
        assert!(ledger.reviews(BookId(1)).is_empty());
    }
}
