//! # Circulation Ledger
//!
//! Owns every book, borrower and transaction, and is the only place they
//! change.
//!
//! ## Algorithm
//!
//! The published state is an `Arc<LibraryState>` behind an `RwLock`:
//!
//! 1. Readers take the read lock just long enough to clone the `Arc`. They
//!    then work on a consistent point-in-time snapshot without holding any lock.
//! 2. A writer takes the write lock for the whole operation, so all mutations
//!    are serialized. It clones the state, applies the change to the copy,
//!    flushes the copy to the store and only then publishes it.
//! 3. If the change is rejected or the flush fails, the copy is dropped and
//!    the published state is untouched.
//!
//! The check-then-act sequences of borrow and return therefore run inside
//! one critical section: two borrows of the last copy can't both see
//! `available == 1`, and a transaction can't be closed twice.

use crate::error::{LedgerError, Result};
use crate::store::{CatalogStore, LibraryState, MemoryStore};
use crate::types::*;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::slice;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, instrument, warn};

/// Loan period used when none is configured
pub const DEFAULT_LOAN_DAYS: u32 = 14;

/// Thread-safe owner of the library's circulation state
pub struct CirculationLedger {
    store: Box<dyn CatalogStore>,
    state: RwLock<Arc<LibraryState>>,
    loan_days: u32,
}

impl fmt::Debug for CirculationLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CirculationLedger")
            .field("store", &self.store.name())
            .field("loan_days", &self.loan_days)
            .finish_non_exhaustive()
    }
}

/// Returned by a successful borrow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowReceipt {
    pub transaction_id: TransactionId,
    pub book_id: BookId,
    pub borrower_id: BorrowerId,
    pub due_date: DateTime<Utc>,
}

impl fmt::Display for BorrowReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Book borrowed successfully. Due date: {}",
            self.due_date.format("%Y-%m-%d")
        )
    }
}

/// Returned by a successful return
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReceipt {
    pub transaction_id: TransactionId,
    pub book_id: BookId,
    pub returned_at: DateTime<Utc>,
}

impl fmt::Display for ReturnReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Book returned successfully")
    }
}

impl CirculationLedger {
    /// Open a ledger over a store, loading its full state
    pub fn open(store: impl CatalogStore + 'static) -> Result<Self> {
        let state = store.load()?;
        let (books, borrowers, transactions, reviews) = state.counts();
        info!(
            store = store.name(),
            books, borrowers, transactions, reviews, "opened circulation ledger"
        );

        Ok(Self {
            store: Box::new(store),
            state: RwLock::new(Arc::new(state)),
            loan_days: DEFAULT_LOAN_DAYS,
        })
    }

    /// An empty ledger backed by a [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self {
            store: Box::new(MemoryStore::new()),
            state: RwLock::new(Arc::new(LibraryState::default())),
            loan_days: DEFAULT_LOAN_DAYS,
        }
    }

    /// Set the default loan period used by [`borrow`](Self::borrow)
    pub fn with_loan_days(mut self, loan_days: u32) -> Self {
        self.loan_days = loan_days;
        self
    }

    pub fn loan_days(&self) -> u32 {
        self.loan_days
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Consistent point-in-time view of the whole state
    pub fn snapshot(&self) -> Arc<LibraryState> {
        // Only whole states are ever published, so a poisoned lock still
        // guards a consistent value.
        match self.state.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Run `apply` against a staged copy of the state and publish it once flushed
    pub(crate) fn mutate<T>(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&mut LibraryState) -> Result<T>,
    ) -> Result<T> {
        let mut published = self
            .state
            .write()
            .map_err(|_| LedgerError::StatePoisoned)?;

        let mut staged = LibraryState::clone(&published);
        let value = apply(&mut staged).inspect_err(|e| {
            warn!(operation, error = %e, "operation rejected");
        })?;

        if let Err(e) = self.store.flush(&staged) {
            warn!(operation, store = self.store.name(), error = %e, "flush failed, state unchanged");
            return Err(e.into());
        }

        *published = Arc::new(staged);
        Ok(value)
    }

    // =========================================================================
    // Books
    // =========================================================================

    #[instrument(skip(self, new), fields(title = %new.title))]
    pub fn add_book(&self, new: NewBook) -> Result<Book> {
        let copies = u32::try_from(new.copies).map_err(|_| {
            LedgerError::invalid_input("copies", format!("must be a non-negative count, got {}", new.copies))
        })?;

        let book = self.mutate("add_book", |state| {
            let book = Book {
                id: state.next_book_id(),
                title: new.title,
                author: new.author,
                isbn: new.isbn,
                genre: new.genre,
                copies,
                available: copies,
            };
            state.books.insert(book.id, book.clone());
            Ok(book)
        })?;

        info!(book = %book.id, copies, "book added");
        Ok(book)
    }

    /// Apply a patch. An empty patch succeeds without touching the store.
    #[instrument(skip(self, patch))]
    pub fn update_book(&self, id: BookId, patch: BookPatch) -> Result<Book> {
        if patch.is_empty() {
            return self.book(id).ok_or(LedgerError::BookNotFound(id));
        }

        self.mutate("update_book", |state| {
            let book = state
                .books
                .get_mut(&id)
                .ok_or(LedgerError::BookNotFound(id))?;

            if let Some(copies) = patch.copies {
                let on_loan = book.on_loan();
                if copies < on_loan {
                    return Err(LedgerError::invalid_input(
                        "copies",
                        format!("{copies} is fewer than the {on_loan} copies on loan"),
                    ));
                }
                book.copies = copies;
                book.available = copies - on_loan;
            }
            if let Some(title) = patch.title {
                book.title = title;
            }
            if let Some(author) = patch.author {
                book.author = author;
            }
            if let Some(isbn) = patch.isbn {
                book.isbn = isbn;
            }
            if let Some(genre) = patch.genre {
                book.genre = genre;
            }
            Ok(book.clone())
        })
    }

    /// Remove a book. Its transactions and reviews keep the dangling id.
    #[instrument(skip(self))]
    pub fn delete_book(&self, id: BookId) -> Result<Book> {
        let book = self.mutate("delete_book", |state| {
            state.books.remove(&id).ok_or(LedgerError::BookNotFound(id))
        })?;
        info!(book = %id, "book deleted");
        Ok(book)
    }

    pub fn book(&self, id: BookId) -> Option<Book> {
        self.snapshot().books.get(&id).cloned()
    }

    /// All books in id order
    pub fn books(&self) -> Vec<Book> {
        self.snapshot().books.values().cloned().collect()
    }

    // =========================================================================
    // Borrowers
    // =========================================================================

    #[instrument(skip(self, new), fields(name = %new.name))]
    pub fn add_borrower(&self, new: NewBorrower) -> Result<Borrower> {
        let borrower = self.mutate("add_borrower", |state| {
            let borrower = Borrower {
                id: state.next_borrower_id(),
                name: new.name,
                email: new.email,
                phone: new.phone,
                borrowed_books: Default::default(),
            };
            state.borrowers.insert(borrower.id.clone(), borrower.clone());
            Ok(borrower)
        })?;

        info!(borrower = %borrower.id, "borrower added");
        Ok(borrower)
    }

    #[instrument(skip(self, patch))]
    pub fn update_borrower(&self, id: &BorrowerId, patch: BorrowerPatch) -> Result<Borrower> {
        if patch.is_empty() {
            return self
                .borrower(id)
                .ok_or_else(|| LedgerError::BorrowerNotFound(id.clone()));
        }

        self.mutate("update_borrower", |state| {
            let borrower = state
                .borrowers
                .get_mut(id)
                .ok_or_else(|| LedgerError::BorrowerNotFound(id.clone()))?;

            if let Some(name) = patch.name {
                borrower.name = name;
            }
            if let Some(email) = patch.email {
                borrower.email = email;
            }
            if let Some(phone) = patch.phone {
                borrower.phone = phone;
            }
            Ok(borrower.clone())
        })
    }

    /// Remove a borrower. Open transactions stay open and can still be returned.
    #[instrument(skip(self))]
    pub fn delete_borrower(&self, id: &BorrowerId) -> Result<Borrower> {
        let borrower = self.mutate("delete_borrower", |state| {
            state
                .borrowers
                .remove(id)
                .ok_or_else(|| LedgerError::BorrowerNotFound(id.clone()))
        })?;
        info!(borrower = %id, open = borrower.borrowed_books.len(), "borrower deleted");
        Ok(borrower)
    }

    pub fn borrower(&self, id: &BorrowerId) -> Option<Borrower> {
        self.snapshot().borrowers.get(id).cloned()
    }

    pub fn borrowers(&self) -> Vec<Borrower> {
        self.snapshot().borrowers.values().cloned().collect()
    }

    // =========================================================================
    // Circulation
    // =========================================================================

    /// Borrow one copy for the configured loan period
    pub fn borrow(&self, book_id: BookId, borrower_id: &BorrowerId) -> Result<BorrowReceipt> {
        self.borrow_for(book_id, borrower_id, self.loan_days)
    }

    /// Borrow one copy, due `loan_days` from now.
    ///
    /// Fails with `InvalidReference` if the book (checked first) or the
    /// borrower doesn't exist, and with `NoCopiesAvailable` if every copy is
    /// out. A `loan_days` too large for a calendar date is `InvalidInput`.
    /// No failure changes any state.
    #[instrument(skip(self))]
    pub fn borrow_for(
        &self,
        book_id: BookId,
        borrower_id: &BorrowerId,
        loan_days: u32,
    ) -> Result<BorrowReceipt> {
        let now = Utc::now();
        let due_date = Duration::try_days(i64::from(loan_days))
            .and_then(|loan| now.checked_add_signed(loan))
            .ok_or_else(|| {
                warn!(loan_days, "loan period out of range");
                LedgerError::invalid_input("loan_days", format!("{loan_days} days is out of range"))
            })?;

        let receipt = self.mutate("borrow", |state| {
            if !state.books.contains_key(&book_id) {
                return Err(LedgerError::InvalidReference {
                    entity: "book",
                    id: book_id.to_string(),
                });
            }
            if !state.borrowers.contains_key(borrower_id) {
                return Err(LedgerError::InvalidReference {
                    entity: "borrower",
                    id: borrower_id.to_string(),
                });
            }

            let transaction_id = state.next_transaction_id();

            let book = state
                .books
                .get_mut(&book_id)
                .ok_or(LedgerError::BookNotFound(book_id))?;
            if book.available == 0 {
                return Err(LedgerError::NoCopiesAvailable(book_id));
            }
            book.available -= 1;
            debug!(book = %book_id, available = book.available, "copy checked out");

            if let Some(borrower) = state.borrowers.get_mut(borrower_id) {
                borrower.borrowed_books.insert(transaction_id);
            }

            state.transactions.push(Transaction {
                transaction_id,
                book_id,
                borrower_id: borrower_id.clone(),
                borrow_date: now,
                due_date,
                return_date: None,
            });

            Ok(BorrowReceipt {
                transaction_id,
                book_id,
                borrower_id: borrower_id.clone(),
                due_date,
            })
        })?;

        info!(
            transaction = %receipt.transaction_id,
            due = %receipt.due_date.format("%Y-%m-%d"),
            "book borrowed"
        );
        Ok(receipt)
    }

    /// Close an open transaction.
    ///
    /// `available` is capped at `copies`, so a book whose copy count was
    /// lowered while on loan never ends up with more copies on the shelf than
    /// it owns. A book or borrower deleted in the meantime is skipped.
    #[instrument(skip(self))]
    pub fn return_book(&self, transaction_id: TransactionId) -> Result<ReturnReceipt> {
        let now = Utc::now();

        let receipt = self.mutate("return", |state| {
            let transaction = state
                .transaction_mut(transaction_id)
                .ok_or(LedgerError::TransactionNotFound(transaction_id))?;
            if transaction.return_date.is_some() {
                return Err(LedgerError::AlreadyReturned(transaction_id));
            }
            transaction.return_date = Some(now);
            let book_id = transaction.book_id;
            let borrower_id = transaction.borrower_id.clone();

            match state.books.get_mut(&book_id) {
                Some(book) => book.available = book.available.saturating_add(1).min(book.copies),
                None => debug!(book = %book_id, "returned copy of a deleted book"),
            }
            if let Some(borrower) = state.borrowers.get_mut(&borrower_id) {
                borrower.borrowed_books.remove(&transaction_id);
            }

            Ok(ReturnReceipt {
                transaction_id,
                book_id,
                returned_at: now,
            })
        })?;

        info!(transaction = %transaction_id, book = %receipt.book_id, "book returned");
        Ok(receipt)
    }

    /// All transactions in id order
    pub fn transactions(&self) -> Vec<Transaction> {
        self.snapshot().transactions.clone()
    }

    pub fn transaction(&self, id: TransactionId) -> Option<Transaction> {
        self.snapshot().transaction(id).cloned()
    }

    /// Open transactions, evaluated lazily over the current snapshot
    pub fn active_transactions(&self) -> ActiveTransactions {
        ActiveTransactions {
            snapshot: self.snapshot(),
        }
    }

    /// Open transactions whose due date is before `at`
    pub fn overdue_transactions(&self, at: DateTime<Utc>) -> Vec<Transaction> {
        self.snapshot()
            .transactions
            .iter()
            .filter(|t| t.is_overdue(at))
            .cloned()
            .collect()
    }

    /// Reviews of a book in creation order
    pub fn reviews(&self, book_id: BookId) -> Vec<Review> {
        self.snapshot().book_reviews(book_id).to_vec()
    }
}

/// Open transactions of one snapshot.
///
/// Holds the snapshot, not a copy of the matches: each call to
/// [`iter`](Self::iter) filters again from the start, and later ledger
/// mutations are not visible.
#[derive(Debug, Clone)]
pub struct ActiveTransactions {
    snapshot: Arc<LibraryState>,
}

impl ActiveTransactions {
    pub fn iter(&self) -> ActiveIter<'_> {
        ActiveIter {
            inner: self.snapshot.transactions.iter(),
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'a> IntoIterator for &'a ActiveTransactions {
    type Item = &'a Transaction;
    type IntoIter = ActiveIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over open transactions
#[derive(Debug, Clone)]
pub struct ActiveIter<'a> {
    inner: slice::Iter<'a, Transaction>,
}

impl<'a> Iterator for ActiveIter<'a> {
    type Item = &'a Transaction;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find(|t| t.is_open())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn ledger_with_book(copies: i64) -> (CirculationLedger, BookId, BorrowerId) {
        let ledger = CirculationLedger::in_memory();
        let book = ledger
            .add_book(NewBook::new("Dune", "Frank Herbert", "9780441013593", "Science Fiction", copies))
            .unwrap();
        let borrower = ledger
            .add_borrower(NewBorrower::new("Ada", "ada@example.com", "555-0100"))
            .unwrap();
        (ledger, book.id, borrower.id)
    }

    #[test]
    fn test_add_book_starts_fully_available() {
        let (ledger, id, _) = ledger_with_book(3);
        let book = ledger.book(id).unwrap();
        assert_eq!(book.id, BookId(1));
        assert_eq!(book.copies, 3);
        assert_eq!(book.available, 3);
        assert_eq!(book.title, "Dune");
    }

    #[test]
    fn test_add_book_rejects_negative_copies() {
        let ledger = CirculationLedger::in_memory();
        let err = ledger
            .add_book(NewBook::new("Dune", "Frank Herbert", "", "", -1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(ledger.books().is_empty());
    }

    #[test]
    fn test_borrow_and_return() {
        let (ledger, book_id, borrower_id) = ledger_with_book(2);

        let receipt = ledger.borrow(book_id, &borrower_id).unwrap();
        assert_eq!(receipt.transaction_id, TransactionId(1));
        assert!(receipt.to_string().starts_with("Book borrowed successfully. Due date: "));
        assert_eq!(ledger.book(book_id).unwrap().available, 1);
        assert!(ledger
            .borrower(&borrower_id)
            .unwrap()
            .borrowed_books
            .contains(&receipt.transaction_id));

        let returned = ledger.return_book(receipt.transaction_id).unwrap();
        assert_eq!(returned.to_string(), "Book returned successfully");
        assert_eq!(ledger.book(book_id).unwrap().available, 2);
        assert!(ledger.borrower(&borrower_id).unwrap().borrowed_books.is_empty());
        assert!(!ledger.transaction(receipt.transaction_id).unwrap().is_open());
    }

    #[test]
    fn test_due_date_follows_loan_days() {
        let (ledger, book_id, borrower_id) = ledger_with_book(1);
        let before = Utc::now();
        let receipt = ledger.borrow_for(book_id, &borrower_id, 7).unwrap();
        let days = (receipt.due_date - before).num_days();
        assert!((6..=7).contains(&days));

        let ledger = CirculationLedger::in_memory().with_loan_days(21);
        assert_eq!(ledger.loan_days(), 21);
    }

    #[test]
    fn test_oversized_loan_is_invalid_input() {
        let (ledger, book_id, borrower_id) = ledger_with_book(1);

        let err = ledger.borrow_for(book_id, &borrower_id, u32::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("loan_days"));
        assert_eq!(ledger.book(book_id).unwrap().available, 1);
        assert!(ledger.transactions().is_empty());

        // A long but representable loan still works
        let receipt = ledger.borrow_for(book_id, &borrower_id, 36_500).unwrap();
        assert!(receipt.due_date > Utc::now());
    }

    #[test]
    fn test_return_caps_available_at_copies() {
        let now = Utc::now();
        let borrower_id = BorrowerId::from_sequence(1);
        let mut state = LibraryState::new();
        for (id, copies) in [(1, 2), (2, u32::MAX)] {
            state.books.insert(
                BookId(id),
                Book {
                    id: BookId(id),
                    title: format!("Book {id}"),
                    author: "Anonymous".to_string(),
                    isbn: String::new(),
                    genre: String::new(),
                    copies,
                    available: copies,
                },
            );
            state.transactions.push(Transaction {
                transaction_id: TransactionId(id),
                book_id: BookId(id),
                borrower_id: borrower_id.clone(),
                borrow_date: now,
                due_date: now,
                return_date: None,
            });
        }
        let ledger = CirculationLedger::open(MemoryStore::with_state(state)).unwrap();

        ledger.return_book(TransactionId(1)).unwrap();
        ledger.return_book(TransactionId(2)).unwrap();
        assert_eq!(ledger.book(BookId(1)).unwrap().available, 2);
        assert_eq!(ledger.book(BookId(2)).unwrap().available, u32::MAX);
    }

    #[test]
    fn test_borrow_unknown_references() {
        let (ledger, book_id, borrower_id) = ledger_with_book(1);

        let err = ledger.borrow(BookId(99), &borrower_id).unwrap_err();
        assert_eq!(err.to_string(), "Invalid book ID: 99");
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let stranger = BorrowerId::from_sequence(42);
        let err = ledger.borrow(book_id, &stranger).unwrap_err();
        assert_eq!(err.to_string(), "Invalid borrower ID: B0042");

        // Both unknown: the book is reported
        let err = ledger.borrow(BookId(99), &stranger).unwrap_err();
        assert!(err.to_string().contains("book"));
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn test_borrow_with_no_copies_leaves_state_alone() {
        let (ledger, book_id, borrower_id) = ledger_with_book(1);
        ledger.borrow(book_id, &borrower_id).unwrap();
        let before = ledger.snapshot();

        let err = ledger.borrow(book_id, &borrower_id).unwrap_err();
        assert!(matches!(err, LedgerError::NoCopiesAvailable(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(*ledger.snapshot(), *before);
    }

    #[test]
    fn test_double_return() {
        let (ledger, book_id, borrower_id) = ledger_with_book(1);
        let receipt = ledger.borrow(book_id, &borrower_id).unwrap();
        ledger.return_book(receipt.transaction_id).unwrap();

        let err = ledger.return_book(receipt.transaction_id).unwrap_err();
        assert_eq!(err.to_string(), "Book already returned");
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(ledger.book(book_id).unwrap().available, 1);

        let err = ledger.return_book(TransactionId(77)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_return_after_book_deleted() {
        let (ledger, book_id, borrower_id) = ledger_with_book(1);
        let receipt = ledger.borrow(book_id, &borrower_id).unwrap();
        ledger.delete_book(book_id).unwrap();

        ledger.return_book(receipt.transaction_id).unwrap();
        assert!(ledger.book(book_id).is_none());
        // Dangling id is not reused
        let next = ledger
            .add_book(NewBook::new("Emma", "Jane Austen", "", "Classic", 1))
            .unwrap();
        assert_eq!(next.id, BookId(2));
    }

    #[test]
    fn test_update_book_copies_keeps_loans() {
        let (ledger, book_id, borrower_id) = ledger_with_book(3);
        ledger.borrow(book_id, &borrower_id).unwrap();
        ledger.borrow(book_id, &borrower_id).unwrap();

        let patch = BookPatch {
            copies: Some(5),
            genre: Some("Classic".to_string()),
            ..BookPatch::default()
        };
        let book = ledger.update_book(book_id, patch).unwrap();
        assert_eq!((book.copies, book.available), (5, 3));
        assert_eq!(book.genre, "Classic");

        let err = ledger
            .update_book(book_id, BookPatch { copies: Some(1), ..BookPatch::default() })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(ledger.book(book_id).unwrap().copies, 5);
    }

    #[test]
    fn test_update_missing_and_empty_patch() {
        let (ledger, book_id, _) = ledger_with_book(1);
        let before = ledger.book(book_id).unwrap();
        assert_eq!(ledger.update_book(book_id, BookPatch::default()).unwrap(), before);

        let err = ledger
            .update_book(BookId(9), BookPatch { title: Some("x".into()), ..BookPatch::default() })
            .unwrap_err();
        assert!(matches!(err, LedgerError::BookNotFound(BookId(9))));
        assert!(ledger.update_book(BookId(9), BookPatch::default()).is_err());
    }

    #[test]
    fn test_borrower_crud() {
        let (ledger, _, borrower_id) = ledger_with_book(1);
        assert_eq!(borrower_id.as_str(), "B0001");

        let updated = ledger
            .update_borrower(
                &borrower_id,
                BorrowerPatch {
                    phone: Some("555-0199".to_string()),
                    ..BorrowerPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.phone, "555-0199");
        assert_eq!(updated.name, "Ada");

        ledger.delete_borrower(&borrower_id).unwrap();
        assert!(ledger.borrower(&borrower_id).is_none());
        assert!(ledger.delete_borrower(&borrower_id).is_err());

        let next = ledger
            .add_borrower(NewBorrower::new("Grace", "grace@example.com", ""))
            .unwrap();
        assert_eq!(next.id.as_str(), "B0001");
    }

    #[test]
    fn test_active_transactions_is_restartable_snapshot() {
        let (ledger, book_id, borrower_id) = ledger_with_book(3);
        let first = ledger.borrow(book_id, &borrower_id).unwrap();
        ledger.borrow(book_id, &borrower_id).unwrap();
        ledger.return_book(first.transaction_id).unwrap();

        let active = ledger.active_transactions();
        assert_eq!(active.len(), 1);
        let ids: Vec<_> = active.iter().map(|t| t.transaction_id).collect();
        let again: Vec<_> = (&active).into_iter().map(|t| t.transaction_id).collect();
        assert_eq!(ids, vec![TransactionId(2)]);
        assert_eq!(ids, again);

        // Later borrows don't leak into an existing view
        ledger.borrow(book_id, &borrower_id).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(ledger.active_transactions().len(), 2);
    }

    #[test]
    fn test_overdue_transactions() {
        let (ledger, book_id, borrower_id) = ledger_with_book(2);
        ledger.borrow_for(book_id, &borrower_id, 0).unwrap();
        ledger.borrow_for(book_id, &borrower_id, 30).unwrap();

        let later = Utc::now() + Duration::days(1);
        let overdue = ledger.overdue_transactions(later);
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].transaction_id, TransactionId(1));
    }
}
