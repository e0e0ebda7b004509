//! Core domain types for the library catalog.
//!
//! This module defines the records owned by the circulation ledger and the
//! input/patch types callers use to create and change them:
//! - Strongly typed identifiers (BookId, BorrowerId, TransactionId, ReviewId)
//! - Book, Borrower, Transaction and Review records
//! - NewBook / NewBorrower inputs and BookPatch / BorrowerPatch updates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use text::{SentimentLabel, SentimentScores};

// =============================================================================
// Identifiers
// =============================================================================
// Newtypes keep book ids, transaction ids and review ids from being mixed up.
// All of them serialize as their bare inner value.

/// Unique, stable identifier of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub u32);

/// Unique identifier of a borrow transaction; increases monotonically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub u32);

/// Sequential identifier of a review, scoped to its book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub u32);

/// Identifier of a borrower.
///
/// Issued as `B` followed by a zero-padded sequence number (`B0001`), but any
/// non-empty string loaded from storage is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BorrowerId(String);

impl BorrowerId {
    /// Build the id issued for the n-th borrower
    pub fn from_sequence(n: u32) -> Self {
        Self(format!("B{n:04}"))
    }

    /// Sequence number of an issued id, `None` for ids in another format
    pub fn sequence(&self) -> Option<u32> {
        self.0.strip_prefix('B')?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BorrowerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when parsing an identifier from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid identifier: {0:?}")]
pub struct ParseIdError(pub String);

impl FromStr for BookId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(BookId).map_err(|_| ParseIdError(s.to_string()))
    }
}

impl FromStr for TransactionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(TransactionId)
            .map_err(|_| ParseIdError(s.to_string()))
    }
}

impl FromStr for BorrowerId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

// =============================================================================
// Books
// =============================================================================

/// A catalog entry.
///
/// Invariant: `available <= copies`. Only the ledger mutates books, and every
/// mutation path preserves this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    /// Total copies owned
    pub copies: u32,
    /// Copies currently on the shelf
    pub available: u32,
}

impl Book {
    /// Copies currently lent out
    pub fn on_loan(&self) -> u32 {
        self.copies.saturating_sub(self.available)
    }
}

/// Input for [`CirculationLedger::add_book`](crate::CirculationLedger::add_book).
///
/// `copies` is signed so that a negative count from an outer layer reaches
/// the ledger and is rejected there with `InvalidInput`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    pub copies: i64,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        genre: impl Into<String>,
        copies: i64,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            genre: genre.into(),
            copies,
        }
    }
}

/// Partial update of a book.
///
/// Only the fields listed here can change. `available` is not exposed; it
/// follows `copies` so that the number of copies on loan stays the same.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub copies: Option<u32>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// =============================================================================
// Borrowers
// =============================================================================

/// A registered library member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrower {
    pub id: BorrowerId,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Open transactions held by this borrower
    #[serde(default)]
    pub borrowed_books: BTreeSet<TransactionId>,
}

/// Input for registering a borrower
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBorrower {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl NewBorrower {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}

/// Partial update of a borrower's contact details
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorrowerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl BorrowerPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// =============================================================================
// Circulation
// =============================================================================

/// One borrow of one copy.
///
/// Created open on borrow. Closes exactly once, when `return_date` is set,
/// and is never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub book_id: BookId,
    pub borrower_id: BorrowerId,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    /// Open and past its due date at `at`
    pub fn is_overdue(&self, at: DateTime<Utc>) -> bool {
        self.is_open() && self.due_date < at
    }
}

// =============================================================================
// Reviews
// =============================================================================

/// A borrower's review of a book.
///
/// Sentiment is computed once at creation and stored; reviews are immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: ReviewId,
    pub book_id: BookId,
    pub borrower_id: BorrowerId,
    pub review_text: String,
    /// 1 to 5
    pub rating: u8,
    pub sentiment: SentimentLabel,
    pub sentiment_scores: SentimentScores,
    pub timestamp: DateTime<Utc>,
}
