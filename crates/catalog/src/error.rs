//! Error types for the catalog crate.
//!
//! Two layers:
//! - `StoreError` is what a storage backend reports (I/O, bad JSON, backend
//!   unreachable). It never leaves the crate raw; the ledger wraps it.
//! - `LedgerError` is what every ledger and review operation returns. Each
//!   variant maps onto one of four caller-facing [`ErrorKind`]s.
//!
//! Callers that want a success flag plus a printable message instead of a
//! `Result` convert with [`Outcome::from`].

use crate::types::{BookId, BorrowerId, TransactionId};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a storage backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored data could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend could not be reached or is unusable
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by ledger and review operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Book {0} not found")]
    BookNotFound(BookId),

    #[error("Borrower {0} not found")]
    BorrowerNotFound(BorrowerId),

    #[error("Transaction {0} not found")]
    TransactionNotFound(TransactionId),

    /// An operation referenced an entity that doesn't exist
    #[error("Invalid {entity} ID: {id}")]
    InvalidReference { entity: &'static str, id: String },

    #[error("No copies available")]
    NoCopiesAvailable(BookId),

    #[error("Book already returned")]
    AlreadyReturned(TransactionId),

    /// A supplied value is structurally invalid
    #[error("Invalid value for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),

    /// A writer panicked while holding the state lock
    #[error("Storage failure: ledger state is poisoned")]
    StatePoisoned,
}

/// Caller-facing error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// A book, borrower or transaction id is unknown
    NotFound,
    /// The operation is not valid in the current state (no copies, double return)
    InvalidState,
    /// Malformed rating, copy count or similar
    InvalidInput,
    /// The storage backend failed
    StorageFailure,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::BookNotFound(_)
            | LedgerError::BorrowerNotFound(_)
            | LedgerError::TransactionNotFound(_)
            | LedgerError::InvalidReference { .. } => ErrorKind::NotFound,
            LedgerError::NoCopiesAvailable(_) | LedgerError::AlreadyReturned(_) => {
                ErrorKind::InvalidState
            }
            LedgerError::InvalidInput { .. } => ErrorKind::InvalidInput,
            LedgerError::Storage(_) | LedgerError::StatePoisoned => ErrorKind::StorageFailure,
        }
    }

    pub(crate) fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        LedgerError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Success flag plus a human-readable message, ready to show to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub ok: bool,
    pub message: String,
    /// Set on failure
    pub kind: Option<ErrorKind>,
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            kind: None,
        }
    }

    pub fn failure(error: &LedgerError) -> Self {
        Self {
            ok: false,
            message: error.to_string(),
            kind: Some(error.kind()),
        }
    }
}

impl<T: fmt::Display> From<Result<T>> for Outcome {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::success(value.to_string()),
            Err(error) => Outcome::failure(&error),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
