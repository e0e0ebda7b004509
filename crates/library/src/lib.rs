//! Library crate: the facade callers use to run a library.
//!
//! This crate wires the circulation ledger, the similarity ranker and the
//! review aggregator together behind one [`Library`] handle, configured by
//! [`LibraryConfig`].

pub mod config;
pub mod facade;

pub use config::{LibraryConfig, DEFAULT_DATA_FILE};
pub use facade::{Library, SearchHit};

// Types callers need alongside the facade
pub use catalog::{
    Book, BookId, BookPatch, Borrower, BorrowerId, BorrowerPatch, ErrorKind, NewBook,
    NewBorrower, Outcome, Review, SentimentCounts, SentimentSummary, Transaction, TransactionId,
};
pub use search::SearchScope;
pub use text::SentimentLabel;
