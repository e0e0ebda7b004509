//! JSON-file storage backend.
//!
//! The whole library lives in one pretty-printed JSON document:
//!
//! ```text
//! {
//!   "books":        { "1": { "id": 1, "title": ..., "available": 2 }, ... },
//!   "borrowers":    { "B0001": { "id": "B0001", ..., "borrowed_books": [3] } },
//!   "transactions": [ { "transaction_id": 1, ..., "return_date": null } ],
//!   "reviews":      { "1": [ { "review_id": 1, ..., "sentiment": "positive" } ] }
//! }
//! ```
//!
//! A flush writes a sibling temp file and renames it over the target, so a
//! crash mid-write leaves the previous document intact.

use crate::error::StoreError;
use crate::store::{CatalogStore, LibraryState};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores the library in a single JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "library".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(path: &Path, source: io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl CatalogStore for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    fn load(&self) -> Result<LibraryState, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no data file yet, starting empty");
                return Ok(LibraryState::default());
            }
            Err(e) => return Err(Self::io_error(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(LibraryState::default());
        }

        let state: LibraryState = serde_json::from_str(&content)?;
        debug!(
            path = %self.path.display(),
            books = state.books.len(),
            transactions = state.transactions.len(),
            "loaded library state"
        );
        Ok(state)
    }

    fn flush(&self, state: &LibraryState) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(state)?;
        let temp = self.temp_path();

        fs::write(&temp, json).map_err(|e| Self::io_error(&temp, e))?;
        fs::rename(&temp, &self.path).map_err(|e| Self::io_error(&self.path, e))?;

        debug!(path = %self.path.display(), "flushed library state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    fn sample_state() -> LibraryState {
        let mut state = LibraryState::new();
        state.books.insert(
            BookId(1),
            Book {
                id: BookId(1),
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                isbn: "9780441013593".to_string(),
                genre: "Science Fiction".to_string(),
                copies: 2,
                available: 2,
            },
        );
        state
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load().unwrap(), LibraryState::default());
    }

    #[test]
    fn test_flush_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("library.json"));
        let state = sample_state();

        store.flush(&state).unwrap();
        assert!(!store.temp_path().exists());
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn test_document_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("library.json"));
        store.flush(&sample_state()).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["books"]["1"]["title"], "Dune");
        assert!(value["transactions"].is_array());
        assert!(value["borrowers"].is_object());
        assert!(value["reviews"].is_object());
    }

    #[test]
    fn test_partial_document_defaults_missing_collections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        fs::write(&path, r#"{ "books": {} }"#).unwrap();

        let state = JsonFileStore::new(&path).load().unwrap();
        assert!(state.transactions.is_empty());
        assert!(state.borrowers.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
