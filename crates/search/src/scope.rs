//! Which book fields a query is matched against.

use catalog::Book;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchScope {
    Title,
    Author,
    Genre,
    /// Title, author and genre together
    #[default]
    All,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown search scope: {0:?} (expected title, author, genre or all)")]
pub struct ParseScopeError(pub String);

impl SearchScope {
    pub const ALL_SCOPES: [SearchScope; 4] = [
        SearchScope::Title,
        SearchScope::Author,
        SearchScope::Genre,
        SearchScope::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchScope::Title => "title",
            SearchScope::Author => "author",
            SearchScope::Genre => "genre",
            SearchScope::All => "all",
        }
    }

    /// Text of `book` this scope searches. `All` joins the fields with a space.
    pub fn searchable_text<'a>(&self, book: &'a Book) -> Cow<'a, str> {
        match self {
            SearchScope::Title => Cow::Borrowed(&book.title),
            SearchScope::Author => Cow::Borrowed(&book.author),
            SearchScope::Genre => Cow::Borrowed(&book.genre),
            SearchScope::All => Cow::Owned(format!("{} {} {}", book.title, book.author, book.genre)),
        }
    }
}

impl FromStr for SearchScope {
    type Err = ParseScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(SearchScope::Title),
            "author" => Ok(SearchScope::Author),
            "genre" => Ok(SearchScope::Genre),
            "all" => Ok(SearchScope::All),
            _ => Err(ParseScopeError(s.to_string())),
        }
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
