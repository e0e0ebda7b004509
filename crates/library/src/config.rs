//! Library configuration.

use catalog::DEFAULT_LOAN_DAYS;
use std::path::{Path, PathBuf};

/// Default data file, relative to the working directory. Distinct from the
/// legacy `library_data.json`, whose layout has no book ids.
pub const DEFAULT_DATA_FILE: &str = "libcat_data.json";

/// Where the library is stored, how long loans last and which sentiment
/// lexicon scores reviews.
///
/// `data_file = None` keeps everything in memory. `lexicon_file = None` uses
/// the built-in lexicon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    pub data_file: Option<PathBuf>,
    pub loan_days: u32,
    pub lexicon_file: Option<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            data_file: Some(PathBuf::from(DEFAULT_DATA_FILE)),
            loan_days: DEFAULT_LOAN_DAYS,
            lexicon_file: None,
        }
    }
}

impl LibraryConfig {
    /// In-memory library with the default loan period
    pub fn in_memory() -> Self {
        Self {
            data_file: None,
            ..Self::default()
        }
    }

    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = Some(path.into());
        self
    }

    pub fn with_loan_days(mut self, loan_days: u32) -> Self {
        self.loan_days = loan_days;
        self
    }

    /// Score reviews with a lexicon file such as the published `vader_lexicon.txt`
    pub fn with_lexicon_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.lexicon_file = Some(path.into());
        self
    }

    pub fn data_file(&self) -> Option<&Path> {
        self.data_file.as_deref()
    }

    pub fn lexicon_file(&self) -> Option<&Path> {
        self.lexicon_file.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LibraryConfig::default();
        assert_eq!(config.data_file(), Some(Path::new("libcat_data.json")));
        assert_eq!(config.loan_days, 14);
        assert_eq!(config.lexicon_file(), None);
    }

    #[test]
    fn test_builders() {
        let config = LibraryConfig::in_memory().with_loan_days(7);
        assert_eq!(config.data_file(), None);
        assert_eq!(config.loan_days, 7);

        let config = config.with_data_file("/tmp/branch.json");
        assert_eq!(config.data_file(), Some(Path::new("/tmp/branch.json")));

        let config = config.with_lexicon_file("vader_lexicon.txt");
        assert_eq!(config.lexicon_file(), Some(Path::new("vader_lexicon.txt")));
    }
}
