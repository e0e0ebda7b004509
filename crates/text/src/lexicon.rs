//! Word valence lexicon for sentiment scoring.
//!
//! Lines are tab-separated: `word<TAB>valence[<TAB>...]`. Extra columns (the
//! standard deviation and raw ratings found in published VADER lexicon files)
//! are ignored, so those files can be loaded unchanged. Blank lines and lines
//! starting with `#` are skipped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Built-in lexicon of common review vocabulary
const DEFAULT_LEXICON: &str = include_str!("../data/lexicon.tsv");

/// Errors raised while reading or parsing a lexicon file
#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("Failed to read lexicon {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Lexicon line {line}: missing valence column")]
    MissingValence { line: usize },

    #[error("Lexicon line {line}: invalid valence {value:?}")]
    InvalidValence { line: usize, value: String },
}

/// Lowercase word -> valence (roughly -4.0 to +4.0)
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    valences: HashMap<String, f64>,
}

impl Lexicon {
    /// The built-in lexicon
    pub fn builtin() -> Self {
        // Parsing of the embedded file is checked by test_builtin_lexicon_parses
        DEFAULT_LEXICON.parse().unwrap_or_default()
    }

    /// Load a lexicon file, e.g. the published `vader_lexicon.txt`
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.display().to_string(),
            source,
        })?;
        content.parse()
    }

    pub fn get(&self, word: &str) -> Option<f64> {
        self.valences.get(word).copied()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.valences.contains_key(word)
    }

    /// Add or replace an entry
    pub fn insert(&mut self, word: impl Into<String>, valence: f64) {
        self.valences.insert(word.into().to_lowercase(), valence);
    }

    pub fn len(&self) -> usize {
        self.valences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }
}

impl FromStr for Lexicon {
    type Err = LexiconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lexicon = Lexicon::default();
        for (idx, line) in s.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim_end();
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split('\t');
            let word = parts.next().unwrap_or_default();
            let value = parts
                .next()
                .ok_or(LexiconError::MissingValence { line: line_no })?;
            let valence: f64 = value.trim().parse().map_err(|_| LexiconError::InvalidValence {
                line: line_no,
                value: value.to_string(),
            })?;

            lexicon.insert(word, valence);
        }
        Ok(lexicon)
    }
}
