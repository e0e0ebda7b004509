//! Text normalization for search.
//!
//! Raw query or metadata text goes through a fixed pipeline and comes out as
//! a set of stemmed tokens:
//!
//! ```text
//! "The Great Gatsby!" -> "the great gatsby!" -> "the great gatsby"
//!                     -> ["the", "great", "gatsby"] -> ["great", "gatsby"]
//!                     -> {"great", "gatsbi"}
//! ```

use crate::stemmer::PorterStemmer;
use crate::stopwords;
use std::collections::HashSet;
use tracing::trace;
use unicode_segmentation::UnicodeSegmentation;

/// Canonical token set produced by [`TextNormalizer::normalize`]
pub type TokenSet = HashSet<String>;

/// Lowercases, strips punctuation, tokenizes, removes stop words and stems.
///
/// Cheap to clone; holds only the stop-word lookup set.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    stop_words: HashSet<&'static str>,
    stemmer: PorterStemmer,
}

impl TextNormalizer {
    /// Create a normalizer with the English stop-word list
    pub fn new() -> Self {
        Self {
            stop_words: stopwords::english(),
            stemmer: PorterStemmer::new(),
        }
    }

    /// Normalize text into a set of stemmed tokens.
    ///
    /// Empty input yields an empty set. Tokens that are not ASCII words
    /// (numbers, accented words) skip stemming but are otherwise kept.
    pub fn normalize(&self, text: &str) -> TokenSet {
        let tokens: TokenSet = self.tokens(text).into_iter().collect();
        trace!(input_len = text.len(), tokens = tokens.len(), "normalized text");
        tokens
    }

    /// The same pipeline as [`normalize`](Self::normalize), in document
    /// order and without collapsing duplicates
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect();

        cleaned
            .unicode_words()
            .filter(|word| !self.stop_words.contains(word))
            .map(|word| self.stemmer.stem(word))
            .collect()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> TokenSet {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_title_with_stop_word_and_punctuation() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("The Great Gatsby!"), set(&["great", "gatsbi"]));
        assert_eq!(
            normalizer.normalize("The Great Gatsby!"),
            normalizer.normalize("great gatsby")
        );
    }

    #[test]
    fn test_empty_and_stop_word_only_input() {
        let normalizer = TextNormalizer::new();
        assert!(normalizer.normalize("").is_empty());
        assert!(normalizer.normalize("   ").is_empty());
        assert!(normalizer.normalize("the and of").is_empty());
        assert!(normalizer.normalize("?!...").is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        let normalizer = TextNormalizer::new();
        let tokens = normalizer.normalize("Run running runs RUN");
        assert_eq!(tokens, set(&["run"]));
    }

    #[test]
    fn test_tokens_keep_order_and_duplicates() {
        let normalizer = TextNormalizer::new();
        let tokens = normalizer.tokens("Books about books");
        assert_eq!(tokens, vec!["book", "book"]);
    }

    #[test]
    fn test_apostrophes_are_removed_before_filtering() {
        let normalizer = TextNormalizer::new();
        // "don't" becomes "dont", which is not in the stop list
        assert_eq!(normalizer.normalize("don't"), set(&["dont"]));
        assert_eq!(normalizer.normalize("Ender's Game"), set(&["ender", "game"]));
    }

    #[test]
    fn test_numbers_pass_through() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("1984"), set(&["1984"]));
        assert_eq!(normalizer.normalize("Catch-22"), set(&["catch22"]));
    }
}
