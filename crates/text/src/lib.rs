//! # Text Crate
//!
//! Text algorithms used by the catalog: query/metadata normalization and
//! review sentiment scoring.
//!
//! ## Components
//!
//! ### TextNormalizer
//! Turns raw text into a canonical token set:
//! 1. Lowercase
//! 2. Strip ASCII punctuation
//! 3. Split on Unicode word boundaries
//! 4. Drop English stop words
//! 5. Reduce each token with the Porter stemmer
//!
//! The output is a set, so repeated words collapse. Ranking downstream uses
//! set similarity rather than term frequency.
//!
//! ### SentimentClassifier
//! A lexicon-based polarity scorer in the VADER family. Produces a compound
//! score in `[-1, 1]` plus positive/negative/neutral proportions, and buckets
//! the compound score into a [`SentimentLabel`].
//!
//! ## Example Usage
//!
//! ```ignore
//! use text::{SentimentClassifier, TextNormalizer};
//!
//! let normalizer = TextNormalizer::new();
//! let tokens = normalizer.normalize("The Great Gatsby!");
//!
//! let classifier = SentimentClassifier::new();
//! let classification = classifier.classify("I loved this book");
//! println!("{} ({:.3})", classification.label, classification.scores.compound);
//! ```

pub mod lexicon;
pub mod normalizer;
pub mod sentiment;
pub mod stemmer;
pub mod stopwords;

// Re-export commonly used types
pub use lexicon::{Lexicon, LexiconError};
pub use normalizer::{TextNormalizer, TokenSet};
pub use sentiment::{Classification, SentimentClassifier, SentimentLabel, SentimentScores};
pub use stemmer::PorterStemmer;
