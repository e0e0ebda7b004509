//! Lexicon-based sentiment scoring for review text.
//!
//! A rule-based polarity scorer in the VADER family:
//!
//! 1. Split on whitespace and trim surrounding punctuation from words
//! 2. Look up each word's valence in the [`Lexicon`]
//! 3. Adjust for the three preceding words: booster/dampener words
//!    ("very", "slightly"), negations ("not", "isn't"), and "least"
//! 4. Emphasise ALL-CAPS words when the rest of the text is not shouted
//! 5. Weight words after "but" more heavily than words before it
//! 6. Amplify by trailing `!` and `?` marks
//! 7. Normalize the sum into a compound score in `[-1, 1]`
//!
//! The compound score is bucketed into a [`SentimentLabel`] with fixed
//! thresholds of `±0.05`.

use crate::lexicon::Lexicon;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Compound score above which text is positive
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound score below which text is negative
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

// Empirically derived scaling constants
const BOOST_INCR: f64 = 0.293;
const BOOST_DECR: f64 = -0.293;
const CAPS_INCR: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
/// Approximates the maximum expected sum when normalizing
const NORMALIZE_ALPHA: f64 = 15.0;

const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt", "ain't",
    "aren't", "can't", "couldn't", "daren't", "didn't", "doesn't", "dont", "hadnt", "hasnt",
    "havent", "isnt", "mightnt", "mustnt", "neither", "don't", "hadn't", "hasn't", "haven't",
    "isn't", "mightn't", "mustn't", "neednt", "needn't", "never", "none", "nope", "nor",
    "not", "nothing", "nowhere", "oughtnt", "shant", "shouldnt", "uhuh", "wasnt", "werent",
    "oughtn't", "shan't", "shouldn't", "uh-uh", "wasn't", "weren't", "without", "wont",
    "wouldnt", "won't", "wouldn't", "rarely", "seldom", "despite",
];

const BOOSTERS: &[&str] = &[
    "absolutely", "amazingly", "awfully", "completely", "considerable", "considerably",
    "decidedly", "deeply", "effing", "enormous", "enormously", "entirely", "especially",
    "exceptional", "exceptionally", "extreme", "extremely", "fabulously", "flipping",
    "flippin", "frackin", "fracking", "fricking", "frickin", "frigging", "friggin", "fully",
    "fuckin", "fucking", "fuggin", "fugging", "greatly", "hella", "highly", "hugely",
    "incredible", "incredibly", "intensely", "major", "majorly", "more", "most",
    "particularly", "purely", "quite", "really", "remarkably", "so", "substantially",
    "thoroughly", "total", "totally", "tremendous", "tremendously", "uber", "unbelievably",
    "unusually", "utter", "utterly", "very",
];

const DAMPENERS: &[&str] = &[
    "almost", "barely", "hardly", "just enough", "kind of", "kinda", "kindof", "kind-of",
    "less", "little", "marginal", "marginally", "occasional", "occasionally", "partly",
    "scarce", "scarcely", "slight", "slightly", "somewhat", "sort of", "sorta", "sortof",
    "sort-of",
];

/// Sentiment bucket derived from the compound score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Bucket a compound score.
    ///
    /// Positive above 0.05, negative below -0.05, neutral otherwise
    /// (both boundaries are neutral).
    pub fn from_compound(compound: f64) -> Self {
        if compound > POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if compound < NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw polarity scores.
///
/// `neg`, `neu` and `pos` are proportions of the text and sum to roughly 1
/// (all zero for text with no words); `compound` is the normalized
/// aggregate in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

/// Output of [`SentimentClassifier::classify`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: SentimentLabel,
    pub scores: SentimentScores,
}

/// Scores review text against a valence lexicon.
///
/// Deterministic and side-effect free. The lexicon is shared behind an
/// `Arc`, so cloning a classifier is cheap.
#[derive(Debug, Clone)]
pub struct SentimentClassifier {
    lexicon: Arc<Lexicon>,
    boosters: HashMap<&'static str, f64>,
}

impl SentimentClassifier {
    /// Create a classifier with the built-in lexicon
    pub fn new() -> Self {
        Self::with_lexicon(Lexicon::builtin())
    }

    /// Create a classifier with a custom lexicon
    pub fn with_lexicon(lexicon: Lexicon) -> Self {
        let boosters = BOOSTERS
            .iter()
            .map(|&w| (w, BOOST_INCR))
            .chain(DAMPENERS.iter().map(|&w| (w, BOOST_DECR)))
            .collect();
        Self {
            lexicon: Arc::new(lexicon),
            boosters,
        }
    }

    /// Score text and bucket it into a label
    pub fn classify(&self, text: &str) -> Classification {
        let scores = self.polarity_scores(text);
        let label = SentimentLabel::from_compound(scores.compound);
        debug!(compound = scores.compound, %label, "classified text");
        Classification { label, scores }
    }

    /// Compute raw polarity scores for text
    pub fn polarity_scores(&self, text: &str) -> SentimentScores {
        let words: Vec<&str> = text.split_whitespace().map(strip_punctuation).collect();
        let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        let cap_diff = allcap_differential(&words);

        let mut sentiments = Vec::with_capacity(words.len());
        for (i, word) in lower.iter().enumerate() {
            if self.boosters.contains_key(word.as_str()) {
                sentiments.push(0.0);
                continue;
            }
            if word == "kind" && lower.get(i + 1).is_some_and(|next| next == "of") {
                sentiments.push(0.0);
                continue;
            }
            sentiments.push(self.word_valence(&words, &lower, i, cap_diff));
        }

        but_check(&lower, &mut sentiments);
        self.score_valence(&sentiments, text)
    }

    /// Valence of the word at `i` after contextual adjustments
    fn word_valence(&self, words: &[&str], lower: &[String], i: usize, cap_diff: bool) -> f64 {
        let Some(base) = self.lexicon.get(&lower[i]) else {
            return 0.0;
        };
        let mut valence = base;

        // "no" directly before another sentiment word carries no valence of its own
        if lower[i] == "no" && lower.get(i + 1).is_some_and(|next| self.lexicon.contains(next)) {
            valence = 0.0;
        }
        let preceded_by_no = (i > 0 && lower[i - 1] == "no")
            || (i > 1 && lower[i - 2] == "no")
            || (i > 2 && lower[i - 3] == "no" && matches!(lower[i - 1].as_str(), "or" | "nor"));
        if preceded_by_no {
            valence = base * NEGATION_SCALAR;
        }

        if cap_diff && is_upper(words[i]) {
            valence += if valence > 0.0 { CAPS_INCR } else { -CAPS_INCR };
        }

        for start in 0..3 {
            if i <= start {
                break;
            }
            let prev = &lower[i - (start + 1)];
            if self.lexicon.contains(prev) {
                continue;
            }
            let mut scalar = self.booster_scalar(words[i - (start + 1)], prev, valence, cap_diff);
            if start == 1 {
                scalar *= 0.95;
            } else if start == 2 {
                scalar *= 0.9;
            }
            valence += scalar;
            valence = negation_check(valence, lower, start, i);
        }

        least_check(valence, lower, i, &self.lexicon)
    }

    /// Intensity shift contributed by a booster or dampener word
    fn booster_scalar(&self, word: &str, lower: &str, valence: f64, cap_diff: bool) -> f64 {
        let Some(&base) = self.boosters.get(lower) else {
            return 0.0;
        };
        let mut scalar = if valence < 0.0 { -base } else { base };
        if cap_diff && is_upper(word) {
            scalar += if valence > 0.0 { CAPS_INCR } else { -CAPS_INCR };
        }
        scalar
    }

    fn score_valence(&self, sentiments: &[f64], text: &str) -> SentimentScores {
        if sentiments.is_empty() {
            return SentimentScores::default();
        }

        let emphasis = punctuation_emphasis(text);
        let mut sum: f64 = sentiments.iter().sum();
        if sum > 0.0 {
            sum += emphasis;
        } else if sum < 0.0 {
            sum -= emphasis;
        }
        let compound = normalize(sum);

        let (mut pos_sum, mut neg_sum, neu_count) = sift_sentiments(sentiments);
        if pos_sum > neg_sum.abs() {
            pos_sum += emphasis;
        } else if pos_sum < neg_sum.abs() {
            neg_sum -= emphasis;
        }

        let total = pos_sum + neg_sum.abs() + neu_count;
        if total == 0.0 {
            return SentimentScores {
                compound: round_to(compound, 4),
                ..SentimentScores::default()
            };
        }

        SentimentScores {
            neg: round_to((neg_sum / total).abs(), 3),
            neu: round_to((neu_count / total).abs(), 3),
            pos: round_to((pos_sum / total).abs(), 3),
            compound: round_to(compound, 4),
        }
    }
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim surrounding punctuation unless that would leave two characters or
/// fewer (keeps emoticons such as `:)` intact)
fn strip_punctuation(token: &str) -> &str {
    let stripped = token.trim_matches(|c: char| c.is_ascii_punctuation());
    if stripped.chars().count() <= 2 {
        token
    } else {
        stripped
    }
}

/// At least one cased character, and every cased character is uppercase
fn is_upper(word: &str) -> bool {
    let mut has_cased = false;
    for c in word.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

/// True when some, but not all, words are ALL CAPS
fn allcap_differential(words: &[&str]) -> bool {
    let caps = words.iter().filter(|w| is_upper(w)).count();
    caps > 0 && caps < words.len()
}

fn is_negated(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.contains("n't")
}

fn negation_check(valence: f64, lower: &[String], start: usize, i: usize) -> f64 {
    let back = |n: usize| lower[i - n].as_str();
    match start {
        0 => {
            if is_negated(back(1)) {
                return valence * NEGATION_SCALAR;
            }
        }
        1 => {
            if back(2) == "never" && matches!(back(1), "so" | "this") {
                return valence * 1.25;
            }
            if back(2) == "without" && back(1) == "doubt" {
                return valence;
            }
            if is_negated(back(2)) {
                return valence * NEGATION_SCALAR;
            }
        }
        2 => {
            if back(3) == "never"
                && (matches!(back(2), "so" | "this") || matches!(back(1), "so" | "this"))
            {
                return valence * 1.25;
            }
            if back(3) == "without" && (back(2) == "doubt" || back(1) == "doubt") {
                return valence;
            }
            if is_negated(back(3)) {
                return valence * NEGATION_SCALAR;
            }
        }
        _ => {}
    }
    valence
}

/// "least" flips polarity unless it is part of "at least" / "very least"
fn least_check(valence: f64, lower: &[String], i: usize, lexicon: &Lexicon) -> f64 {
    if i > 0 && lower[i - 1] == "least" && !lexicon.contains("least") {
        if i > 1 && matches!(lower[i - 2].as_str(), "at" | "very") {
            return valence;
        }
        return valence * NEGATION_SCALAR;
    }
    valence
}

/// Words before "but" count half, words after count one and a half
fn but_check(lower: &[String], sentiments: &mut [f64]) {
    let Some(but_idx) = lower.iter().position(|w| w == "but") else {
        return;
    };
    for (idx, sentiment) in sentiments.iter_mut().enumerate() {
        if idx < but_idx {
            *sentiment *= 0.5;
        } else if idx > but_idx {
            *sentiment *= 1.5;
        }
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(4) as f64 * 0.292;
    let questions = match text.matches('?').count() {
        0 | 1 => 0.0,
        n @ 2..=3 => n as f64 * 0.18,
        _ => 0.96,
    };
    exclamations + questions
}

fn sift_sentiments(sentiments: &[f64]) -> (f64, f64, f64) {
    sentiments
        .iter()
        .fold((0.0, 0.0, 0.0), |(pos, neg, neu), &s| {
            if s > 0.0 {
                (pos + s + 1.0, neg, neu)
            } else if s < 0.0 {
                (pos, neg + s - 1.0, neu)
            } else {
                (pos, neg, neu + 1.0)
            }
        })
}

/// Map an unbounded sum into `[-1, 1]`
fn normalize(score: f64) -> f64 {
    (score / (score * score + NORMALIZE_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
