//! Text tokenizer shared by indexing and query scoring
//!
//! Pipeline: UAX#29 word boundaries → strip possessives → remove non-alphanumeric
//!           → lowercase → filter short tokens → remove stopwords (optional)
//!
//! Corpus statistics and query scoring must go through the same options;
//! [`tokenize`] is the one entry point both sides use.

use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// Standard English stopwords (Lucene's default set).
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Minimum token length in bytes
const MIN_TOKEN_LEN: usize = 2;

/// Tokenizer switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Drop English stopwords
    pub remove_stopwords: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        TokenizerOptions {
            remove_stopwords: true,
        }
    }
}

#[inline]
fn is_stopword(token: &str) -> bool {
    // Linear scan is fast for ~33 entries.
    STOPWORDS.contains(&token)
}

/// Strip English possessive suffix (`'s` / `\u{2019}s`).
#[inline]
fn strip_possessive(word: &str) -> &str {
    word.strip_suffix("'s")
        .or_else(|| word.strip_suffix("\u{2019}s"))
        .unwrap_or(word)
}

/// Tokenize text with the default options (stopwords removed).
///
/// # Example
///
/// ```
/// use recall_search::tokenizer::tokenize;
///
/// let tokens = tokenize("The Pricing Plans start at $10");
/// assert_eq!(tokens, vec!["pricing", "plans", "start", "10"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_with(text, &TokenizerOptions::default())
}

/// Tokenize text with explicit options.
pub fn tokenize_with(text: &str, options: &TokenizerOptions) -> Vec<String> {
    text.unicode_words()
        .map(strip_possessive)
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .map(|w| w.to_lowercase())
        .filter(|s| s.len() >= MIN_TOKEN_LEN)
        .filter(|s| !options.remove_stopwords || !is_stopword(s))
        .collect()
}

/// Tokenize and deduplicate, preserving first-occurrence order.
///
/// # Example
///
/// ```
/// use recall_search::tokenizer::tokenize_unique;
///
/// let tokens = tokenize_unique("test test TEST");
/// assert_eq!(tokens, vec!["test"]);
/// ```
pub fn tokenize_unique(text: &str) -> Vec<String> {
    tokenize_unique_with(text, &TokenizerOptions::default())
}

/// Tokenize with explicit options and deduplicate.
pub fn tokenize_unique_with(text: &str, options: &TokenizerOptions) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize_with(text, options)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
