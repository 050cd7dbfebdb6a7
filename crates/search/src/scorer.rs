//! Lexical scoring
//!
//! This module provides:
//! - Scorer trait for pluggable lexical scorers
//! - BM25Scorer, the default implementation
//!
//! Scores are not normalized here; bringing them onto a comparable range
//! with vector similarity is the job of [`crate::fusion`].

use crate::stats::CorpusStatistics;
use crate::tokenizer::{tokenize_unique_with, tokenize_with};
use recall_core::Document;
use std::collections::HashMap;

// ============================================================================
// Scorer Trait
// ============================================================================

/// Pluggable lexical scoring interface
///
/// Higher scores indicate more relevant documents. Implementations must be
/// pure and never panic: a candidate that cannot be scored scores 0.
pub trait Scorer: Send + Sync {
    /// Score a document against a query
    fn score(&self, query: &str, doc: &Document, stats: &CorpusStatistics) -> f32;

    /// Name for debugging and logging
    fn name(&self) -> &str;
}

// ============================================================================
// BM25Scorer
// ============================================================================

/// Okapi BM25
///
/// For each unique query term t present in the document:
///
/// ```text
/// score += IDF(t) * (tf * (k1 + 1)) / (tf + k1 * (1 - b + b * dl/avgdl))
/// ```
///
/// Where:
/// - tf = term frequency in document
/// - dl = document length in tokens
/// - avgdl = average document length from the corpus statistics
/// - k1 = term saturation parameter (1.2)
/// - b = length normalization parameter (0.75)
///
/// IDF comes from [`CorpusStatistics::idf`], which is 0 for unknown terms,
/// so the score is always non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BM25Scorer {
    k1: f32,
    b: f32,
}

/// Default term saturation
pub const DEFAULT_K1: f32 = 1.2;
/// Default length normalization
pub const DEFAULT_B: f32 = 0.75;

impl Default for BM25Scorer {
    fn default() -> Self {
        BM25Scorer {
            k1: DEFAULT_K1,
            b: DEFAULT_B,
        }
    }
}

impl BM25Scorer {
    /// Create a scorer with custom parameters
    pub fn new(k1: f32, b: f32) -> Self {
        BM25Scorer { k1, b }
    }

    /// Term saturation parameter
    pub fn k1(&self) -> f32 {
        self.k1
    }

    /// Length normalization parameter
    pub fn b(&self) -> f32 {
        self.b
    }

    /// Tokenize a query the way `stats` was built, deduplicated.
    ///
    /// The router calls this once per query and reuses the terms for every
    /// candidate via [`BM25Scorer::score_terms`].
    pub fn query_terms(query: &str, stats: &CorpusStatistics) -> Vec<String> {
        tokenize_unique_with(query, &stats.tokenizer_options())
    }

    /// Score a document against pre-tokenized, unique query terms.
    pub fn score_terms(&self, query_terms: &[String], doc: &Document, stats: &CorpusStatistics) -> f32 {
        if query_terms.is_empty() || stats.is_empty() {
            return 0.0;
        }

        let doc_terms = tokenize_with(&doc.text, &stats.tokenizer_options());
        if doc_terms.is_empty() {
            return 0.0;
        }
        let doc_len = doc_terms.len() as f32;

        let mut doc_term_counts: HashMap<&str, usize> = HashMap::new();
        for term in &doc_terms {
            *doc_term_counts.entry(term.as_str()).or_insert(0) += 1;
        }

        // A corpus of empty documents has no average to normalize against
        let avg_len = stats.average_document_length();
        let length_norm = if avg_len > 0.0 {
            1.0 - self.b + self.b * doc_len / avg_len
        } else {
            1.0
        };

        let mut score = 0.0;
        for query_term in query_terms {
            let tf = match doc_term_counts.get(query_term.as_str()) {
                Some(&tf) => tf as f32,
                None => continue,
            };
            let idf = stats.idf(query_term);
            if idf == 0.0 {
                continue;
            }
            score += idf * (tf * (self.k1 + 1.0)) / (tf + self.k1 * length_norm);
        }
        score
    }
}

impl Scorer for BM25Scorer {
    fn score(&self, query: &str, doc: &Document, stats: &CorpusStatistics) -> f32 {
        let terms = Self::query_terms(query, stats);
        self.score_terms(&terms, doc, stats)
    }

    fn name(&self) -> &str {
        "bm25"
    }
}

// ============================================================================
// Tests
// ============================================================================
