//! Corpus statistics for BM25
//!
//! `CorpusStatistics` is the read-mostly, process-wide table BM25 needs:
//! document count, per-term document frequency, per-document length and
//! average length. It is rebuilt in full from the corpus and never mutated
//! field-by-field; see [`crate::handle::StatsHandle`] for the shared handle.
//!
//! # Invariants
//!
//! - `average_document_length == sum(document_lengths) / total_documents`
//! - `document_frequency[t] <= total_documents` for every term
//! - `total_documents == document_lengths.len()` (document ids are unique)
//!
//! Maps are `BTreeMap`s so that two builds over the same corpus are equal
//! and serialize to identical bytes.

use crate::tokenizer::{tokenize_with, TokenizerOptions};
use recall_core::{Document, RecallError, RecallResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Corpus-level statistics for BM25 scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusStatistics {
    total_documents: usize,
    average_document_length: f32,
    document_frequency: BTreeMap<String, usize>,
    document_lengths: BTreeMap<String, usize>,
    /// Tokenizer setting the statistics were built with; query
    /// tokenization must use the same one.
    #[serde(default = "default_remove_stopwords")]
    remove_stopwords: bool,
}

fn default_remove_stopwords() -> bool {
    TokenizerOptions::default().remove_stopwords
}

impl Default for CorpusStatistics {
    fn default() -> Self {
        Self::empty()
    }
}

impl CorpusStatistics {
    /// The "no statistics available" value (`total_documents == 0`).
    ///
    /// Returned by `load` on a cold start or unreadable file. Every term is
    /// absent, so BM25 scores against it are zero.
    pub fn empty() -> Self {
        CorpusStatistics {
            total_documents: 0,
            average_document_length: 0.0,
            document_frequency: BTreeMap::new(),
            document_lengths: BTreeMap::new(),
            remove_stopwords: default_remove_stopwords(),
        }
    }

    /// Build statistics over the full corpus with default tokenizer options.
    ///
    /// # Errors
    ///
    /// Returns `RecallError::InvalidInput` if `documents` is empty.
    pub fn build(documents: &[Document]) -> RecallResult<Self> {
        Self::build_with(documents, &TokenizerOptions::default())
    }

    /// Build statistics with explicit tokenizer options.
    ///
    /// Each document contributes its token count to `document_lengths` and
    /// increments `document_frequency` once per distinct term. A repeated
    /// document id is counted once (first occurrence wins).
    pub fn build_with(documents: &[Document], options: &TokenizerOptions) -> RecallResult<Self> {
        if documents.is_empty() {
            return Err(RecallError::invalid_input(
                "cannot build corpus statistics from an empty document set",
            ));
        }

        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        let mut document_lengths: BTreeMap<String, usize> = BTreeMap::new();
        let mut duplicates = 0usize;

        for doc in documents {
            if document_lengths.contains_key(&doc.id) {
                duplicates += 1;
                continue;
            }

            let tokens = tokenize_with(&doc.text, options);
            document_lengths.insert(doc.id.clone(), tokens.len());

            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *document_frequency.entry(term.to_string()).or_insert(0) += 1;
            }
        }

        if duplicates > 0 {
            tracing::warn!(
                target: "recall::stats",
                duplicates,
                "Duplicate document ids skipped during statistics build"
            );
        }

        let total_documents = document_lengths.len();
        let total_len: u64 = document_lengths.values().map(|&l| l as u64).sum();
        let average_document_length = (total_len as f64 / total_documents as f64) as f32;

        tracing::debug!(
            target: "recall::stats",
            total_documents,
            terms = document_frequency.len(),
            average_document_length,
            "Built corpus statistics"
        );

        Ok(CorpusStatistics {
            total_documents,
            average_document_length,
            document_frequency,
            document_lengths,
            remove_stopwords: options.remove_stopwords,
        })
    }

    /// Number of documents in the corpus
    pub fn total_documents(&self) -> usize {
        self.total_documents
    }

    /// Mean document length in tokens
    pub fn average_document_length(&self) -> f32 {
        self.average_document_length
    }

    /// True for the "no statistics available" value
    pub fn is_empty(&self) -> bool {
        self.total_documents == 0
    }

    /// Number of documents containing `term` (0 if unknown)
    pub fn document_frequency(&self, term: &str) -> usize {
        self.document_frequency.get(term).copied().unwrap_or(0)
    }

    /// Whether `term` appears anywhere in the corpus
    pub fn contains_term(&self, term: &str) -> bool {
        self.document_frequency.contains_key(term)
    }

    /// Full document-frequency table
    pub fn document_frequencies(&self) -> &BTreeMap<String, usize> {
        &self.document_frequency
    }

    /// Token length of a corpus document, if known
    pub fn document_length(&self, doc_id: &str) -> Option<usize> {
        self.document_lengths.get(doc_id).copied()
    }

    /// Full document-length table
    pub fn document_lengths(&self) -> &BTreeMap<String, usize> {
        &self.document_lengths
    }

    /// Tokenizer options matching how the statistics were built
    pub fn tokenizer_options(&self) -> TokenizerOptions {
        TokenizerOptions {
            remove_stopwords: self.remove_stopwords,
        }
    }

    /// Inverse document frequency for a term.
    ///
    /// `IDF(t) = ln(1 + (N - df + 0.5) / (df + 0.5))`. Terms absent from the
    /// corpus return 0 rather than the maximal IDF, so unknown words never
    /// contribute to a score. The value is non-negative because `df <= N`.
    pub fn idf(&self, term: &str) -> f32 {
        let df = match self.document_frequency.get(term) {
            Some(&df) => df as f32,
            None => return 0.0,
        };
        let n = self.total_documents as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Check the structural invariants. Used after loading from disk.
    pub fn is_consistent(&self) -> bool {
        if self.total_documents != self.document_lengths.len() {
            return false;
        }
        if self
            .document_frequency
            .values()
            .any(|&df| df == 0 || df > self.total_documents)
        {
            return false;
        }
        if self.total_documents == 0 {
            return self.document_frequency.is_empty() && self.average_document_length == 0.0;
        }
        let total_len: u64 = self.document_lengths.values().map(|&l| l as u64).sum();
        let expected = (total_len as f64 / self.total_documents as f64) as f32;
        expected == self.average_document_length
    }
}
