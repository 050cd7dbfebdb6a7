//! Document and result types
//!
//! - `Document`: a corpus item, immutable once retrieved
//! - `CandidateResult`: one candidate produced by one search pass
//! - `RankedResult`: the terminal artifact handed back to the caller

use serde::{Deserialize, Serialize};

/// Free-form metadata attached to a document by the store
/// (e.g. `category`, `technical_level`, `entities`).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// Document
// ============================================================================

/// A corpus item. Identity is the `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Document {
    /// Corpus key
    pub id: String,
    /// Passage text used for lexical scoring and judging
    pub text: String,
}

impl Document {
    /// Create a new document
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Document {
            id: id.into(),
            text: text.into(),
        }
    }
}

// ============================================================================
// CandidateResult
// ============================================================================

/// A scored candidate from one search pass.
///
/// Ordering by `combined_score` descending is the canonical rank; ties keep
/// the order the document store returned them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    /// The candidate document
    pub item: Document,
    /// Store-supplied metadata
    #[serde(default)]
    pub metadata: Metadata,
    /// Vector similarity reported by the store
    pub vector_score: f32,
    /// BM25 score against the corpus statistics (0 until scored)
    #[serde(default)]
    pub bm25_score: f32,
    /// Fused ranking score (0 until fused)
    #[serde(default)]
    pub combined_score: f32,
}

impl CandidateResult {
    /// Create a candidate carrying only its vector similarity
    pub fn new(item: Document, vector_score: f32) -> Self {
        CandidateResult {
            item,
            metadata: Metadata::new(),
            vector_score,
            bm25_score: 0.0,
            combined_score: 0.0,
        }
    }

    /// Builder: set metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Document id shortcut
    pub fn id(&self) -> &str {
        &self.item.id
    }

    /// Metadata `category` value, if present and a string
    pub fn category(&self) -> Option<&str> {
        self.metadata.get("category").and_then(|v| v.as_str())
    }
}

// ============================================================================
// RankedResult
// ============================================================================

/// Final ranked item returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    /// The ranked document
    pub item: Document,
    /// Store-supplied metadata
    pub metadata: Metadata,
    /// Score used for the final ordering (judge score when reranked,
    /// otherwise the fused score)
    pub final_score: f32,
    /// Fused score before reranking
    pub original_score: f32,
    /// Short human-readable account of how the score was produced
    pub explanation: String,
}

impl RankedResult {
    /// Document id shortcut
    pub fn id(&self) -> &str {
        &self.item.id
    }
}
