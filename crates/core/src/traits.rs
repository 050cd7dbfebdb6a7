//! Collaborator traits
//!
//! The retrieval core talks to three external services through these
//! object-safe traits. Implementations are selected once at process start
//! and injected into the router as `Arc<dyn Trait>`.
//!
//! Thread safety: all methods must be safe to call concurrently from
//! multiple tasks (requires Send + Sync).

use async_trait::async_trait;

use crate::analysis::QueryAnalysis;
use crate::document::{CandidateResult, Document};
use crate::error::RecallResult;
use crate::filter::SearchFilter;

/// Persistent document/chunk storage with vector similarity search
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Return up to `limit` candidates ordered by vector similarity.
    ///
    /// Candidates carry `vector_score` and metadata; `bm25_score` and
    /// `combined_score` are left for the caller to fill in. `filter == None`
    /// means "no metadata constraint".
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> RecallResult<Vec<CandidateResult>>;

    /// Return every document in the corpus, for statistics rebuilds
    async fn get_all(&self) -> RecallResult<Vec<Document>>;
}

/// Maps text to a fixed-length vector
///
/// Dimensionality must match the vectors held by the document store.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> RecallResult<Vec<f32>>;

    /// Output dimensionality
    fn dimension(&self) -> usize;
}

/// Classifies a query into category, technical level, entities and intent
#[async_trait]
pub trait QueryAnalyzer: Send + Sync {
    /// Analyze a query. Failure here is fatal to the request.
    async fn analyze(&self, query: &str) -> RecallResult<QueryAnalysis>;
}
