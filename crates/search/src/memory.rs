//! In-memory reference document store
//!
//! Brute-force O(n) cosine search over documents held in insertion order.
//! Sufficient for tests, demos and small knowledge bases; production stores
//! implement [`DocumentStore`] over their own index.
//!
//! Determinism: candidates are sorted by (similarity desc, insertion order
//! asc), so identical queries always return identical lists.

use async_trait::async_trait;
use parking_lot::RwLock;
use recall_core::{
    CandidateResult, Document, DocumentStore, Metadata, RecallError, RecallResult, SearchFilter,
};
use std::cmp::Ordering;

#[derive(Debug, Clone)]
struct StoredDocument {
    document: Document,
    embedding: Vec<f32>,
    metadata: Metadata,
}

/// A [`DocumentStore`] backed by a vector of documents and embeddings.
#[derive(Debug)]
pub struct InMemoryDocumentStore {
    dimension: usize,
    entries: RwLock<Vec<StoredDocument>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store for vectors of `dimension` components
    pub fn new(dimension: usize) -> Self {
        InMemoryDocumentStore {
            dimension,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Vector dimensionality
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Insert or replace a document.
    ///
    /// Replacing keeps the original insertion position.
    pub fn insert(
        &self,
        document: Document,
        embedding: Vec<f32>,
        metadata: Metadata,
    ) -> RecallResult<()> {
        if embedding.len() != self.dimension {
            return Err(RecallError::Embedding(format!(
                "document '{}' has {} dimensions, store expects {}",
                document.id,
                embedding.len(),
                self.dimension
            )));
        }

        let entry = StoredDocument {
            document,
            embedding,
            metadata,
        };
        let mut entries = self.entries.write();
        match entries
            .iter_mut()
            .find(|e| e.document.id == entry.document.id)
        {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        Ok(())
    }

    /// Remove a document by id, returning whether it existed
    pub fn remove(&self, id: &str) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.document.id != id);
        entries.len() != before
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> RecallResult<Vec<CandidateResult>> {
        if query_embedding.len() != self.dimension {
            return Err(RecallError::Embedding(format!(
                "query has {} dimensions, store expects {}",
                query_embedding.len(),
                self.dimension
            )));
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let entries = self.entries.read();
        let mut scored: Vec<(usize, f32)> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| filter.map_or(true, |f| f.matches(&e.metadata)))
            .map(|(idx, e)| (idx, cosine_similarity(query_embedding, &e.embedding)))
            .collect();

        scored.sort_by(|(idx_a, score_a), (idx_b, score_b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| idx_a.cmp(idx_b))
        });
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(idx, score)| {
                let e = &entries[idx];
                CandidateResult::new(e.document.clone(), score).with_metadata(e.metadata.clone())
            })
            .collect())
    }

    async fn get_all(&self) -> RecallResult<Vec<Document>> {
        Ok(self
            .entries
            .read()
            .iter()
            .map(|e| e.document.clone())
            .collect())
    }
}

/// Cosine similarity: dot(a,b) / (||a|| * ||b||)
///
/// Range: [-1, 1]. Returns 0.0 if either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
