//! Shared fakes and fixtures for the retrieval suite

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use recall::{
    CandidateResult, CorpusStatistics, Document, DocumentStore, EmbeddingService,
    InMemoryDocumentStore, JudgeRequest, JudgeResponse, Metadata, QueryAnalysis, QueryAnalyzer,
    QueryIntent, QueryRouter, RecallError, RecallResult, RelevanceJudge, RerankError,
    SearchFilter, StatsHandle,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

static INIT_TRACING: Once = Once::new();

/// Route `RUST_LOG`-filtered events to the test writer.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Embedding dimensions, one per keyword plus a constant component
pub const VOCAB: [&str; 6] = ["pricing", "security", "support", "plans", "encryption", "onboarding"];

pub fn embed_text(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let mut v: Vec<f32> = VOCAB
        .iter()
        .map(|w| if lower.contains(w) { 1.0 } else { 0.0 })
        .collect();
    v.push(0.1);
    v
}

pub fn dimension() -> usize {
    VOCAB.len() + 1
}

// ============================================================================
// Corpus
// ============================================================================

/// The three-document corpus: (id, text, category, technical level)
pub fn small_corpus() -> Vec<(Document, &'static str, u8)> {
    vec![
        (Document::new("doc-1", "pricing plans start at $10"), "billing", 2),
        (Document::new("doc-2", "our security uses AES-256"), "security", 4),
        (Document::new("doc-3", "contact support for onboarding"), "support", 1),
    ]
}

pub fn metadata(category: &str, level: u8) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("category".into(), json!(category));
    metadata.insert("technical_level".into(), json!(level));
    metadata.insert("entities".into(), json!([]));
    metadata
}

pub fn memory_store(corpus: &[(Document, &'static str, u8)]) -> InMemoryDocumentStore {
    let store = InMemoryDocumentStore::new(dimension());
    for (doc, category, level) in corpus {
        store
            .insert(doc.clone(), embed_text(&doc.text), metadata(category, *level))
            .unwrap();
    }
    store
}

pub fn stats_for(corpus: &[(Document, &'static str, u8)]) -> Arc<StatsHandle> {
    let docs: Vec<Document> = corpus.iter().map(|(d, _, _)| d.clone()).collect();
    Arc::new(StatsHandle::new(CorpusStatistics::build(&docs).unwrap()))
}

// ============================================================================
// Collaborators
// ============================================================================

pub struct FixedAnalyzer(pub QueryAnalysis);

#[async_trait]
impl QueryAnalyzer for FixedAnalyzer {
    async fn analyze(&self, _query: &str) -> RecallResult<QueryAnalysis> {
        Ok(self.0.clone())
    }
}

pub fn informational(category: &str, level: u8) -> Arc<FixedAnalyzer> {
    Arc::new(FixedAnalyzer(QueryAnalysis::new(
        category,
        level,
        QueryIntent::Informational,
    )))
}

pub struct KeywordEmbedder;

#[async_trait]
impl EmbeddingService for KeywordEmbedder {
    async fn embed(&self, text: &str) -> RecallResult<Vec<f32>> {
        Ok(embed_text(text))
    }

    fn dimension(&self) -> usize {
        dimension()
    }
}

/// Wraps a store and records each search filter
pub struct RecordingStore {
    pub inner: InMemoryDocumentStore,
    pub filters: Mutex<Vec<Option<SearchFilter>>>,
}

impl RecordingStore {
    pub fn new(inner: InMemoryDocumentStore) -> Arc<Self> {
        Arc::new(RecordingStore {
            inner,
            filters: Mutex::new(Vec::new()),
        })
    }

    pub fn filters(&self) -> Vec<Option<SearchFilter>> {
        self.filters.lock().clone()
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> RecallResult<Vec<CandidateResult>> {
        self.filters.lock().push(filter.cloned());
        self.inner.search(query_embedding, limit, filter).await
    }

    async fn get_all(&self) -> RecallResult<Vec<Document>> {
        self.inner.get_all().await
    }
}

/// Store whose `get_all` fails, for startup tests
pub struct UnreachableStore;

#[async_trait]
impl DocumentStore for UnreachableStore {
    async fn search(
        &self,
        _query_embedding: &[f32],
        _limit: usize,
        _filter: Option<&SearchFilter>,
    ) -> RecallResult<Vec<CandidateResult>> {
        Err(RecallError::Store("unreachable".into()))
    }

    async fn get_all(&self) -> RecallResult<Vec<Document>> {
        Err(RecallError::Store("unreachable".into()))
    }
}

/// Judge with a scripted answer that counts calls
pub struct ScriptedJudge {
    answer: Result<Vec<f32>, RerankError>,
    pub requests: Mutex<Vec<JudgeRequest>>,
    calls: AtomicUsize,
}

impl ScriptedJudge {
    pub fn new(answer: Result<Vec<f32>, RerankError>) -> Arc<Self> {
        Arc::new(ScriptedJudge {
            answer,
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelevanceJudge for ScriptedJudge {
    async fn judge(&self, request: &JudgeRequest) -> Result<JudgeResponse, RerankError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        self.answer.clone().map(|scores| JudgeResponse { scores })
    }
}

/// Judge that answers only after `delay`
pub struct DelayedJudge(pub Duration);

#[async_trait]
impl RelevanceJudge for DelayedJudge {
    async fn judge(&self, request: &JudgeRequest) -> Result<JudgeResponse, RerankError> {
        tokio::time::sleep(self.0).await;
        Ok(JudgeResponse {
            scores: (0..request.candidates.len()).map(|i| i as f32).collect(),
        })
    }
}

// ============================================================================
// Routers
// ============================================================================

pub fn small_router(analyzer: Arc<dyn QueryAnalyzer>) -> (QueryRouter, Arc<RecordingStore>) {
    let corpus = small_corpus();
    let store = RecordingStore::new(memory_store(&corpus));
    let router = QueryRouter::new(analyzer, store.clone(), Arc::new(KeywordEmbedder), stats_for(&corpus));
    (router, store)
}
