//! End-to-end ranking over the three-document corpus

use crate::common::*;
use recall::{BM25Scorer, CorpusStatistics, Document, RouterSearchOptions, Scorer};

fn bm25_only() -> RouterSearchOptions {
    RouterSearchOptions::default()
        .with_hybrid_weight(1.0)
        .with_reranking(false)
        .with_metadata_filtering(false)
}

/// "pricing" against the corpus with pure BM25: doc-1 first, the rest score 0
#[tokio::test]
async fn test_pricing_query_bm25_only() {
    init_tracing();
    let (router, _) = small_router(informational("billing", 2));
    let response = router.route("pricing", &bm25_only()).await.unwrap();

    assert_eq!(response.ids(), vec!["doc-1", "doc-2", "doc-3"]);
    assert!(response.results[0].final_score > 0.0);
    assert_eq!(response.results[1].final_score, 0.0);
    assert_eq!(response.results[2].final_score, 0.0);
    assert!(response.degradations.is_empty());
}

/// Scorer and router agree on the BM25 value
#[test]
fn test_router_score_matches_scorer() {
    let docs: Vec<Document> = small_corpus().into_iter().map(|(d, _, _)| d).collect();
    let stats = CorpusStatistics::build(&docs).unwrap();
    let scorer = BM25Scorer::default();

    let scores: Vec<f32> = docs.iter().map(|d| scorer.score("pricing", d, &stats)).collect();
    assert!(scores[0] > 0.0);
    assert_eq!(scores[1], 0.0);
    assert_eq!(scores[2], 0.0);

    // One match in three documents: idf = ln(1 + 2.5 / 1.5)
    let idf = (1.0f32 + 2.5 / 1.5).ln();
    assert!((stats.idf("pricing") - idf).abs() < 1e-6);
}

#[tokio::test]
async fn test_router_score_equals_direct_bm25() {
    let docs: Vec<Document> = small_corpus().into_iter().map(|(d, _, _)| d).collect();
    let stats = CorpusStatistics::build(&docs).unwrap();
    let expected = BM25Scorer::default().score("pricing", &docs[0], &stats);

    let (router, _) = small_router(informational("billing", 2));
    let response = router.route("pricing", &bm25_only()).await.unwrap();
    assert_eq!(response.results[0].final_score, expected);
    assert_eq!(response.results[0].original_score, expected);
}

/// Pure vector weighting ranks by cosine similarity alone
#[tokio::test]
async fn test_vector_only_ranks_by_similarity() {
    let (router, _) = small_router(informational("security", 3));
    let options = RouterSearchOptions::default()
        .with_hybrid_weight(0.0)
        .with_reranking(false)
        .with_metadata_filtering(false);
    let response = router.route("security encryption", &options).await.unwrap();

    assert_eq!(response.ids()[0], "doc-2");
    assert!(response.results[0].final_score <= 1.0);
    assert!(response.results.iter().all(|r| r.final_score >= 0.0));
}

#[tokio::test]
async fn test_identical_inputs_identical_output() {
    let (router, _) = small_router(informational("billing", 2));
    let options = RouterSearchOptions::default().with_metadata_filtering(false);

    let first = router.route("pricing plans", &options).await.unwrap();
    let second = router.route("pricing plans", &options).await.unwrap();
    assert_eq!(first.results, second.results);
}

#[tokio::test]
async fn test_response_carries_analysis_and_timings() {
    let (router, _) = small_router(informational("billing", 2));
    let options = RouterSearchOptions::default().with_debug(true);
    let response = router.route("pricing", &options).await.unwrap();

    assert_eq!(response.query_analysis.primary_category, "billing");
    let time = response.processing_time;
    assert!(time.total_us >= time.analysis_us);
    assert!(time.expansion_us.is_none());
    assert!(time.reranking_us.is_none());
    assert!(response.results.iter().all(|r| !r.explanation.is_empty()));
    assert!(response.debug.is_some());
}

#[tokio::test]
async fn test_router_limit_defaults_to_five() {
    let mut corpus = small_corpus();
    for i in 0..10 {
        corpus.push((
            Document::new(format!("extra-{}", i), format!("pricing faq entry {}", i)),
            "billing",
            2,
        ));
    }
    let store = RecordingStore::new(memory_store(&corpus));
    let router = recall::QueryRouter::new(
        informational("billing", 2),
        store,
        std::sync::Arc::new(KeywordEmbedder),
        stats_for(&corpus),
    );
    let response = router
        .route("pricing", &RouterSearchOptions::default())
        .await
        .unwrap();
    assert_eq!(response.results.len(), 5);
}
