//! Unfiltered fallback search

use crate::common::*;
use recall::{
    DocumentStore, EntityConfidence, ExtractedEntity, QueryAnalysis, QueryIntent, QueryRouter,
    RouterSearchOptions, RouterStage, SearchFilter,
};
use std::sync::Arc;

/// A filter naming a category nobody has still returns the top vector matches
#[tokio::test]
async fn test_nonexistent_category_falls_back_to_vector_matches() {
    init_tracing();
    let (router, store) = small_router(informational("nonexistent", 2));
    let options = RouterSearchOptions::default().with_reranking(false);
    let response = router.route("pricing", &options).await.unwrap();

    let unfiltered = store
        .inner
        .search(&embed_text("pricing"), 15, None)
        .await
        .unwrap();
    let expected: Vec<&str> = unfiltered.iter().map(|c| c.id()).collect();

    assert!(!response.results.is_empty());
    assert_eq!(response.ids(), expected);
}

#[tokio::test]
async fn test_second_call_has_no_filter() {
    let (router, store) = small_router(informational("nonexistent", 2));
    router
        .route("pricing", &RouterSearchOptions::default())
        .await
        .unwrap();

    let filters = store.filters();
    assert_eq!(filters.len(), 2);
    let first: SearchFilter = filters[0].clone().unwrap();
    assert_eq!(first.categories, Some(vec!["nonexistent".to_string()]));
    assert_eq!(first.technical_level_min, Some(1));
    assert_eq!(first.technical_level_max, Some(3));
    assert_eq!(filters[1], None);
}

#[tokio::test]
async fn test_fallback_attempted_at_most_once() {
    let store = RecordingStore::new(recall::InMemoryDocumentStore::new(dimension()));
    let router = QueryRouter::new(
        informational("billing", 2),
        store.clone(),
        Arc::new(KeywordEmbedder),
        stats_for(&small_corpus()),
    );
    let response = router
        .route("pricing", &RouterSearchOptions::default().with_debug(true))
        .await
        .unwrap();

    assert!(response.results.is_empty());
    let filters = store.filters();
    assert_eq!(filters.len(), 2);
    assert!(filters[0].is_some());
    assert_eq!(filters[1], None);
    let debug = response.debug.unwrap();
    assert!(debug.fallback_used);
    assert_eq!(debug.fallback_candidates, Some(0));
    let fallbacks = debug
        .stages
        .iter()
        .filter(|s| **s == RouterStage::FallbackSearching)
        .count();
    assert_eq!(fallbacks, 1);
}

#[tokio::test]
async fn test_missing_required_entity_falls_back() {
    let analysis = QueryAnalysis::new("billing", 2, QueryIntent::Informational)
        .with_entities(vec![ExtractedEntity::new("Kubernetes", EntityConfidence::Certain)]);
    let (router, store) = small_router(Arc::new(FixedAnalyzer(analysis)));
    let response = router
        .route("pricing", &RouterSearchOptions::default().with_reranking(false))
        .await
        .unwrap();

    let filters = store.filters();
    assert_eq!(
        filters[0].as_ref().and_then(|f| f.required_entities.clone()),
        Some(vec!["Kubernetes".to_string()])
    );
    assert_eq!(filters[1], None);
    assert_eq!(response.ids()[0], "doc-1");
}

#[tokio::test]
async fn test_fallback_disabled_returns_empty() {
    let (router, store) = small_router(informational("nonexistent", 2));
    let options = RouterSearchOptions::default().with_fallback(false);
    let response = router.route("pricing", &options).await.unwrap();

    assert!(response.results.is_empty());
    assert_eq!(store.filters().len(), 1);
}

#[tokio::test]
async fn test_matching_filter_needs_no_fallback() {
    let (router, store) = small_router(informational("security", 4));
    let response = router
        .route("security", &RouterSearchOptions::default().with_debug(true))
        .await
        .unwrap();

    assert_eq!(response.ids(), vec!["doc-2"]);
    assert_eq!(store.filters().len(), 1);
    assert!(!response.debug.unwrap().fallback_used);
}

#[tokio::test]
async fn test_navigational_query_filters_level_window() {
    let analysis = QueryAnalysis::new("support", 1, QueryIntent::Navigational);
    let (router, store) = small_router(Arc::new(FixedAnalyzer(analysis)));
    let response = router
        .route("contact support", &RouterSearchOptions::default())
        .await
        .unwrap();

    let first = store.filters()[0].clone().unwrap();
    assert_eq!(first.technical_level_min, Some(1));
    assert_eq!(first.technical_level_max, Some(2));
    assert_eq!(response.ids(), vec!["doc-3"]);
}
