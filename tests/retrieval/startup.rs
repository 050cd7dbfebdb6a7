//! Configuration, persisted statistics and crawl import

use crate::common::*;
use recall::{
    load_crawl_snapshot, open_router, persist, CorpusStatistics, Document, InMemoryDocumentStore,
    Metadata, QueryRouter, RecallConfig, RecallError, RouterSearchOptions, StatsHandle,
    CONFIG_FILE_NAME,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn config_in(dir: &Path) -> RecallConfig {
    let mut config = RecallConfig::default();
    config.statistics.path = dir.join("recall.stats");
    config
}

#[tokio::test]
async fn test_open_router_cold_start_builds_and_saves() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    let store = Arc::new(memory_store(&small_corpus()));

    let router = open_router(&config, informational("billing", 2), store, Arc::new(KeywordEmbedder))
        .await
        .unwrap();
    assert_eq!(router.stats().snapshot().total_documents(), 3);
    assert!(config.statistics.path.exists());

    let response = router
        .route("pricing", &router.default_options())
        .await
        .unwrap();
    assert_eq!(response.ids()[0], "doc-1");
}

#[tokio::test]
async fn test_open_router_warm_start_skips_store() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    let docs: Vec<Document> = small_corpus().into_iter().map(|(d, _, _)| d).collect();
    persist::save(&CorpusStatistics::build(&docs).unwrap(), &config.statistics.path).unwrap();

    let router = open_router(
        &config,
        informational("billing", 2),
        Arc::new(UnreachableStore),
        Arc::new(KeywordEmbedder),
    )
    .await
    .unwrap();
    assert_eq!(router.stats().snapshot().total_documents(), 3);
}

#[tokio::test]
async fn test_open_router_cold_start_store_down_fails() {
    let dir = TempDir::new().unwrap();
    let err = open_router(
        &config_in(dir.path()),
        informational("billing", 2),
        Arc::new(UnreachableStore),
        Arc::new(KeywordEmbedder),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RecallError::Store(_)));
}

#[tokio::test]
async fn test_corrupt_stats_file_triggers_rebuild() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    std::fs::write(&config.statistics.path, b"not a stats file").unwrap();
    assert!(persist::load(&config.statistics.path).is_empty());

    let store = Arc::new(memory_store(&small_corpus()));
    let handle = StatsHandle::load_or_rebuild(&config.statistics.path, store.as_ref())
        .await
        .unwrap();
    assert_eq!(handle.snapshot().total_documents(), 3);
    assert_eq!(persist::load(&config.statistics.path), *handle.snapshot());
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path());
    config.router.rerank_count = 50;
    let err = open_router(
        &config,
        informational("billing", 2),
        Arc::new(memory_store(&small_corpus())),
        Arc::new(KeywordEmbedder),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RecallError::Config(_)));
}

#[test]
fn test_default_config_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    RecallConfig::write_default_if_missing(&path).unwrap();
    let config = RecallConfig::from_file(&path).unwrap();
    assert_eq!(config, RecallConfig::default());

    let mut edited = config.clone();
    edited.router.limit = 8;
    edited.policy.strict_category_filter = false;
    edited.write_to_file(&path).unwrap();
    assert_eq!(RecallConfig::from_file(&path).unwrap(), edited);
}

#[tokio::test]
async fn test_crawl_snapshot_feeds_router() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("crawl.json");
    std::fs::write(
        &snapshot,
        r#"{
            "https://example.com/pricing": {"status": "success", "title": "Pricing", "text": "Pricing plans start at $10 per seat."},
            "https://example.com/security": {"status": "success", "title": "Security", "text": "Data at rest uses AES-256 encryption."},
            "https://example.com/broken": {"status": "error", "text": "pricing pricing pricing"},
            "https://example.com/empty": {"status": "success", "title": "Empty", "text": "  "}
        }"#,
    )
    .unwrap();

    let docs = load_crawl_snapshot(&snapshot).unwrap();
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["https://example.com/pricing", "https://example.com/security"]);

    let store = Arc::new(InMemoryDocumentStore::new(dimension()));
    for doc in &docs {
        store
            .insert(doc.clone(), embed_text(&doc.text), Metadata::new())
            .unwrap();
    }
    let stats = Arc::new(StatsHandle::new(CorpusStatistics::build(&docs).unwrap()));
    let router = QueryRouter::new(informational("billing", 2), store, Arc::new(KeywordEmbedder), stats);

    let options = RouterSearchOptions::default()
        .with_metadata_filtering(false)
        .with_hybrid_weight(1.0);
    let response = router.route("pricing per seat", &options).await.unwrap();
    assert_eq!(response.ids()[0], "https://example.com/pricing");
}
