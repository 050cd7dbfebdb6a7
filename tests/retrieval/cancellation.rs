//! Caller cancellation and request deadlines

use crate::common::*;
use async_trait::async_trait;
use recall::{
    Degradation, EmbeddingService, QueryRouter, RecallError, RecallResult, RouterSearchOptions,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

struct SlowEmbedder;

#[async_trait]
impl EmbeddingService for SlowEmbedder {
    async fn embed(&self, text: &str) -> RecallResult<Vec<f32>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(embed_text(text))
    }

    fn dimension(&self) -> usize {
        dimension()
    }
}

fn slow_embedding_router() -> QueryRouter {
    let corpus = small_corpus();
    QueryRouter::new(
        informational("billing", 2),
        RecordingStore::new(memory_store(&corpus)),
        Arc::new(SlowEmbedder),
        stats_for(&corpus),
    )
}

#[tokio::test]
async fn test_pre_cancelled_token_fails_fast() {
    let (router, store) = small_router(informational("billing", 2));
    let token = CancellationToken::new();
    token.cancel();

    let err = router
        .route_with_cancel("pricing", &RouterSearchOptions::default(), token)
        .await
        .unwrap_err();
    assert!(matches!(err, RecallError::Cancelled { .. }));
    assert!(err.is_fatal());
    assert!(store.filters().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_searching() {
    let router = slow_embedding_router();
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let err = router
        .route_with_cancel("pricing", &RouterSearchOptions::default(), token)
        .await
        .unwrap_err();
    assert!(matches!(err, RecallError::Cancelled { ref stage } if stage == "searching"));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_while_searching() {
    let router = slow_embedding_router();
    let options = RouterSearchOptions::default().with_deadline(Duration::from_secs(5));
    let err = router.route("pricing", &options).await.unwrap_err();
    assert!(matches!(err, RecallError::Cancelled { ref stage } if stage == "searching"));
}

/// Cancellation during reranking still answers with the fused order
#[tokio::test(start_paused = true)]
async fn test_cancel_during_rerank_returns_best_available() {
    let (router, _) = small_router(informational("billing", 2));
    let router = router.with_judge(Arc::new(DelayedJudge(Duration::from_secs(8))));
    let options = RouterSearchOptions::default().with_metadata_filtering(false);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        canceller.cancel();
    });

    let response = router
        .route_with_cancel("pricing", &options, token)
        .await
        .unwrap();
    assert_eq!(response.ids(), vec!["doc-1", "doc-2", "doc-3"]);
    assert_eq!(
        response.degradations,
        vec![Degradation::RerankSkipped {
            reason: "cancelled".into()
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn test_deadline_during_rerank_returns_best_available() {
    let (router, _) = small_router(informational("billing", 2));
    let router = router.with_judge(Arc::new(DelayedJudge(Duration::from_secs(8))));
    let options = RouterSearchOptions::default()
        .with_metadata_filtering(false)
        .with_deadline(Duration::from_secs(4));

    let response = router.route("pricing", &options).await.unwrap();
    assert_eq!(response.results.len(), 3);
    assert!(response.is_degraded());
}

#[tokio::test]
async fn test_unused_token_changes_nothing() {
    let (router, _) = small_router(informational("billing", 2));
    let options = RouterSearchOptions::default().with_metadata_filtering(false);
    let plain = router.route("pricing", &options).await.unwrap();
    let with_token = router
        .route_with_cancel("pricing", &options, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(plain.results, with_token.results);
}
