//! Relevance judge contract and rerank fallback

use crate::common::*;
use recall::rerank::api::parse_judge_response;
use recall::{
    validate_response, CandidateResult, Degradation, Document, JudgeRequest, JudgeResponse,
    RerankError, RerankStatus, Reranker, RouterSearchOptions,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn candidates(n: usize) -> Vec<CandidateResult> {
    (0..n)
        .map(|i| {
            CandidateResult::new(
                Document::new(format!("c{}", i), format!("passage number {}", i)),
                1.0 - i as f32 / 100.0,
            )
        })
        .collect()
}

fn unfiltered() -> RouterSearchOptions {
    RouterSearchOptions::default()
        .with_metadata_filtering(false)
        .with_debug(true)
}

/// Output length is min(rerank_count, candidates) and every id appears once
#[tokio::test]
async fn test_rerank_length_and_identity() {
    for n in [1usize, 4, 15] {
        for count in [1usize, 3, 10, 20] {
            let scores: Vec<f32> = (0..n).map(|i| ((i * 7) % 11) as f32 % 10.5).collect();
            let judge = ScriptedJudge::new(Ok(scores));
            let input = candidates(n);
            let order = Reranker::new(judge).rerank("q", &input, count).await.unwrap();

            assert_eq!(order.len(), count.min(n));
            let ids: HashSet<&str> = order.iter().map(|s| input[s.index].id()).collect();
            assert_eq!(ids.len(), order.len());
        }
    }
}

#[tokio::test]
async fn test_judge_sees_literal_query_and_all_candidates() {
    let judge = ScriptedJudge::new(Ok(vec![1.0, 2.0, 3.0]));
    let (router, _) = small_router(informational("billing", 2));
    let router = router.with_judge(judge.clone());
    router.route("  pricing  ", &unfiltered()).await.unwrap();

    let requests = judge.requests.lock().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query, "pricing");
    let ids: Vec<&str> = requests[0].candidates.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["doc-1", "doc-2", "doc-3"]);
}

#[tokio::test]
async fn test_judge_scores_reorder_results() {
    let judge = ScriptedJudge::new(Ok(vec![1.0, 2.0, 3.0]));
    let (router, _) = small_router(informational("billing", 2));
    let response = router
        .with_judge(judge)
        .route("pricing", &unfiltered())
        .await
        .unwrap();

    assert_eq!(response.ids(), vec!["doc-3", "doc-2", "doc-1"]);
    let scores: Vec<f32> = response.results.iter().map(|r| r.final_score).collect();
    assert_eq!(scores, vec![3.0, 2.0, 1.0]);
    assert!(!response.is_degraded());
}

/// A short response fails the whole batch rather than mixing judged items
#[tokio::test]
async fn test_length_mismatch_keeps_fused_order() {
    let (baseline_router, _) = small_router(informational("billing", 2));
    let baseline = baseline_router
        .route("pricing", &unfiltered().with_reranking(false))
        .await
        .unwrap();

    let judge = ScriptedJudge::new(Ok(vec![10.0, 0.0]));
    let (router, _) = small_router(informational("billing", 2));
    let response = router.with_judge(judge).route("pricing", &unfiltered()).await.unwrap();

    assert_eq!(response.ids(), baseline.ids());
    for (ranked, base) in response.results.iter().zip(&baseline.results) {
        assert_eq!(ranked.final_score, base.final_score);
    }
    assert_eq!(
        response.degradations,
        vec![Degradation::RerankSkipped {
            reason: "contract".into()
        }]
    );
}

#[tokio::test]
async fn test_transport_error_keeps_fused_order() {
    let judge = ScriptedJudge::new(Err(RerankError::Network("connection refused".into())));
    let (router, _) = small_router(informational("billing", 2));
    let response = router.with_judge(judge).route("pricing", &unfiltered()).await.unwrap();

    assert_eq!(response.ids(), vec!["doc-1", "doc-2", "doc-3"]);
    assert_eq!(
        response.debug.unwrap().rerank,
        RerankStatus::Skipped {
            reason: "network".into()
        }
    );
}

/// Over the timeout: same ids, same order as without reranking
#[tokio::test(start_paused = true)]
async fn test_timeout_returns_pre_rerank_order() {
    let (baseline_router, _) = small_router(informational("billing", 2));
    let baseline = baseline_router
        .route("pricing", &unfiltered().with_reranking(false))
        .await
        .unwrap();

    let (router, _) = small_router(informational("billing", 2));
    let router = router.with_judge(Arc::new(DelayedJudge(Duration::from_secs(30))));
    let response = router.route("pricing", &unfiltered()).await.unwrap();

    assert_eq!(response.ids(), baseline.ids());
    assert!(response
        .results
        .iter()
        .all(|r| r.explanation.contains("rerank skipped (timeout)")));
}

#[tokio::test(start_paused = true)]
async fn test_slow_judge_within_timeout_is_applied() {
    let (router, _) = small_router(informational("billing", 2));
    let router = router.with_judge(Arc::new(DelayedJudge(Duration::from_secs(2))));
    let response = router.route("pricing", &unfiltered()).await.unwrap();

    // DelayedJudge scores later positions higher
    assert_eq!(response.ids(), vec!["doc-3", "doc-2", "doc-1"]);
    assert_eq!(
        response.debug.unwrap().rerank,
        RerankStatus::Applied { judged: 3, kept: 3 }
    );
}

#[tokio::test]
async fn test_reranking_disabled_never_calls_judge() {
    let judge = ScriptedJudge::new(Ok(vec![1.0, 2.0, 3.0]));
    let (router, _) = small_router(informational("billing", 2));
    let router = router.with_judge(judge.clone());
    router
        .route("pricing", &unfiltered().with_reranking(false))
        .await
        .unwrap();
    assert_eq!(judge.calls(), 0);
}

#[test]
fn test_parsed_out_of_range_score_violates_contract() {
    let request = JudgeRequest::from_candidates("q", &candidates(2));
    let scores = parse_judge_response("1: 7\n2: 12\n", 2).unwrap();
    let err = validate_response(&request, &JudgeResponse { scores }).unwrap_err();
    assert!(matches!(err, RerankError::Contract(_)));
}

#[test]
fn test_parsed_missing_position_is_rejected() {
    assert!(parse_judge_response("1: 7\n", 2).is_err());
}
