//! Relevance-judge reranking
//!
//! After fusion, the top candidates go to a relevance judge in one batched
//! call together with the literal user query. The judge answers with one
//! score in [0,10] per candidate, positionally aligned with the request.
//!
//! ```text
//! fused candidates → JudgeRequest → RelevanceJudge (bounded by timeout)
//!     → validate_response → stable sort by score → truncate to rerank_count
//! ```
//!
//! Any failure (timeout, transport error, malformed or short response, a
//! score outside [0,10]) rejects the whole batch. Callers then keep the
//! fused order; judged and unjudged scores are never mixed.

pub mod api;
pub mod error;
pub mod prompt;

use async_trait::async_trait;
use recall_core::CandidateResult;
use recall_search::fusion::descending;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub use api::ApiJudge;
pub use error::RerankError;

/// Lowest valid judge score
pub const MIN_JUDGE_SCORE: f32 = 0.0;
/// Highest valid judge score
pub const MAX_JUDGE_SCORE: f32 = 10.0;
/// Default bound on a single judge call
pub const DEFAULT_RERANK_TIMEOUT: Duration = Duration::from_secs(10);

/// One passage sent to the judge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeCandidate {
    /// Document id
    pub id: String,
    /// Passage text
    pub text: String,
}

/// Batched judge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeRequest {
    /// The user's literal query (never the expanded one)
    pub query: String,
    /// Passages to score, in fused order
    pub candidates: Vec<JudgeCandidate>,
}

impl JudgeRequest {
    /// Build a request from fused candidates
    pub fn from_candidates(query: &str, candidates: &[CandidateResult]) -> Self {
        JudgeRequest {
            query: query.to_string(),
            candidates: candidates
                .iter()
                .map(|c| JudgeCandidate {
                    id: c.item.id.clone(),
                    text: c.item.text.clone(),
                })
                .collect(),
        }
    }
}

/// Judge response: `scores[i]` belongs to `candidates[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeResponse {
    /// Relevance per candidate, each in [0,10]
    pub scores: Vec<f32>,
}

/// Check a response against its request.
///
/// # Errors
///
/// `RerankError::Contract` on a length mismatch, a non-finite score or a
/// score outside [0,10].
pub fn validate_response(request: &JudgeRequest, response: &JudgeResponse) -> Result<(), RerankError> {
    if response.scores.len() != request.candidates.len() {
        return Err(RerankError::Contract(format!(
            "expected {} scores, got {}",
            request.candidates.len(),
            response.scores.len()
        )));
    }
    for (i, score) in response.scores.iter().enumerate() {
        if !score.is_finite() {
            return Err(RerankError::Contract(format!(
                "score {} is not a number",
                i + 1
            )));
        }
        if !(MIN_JUDGE_SCORE..=MAX_JUDGE_SCORE).contains(score) {
            return Err(RerankError::Contract(format!(
                "score {} = {} outside [{}, {}]",
                i + 1,
                score,
                MIN_JUDGE_SCORE,
                MAX_JUDGE_SCORE
            )));
        }
    }
    Ok(())
}

/// External relevance judge.
///
/// Object-safe for use as `Arc<dyn RelevanceJudge>`; implementations are
/// model-agnostic.
///
/// # Implementations
///
/// - `ApiJudge`: calls an OpenAI-compatible endpoint
#[async_trait]
pub trait RelevanceJudge: Send + Sync {
    /// Score every candidate in the request.
    async fn judge(&self, request: &JudgeRequest) -> Result<JudgeResponse, RerankError>;
}

/// A candidate's position in the input slice and its judge score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RerankScore {
    /// Index into the candidate slice passed to [`Reranker::rerank`]
    pub index: usize,
    /// Judge score in [0,10]
    pub relevance_score: f32,
}

/// Applies a relevance judge with a timeout and the response contract.
#[derive(Clone)]
pub struct Reranker {
    judge: Arc<dyn RelevanceJudge>,
    timeout: Duration,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Reranker {
    /// Reranker with the default 10s timeout
    pub fn new(judge: Arc<dyn RelevanceJudge>) -> Self {
        Reranker {
            judge,
            timeout: DEFAULT_RERANK_TIMEOUT,
        }
    }

    /// Builder: bound each judge call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Current timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Judge `candidates` against `query` and return the new order.
    ///
    /// The result holds `min(rerank_count, candidates.len())` entries, each
    /// index appearing once, sorted by judge score descending. Ties keep the
    /// fused order.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: &[CandidateResult],
        rerank_count: usize,
    ) -> Result<Vec<RerankScore>, RerankError> {
        if candidates.is_empty() || rerank_count == 0 {
            return Ok(Vec::new());
        }

        let request = JudgeRequest::from_candidates(query, candidates);
        let response = match tokio::time::timeout(self.timeout, self.judge.judge(&request)).await {
            Ok(result) => result?,
            Err(_) => return Err(RerankError::Timeout),
        };
        validate_response(&request, &response)?;

        let mut order: Vec<RerankScore> = response
            .scores
            .iter()
            .enumerate()
            .map(|(index, &relevance_score)| RerankScore {
                index,
                relevance_score,
            })
            .collect();
        order.sort_by(|a, b| descending(a.relevance_score, b.relevance_score));
        order.truncate(rerank_count.min(candidates.len()));

        tracing::debug!(
            target: "recall::rerank",
            judged = candidates.len(),
            kept = order.len(),
            "Reranked candidates"
        );
        Ok(order)
    }
}
