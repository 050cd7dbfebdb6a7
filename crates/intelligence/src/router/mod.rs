//! Query router
//!
//! Orchestrates one query through the retrieval pipeline:
//!
//! ```text
//! Analyzing → Expanding? → Searching → FallbackSearching? → Reranking? → Done
//! ```
//!
//! Stages run strictly in that order and none is revisited. Only analysis
//! failure (and caller cancellation outside reranking) is returned as an
//! error. Every other failure is absorbed: logged at `warn`, recorded as a
//! [`Degradation`], and the best available ranking is returned.
//!
//! # Snapshot consistency
//!
//! The router takes one [`CorpusStatistics`] snapshot per query, so a
//! concurrent [`StatsHandle::replace`] never changes statistics halfway
//! through scoring.
//!
//! # Cancellation
//!
//! Every external call is raced against the caller's [`CancellationToken`]
//! and the optional request deadline. Cancellation while the judge is
//! running keeps the fused order instead of failing the request.

mod options;
mod response;

pub use options::RouterSearchOptions;
pub use response::{
    Degradation, ProcessingTime, RerankStatus, RouteDebug, RouteResponse, RouterStage,
};

use crate::expand::{ApiExpander, QueryExpander};
use crate::policy::{RetrievalParameterPolicy, RetrievalParameters};
use crate::rerank::{ApiJudge, RelevanceJudge, RerankScore, Reranker};
use recall_core::{
    CandidateResult, DocumentStore, EmbeddingService, ModelConfig, QueryAnalyzer, RankedResult,
    RecallConfig, RecallError, RecallResult, RouterConfig, SearchFilter,
};
use recall_search::fusion::clamp_weight;
use recall_search::{
    normalize_vector, sort_by_combined_score, BM25Scorer, CorpusStatistics, ScoreFusion,
    StatsHandle,
};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

// ============================================================================
// QueryRouter
// ============================================================================

/// Hybrid retrieval pipeline over injected collaborators.
///
/// Holds only shared references and immutable configuration; all per-query
/// state lives on the stack of [`route`](Self::route).
#[derive(Clone)]
pub struct QueryRouter {
    analyzer: Arc<dyn QueryAnalyzer>,
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingService>,
    stats: Arc<StatsHandle>,
    policy: RetrievalParameterPolicy,
    scorer: BM25Scorer,
    expander: Option<Arc<dyn QueryExpander>>,
    judge: Option<Arc<dyn RelevanceJudge>>,
    defaults: RouterConfig,
}

impl std::fmt::Debug for QueryRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryRouter")
            .field("policy", &self.policy)
            .field("scorer", &self.scorer)
            .field("has_expander", &self.expander.is_some())
            .field("has_judge", &self.judge.is_some())
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl QueryRouter {
    /// Router with the default policy, no expander and no judge
    pub fn new(
        analyzer: Arc<dyn QueryAnalyzer>,
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingService>,
        stats: Arc<StatsHandle>,
    ) -> Self {
        QueryRouter {
            analyzer,
            store,
            embedder,
            stats,
            policy: RetrievalParameterPolicy::default(),
            scorer: BM25Scorer::default(),
            expander: None,
            judge: None,
            defaults: RouterConfig::default(),
        }
    }

    /// Builder: parameter policy
    pub fn with_policy(mut self, policy: RetrievalParameterPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builder: BM25 parameters
    pub fn with_scorer(mut self, scorer: BM25Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Builder: query expander
    pub fn with_expander(mut self, expander: Arc<dyn QueryExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Builder: relevance judge
    pub fn with_judge(mut self, judge: Arc<dyn RelevanceJudge>) -> Self {
        self.judge = Some(judge);
        self
    }

    /// Builder: defaults returned by [`default_options`](Self::default_options)
    pub fn with_router_config(mut self, config: RouterConfig) -> Self {
        self.defaults = config;
        self
    }

    /// Builder: API expander and judge against one model endpoint
    pub fn with_model(self, model: &ModelConfig) -> Self {
        self.with_expander(Arc::new(ApiExpander::from_config(model)))
            .with_judge(Arc::new(ApiJudge::from_config(model)))
    }

    /// Builder: apply every section of a loaded config
    pub fn with_config(self, config: &RecallConfig) -> Self {
        let router = self
            .with_policy(RetrievalParameterPolicy::new(config.policy.clone()))
            .with_router_config(config.router.clone());
        match &config.model {
            Some(model) => router.with_model(model),
            None => router,
        }
    }

    /// The policy in effect
    pub fn policy(&self) -> &RetrievalParameterPolicy {
        &self.policy
    }

    /// Shared statistics handle
    pub fn stats(&self) -> &Arc<StatsHandle> {
        &self.stats
    }

    /// Options built from the router's configured defaults
    pub fn default_options(&self) -> RouterSearchOptions {
        RouterSearchOptions::from(&self.defaults)
    }

    /// Route a query with no cancellation signal.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty or whitespace-only query
    /// - `Analysis` when the query analyzer fails
    /// - `Cancelled` when `options.deadline_ms` elapses before reranking
    pub async fn route(&self, query: &str, options: &RouterSearchOptions) -> RecallResult<RouteResponse> {
        self.route_with_cancel(query, options, CancellationToken::new())
            .await
    }

    /// Route a query, honoring `cancel` at every external call.
    ///
    /// # Errors
    ///
    /// As [`route`](Self::route), plus `Cancelled` when `cancel` fires
    /// before reranking starts.
    pub async fn route_with_cancel(
        &self,
        query: &str,
        options: &RouterSearchOptions,
        cancel: CancellationToken,
    ) -> RecallResult<RouteResponse> {
        let total_start = Instant::now();
        let query = query.trim();
        if query.is_empty() {
            return Err(RecallError::invalid_input("query is empty"));
        }

        let guard = CancelGuard::new(&cancel, options.deadline());
        let mut stages: Vec<RouterStage> = Vec::with_capacity(6);
        let mut degradations: Vec<Degradation> = Vec::new();

        // 1. Analyze
        enter(&mut stages, RouterStage::Analyzing);
        let analysis_start = Instant::now();
        let analysis = match guard
            .run(RouterStage::Analyzing, self.analyzer.analyze(query))
            .await?
        {
            Ok(analysis) => analysis,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => return Err(RecallError::Analysis(e.to_string())),
        };
        let analysis_us = elapsed_us(analysis_start);

        let params = self.policy.derive(&analysis);
        let hybrid_weight = options
            .hybrid_weight
            .map(clamp_weight)
            .unwrap_or(params.hybrid_weight);

        // 2. Expand
        let mut lexical_query = query.to_string();
        let mut semantic_query = query.to_string();
        let mut expansion_us = None;
        if let Some(expander) = self
            .expander
            .as_ref()
            .filter(|_| options.use_query_expansion && params.expand_query)
        {
            enter(&mut stages, RouterStage::Expanding);
            let start = Instant::now();
            match guard
                .run(RouterStage::Expanding, expander.expand(query))
                .await?
            {
                Ok(expanded) if !expanded.is_empty() => {
                    lexical_query = expanded.lexical_query(query);
                    semantic_query = expanded.semantic_query(query);
                }
                Ok(_) => degrade(
                    &mut degradations,
                    Degradation::ExpansionFailed {
                        reason: "no usable variants".into(),
                    },
                ),
                Err(e) => degrade(
                    &mut degradations,
                    Degradation::ExpansionFailed {
                        reason: e.to_string(),
                    },
                ),
            }
            expansion_us = Some(elapsed_us(start));
        }

        // 3. Search
        enter(&mut stages, RouterStage::Searching);
        let search_start = Instant::now();
        let filter = if options.apply_metadata_filtering {
            params.to_search_filter(self.policy.scale())
        } else {
            None
        };
        let stats = self.stats.snapshot();
        let fusion = ScoreFusion::new(hybrid_weight).with_scorer(self.scorer);
        let plan = SearchPlan {
            query_terms: if fusion.uses_bm25() {
                BM25Scorer::query_terms(&lexical_query, &stats)
            } else {
                Vec::new()
            },
            fusion,
            stats,
            params: &params,
            limit: options.effective_search_limit(),
            category_boost: self.policy.config().category_boost,
        };

        let embedding = match guard
            .run(RouterStage::Searching, self.embedder.embed(&semantic_query))
            .await?
        {
            Ok(embedding) => Some(embedding),
            Err(e) => {
                degrade(
                    &mut degradations,
                    Degradation::EmbeddingFailed {
                        reason: e.to_string(),
                    },
                );
                None
            }
        };

        let mut candidates = Vec::new();
        let mut first_pass_candidates = 0;
        let mut fallback_candidates = None;
        if let Some(embedding) = embedding.as_deref() {
            candidates = self
                .search_pass(
                    &guard,
                    RouterStage::Searching,
                    embedding,
                    filter.as_ref(),
                    &plan,
                    &mut degradations,
                )
                .await?;
            first_pass_candidates = candidates.len();

            // 4. Fallback: at most once, and only when a filter caused the miss
            if candidates.is_empty() && filter.is_some() && options.fallback_to_general {
                enter(&mut stages, RouterStage::FallbackSearching);
                tracing::warn!(
                    target: "recall::router",
                    filter = ?filter,
                    "Filtered search returned nothing, retrying without filter"
                );
                candidates = self
                    .search_pass(
                        &guard,
                        RouterStage::FallbackSearching,
                        embedding,
                        None,
                        &plan,
                        &mut degradations,
                    )
                    .await?;
                fallback_candidates = Some(candidates.len());
            }
        }
        let search_us = elapsed_us(search_start);

        // 5. Rerank
        let mut reranking_us = None;
        let mut rerank_status = RerankStatus::NotRequested;
        // The judge sees at most `search_limit` candidates, even when `limit` widened the pass
        let judge_batch = candidates.len().min(options.search_limit);
        let judge = self.judge.as_ref().filter(|_| {
            options.use_reranking && params.rerank && options.rerank_count > 0 && judge_batch > 0
        });
        let results = match judge {
            Some(judge) => {
                enter(&mut stages, RouterStage::Reranking);
                let start = Instant::now();
                let reranker =
                    Reranker::new(Arc::clone(judge)).with_timeout(options.rerank_timeout());
                let outcome = match guard
                    .run(
                        RouterStage::Reranking,
                        reranker.rerank(query, &candidates[..judge_batch], options.rerank_count),
                    )
                    .await
                {
                    Ok(Ok(order)) => Ok(order),
                    Ok(Err(e)) => Err(e.kind().to_string()),
                    Err(_) => Err("cancelled".to_string()),
                };
                reranking_us = Some(elapsed_us(start));

                match outcome {
                    Ok(order) => {
                        rerank_status = RerankStatus::Applied {
                            judged: judge_batch,
                            kept: order.len(),
                        };
                        judged_results(candidates, &order, hybrid_weight, options.limit)
                    }
                    Err(reason) => {
                        degrade(
                            &mut degradations,
                            Degradation::RerankSkipped {
                                reason: reason.clone(),
                            },
                        );
                        let results = fused_results(
                            candidates,
                            hybrid_weight,
                            options.limit,
                            Some(&reason),
                        );
                        rerank_status = RerankStatus::Skipped { reason };
                        results
                    }
                }
            }
            None => fused_results(candidates, hybrid_weight, options.limit, None),
        };

        // 6. Done
        enter(&mut stages, RouterStage::Done);
        let processing_time = ProcessingTime {
            analysis_us,
            expansion_us,
            search_us,
            reranking_us,
            total_us: elapsed_us(total_start),
        };
        tracing::debug!(
            target: "recall::router",
            results = results.len(),
            degradations = degradations.len(),
            total_us = processing_time.total_us,
            "Route complete"
        );

        let debug = options.debug.then(|| RouteDebug {
            stages,
            parameters: params.clone(),
            hybrid_weight,
            filter,
            fallback_used: fallback_candidates.is_some(),
            first_pass_candidates,
            fallback_candidates,
            lexical_query,
            semantic_query,
            rerank: rerank_status,
        });

        Ok(RouteResponse {
            results,
            query_analysis: analysis,
            processing_time,
            degradations,
            debug,
        })
    }

    /// One store search plus BM25 scoring, fusion and ranking.
    async fn search_pass(
        &self,
        guard: &CancelGuard<'_>,
        stage: RouterStage,
        embedding: &[f32],
        filter: Option<&SearchFilter>,
        plan: &SearchPlan<'_>,
        degradations: &mut Vec<Degradation>,
    ) -> RecallResult<Vec<CandidateResult>> {
        let mut candidates = match guard
            .run(stage, self.store.search(embedding, plan.limit, filter))
            .await?
        {
            Ok(candidates) => candidates,
            Err(e) => {
                degrade(
                    degradations,
                    Degradation::StoreFailed {
                        stage,
                        reason: e.to_string(),
                    },
                );
                Vec::new()
            }
        };
        candidates.truncate(plan.limit);

        let outcome = plan
            .fusion
            .apply(&mut candidates, &plan.query_terms, &plan.stats);
        if outcome.bm25_degraded > 0 {
            degrade(
                degradations,
                Degradation::NonFiniteScore {
                    candidates: outcome.bm25_degraded,
                },
            );
        }

        // Categories the store did not filter on still count as a preference
        let categories_enforced = filter.map_or(false, |f| f.categories.is_some());
        if !categories_enforced && plan.boosts() {
            for candidate in candidates.iter_mut() {
                if candidate
                    .category()
                    .map_or(false, |c| plan.params.matches_category(c))
                {
                    candidate.combined_score *= plan.category_boost;
                }
            }
        }

        sort_by_combined_score(&mut candidates);
        tracing::debug!(
            target: "recall::router",
            stage = stage.as_str(),
            candidates = candidates.len(),
            bm25_scored = outcome.bm25_scored,
            "Search pass complete"
        );
        Ok(candidates)
    }
}

// ============================================================================
// Per-query helpers
// ============================================================================

/// Inputs shared by the first and fallback passes
struct SearchPlan<'a> {
    params: &'a RetrievalParameters,
    fusion: ScoreFusion,
    query_terms: Vec<String>,
    stats: Arc<CorpusStatistics>,
    limit: usize,
    category_boost: f32,
}

impl SearchPlan<'_> {
    fn boosts(&self) -> bool {
        self.category_boost.is_finite()
            && self.category_boost > 0.0
            && self.category_boost != 1.0
            && !self.params.category_filter.categories.is_empty()
    }
}

/// Races futures against the caller's token and the request deadline.
struct CancelGuard<'a> {
    token: &'a CancellationToken,
    deadline: Option<tokio::time::Instant>,
}

impl<'a> CancelGuard<'a> {
    fn new(token: &'a CancellationToken, deadline: Option<Duration>) -> Self {
        CancelGuard {
            token,
            deadline: deadline.map(|d| tokio::time::Instant::now() + d),
        }
    }

    async fn run<F: Future>(&self, stage: RouterStage, fut: F) -> RecallResult<F::Output> {
        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(cancelled(stage, "cancelled by caller")),
            _ = expired => Err(cancelled(stage, "deadline elapsed")),
            output = fut => Ok(output),
        }
    }
}

fn cancelled(stage: RouterStage, why: &str) -> RecallError {
    tracing::debug!(target: "recall::router", stage = stage.as_str(), why, "Request cancelled");
    RecallError::cancelled(stage.as_str())
}

fn enter(stages: &mut Vec<RouterStage>, stage: RouterStage) {
    tracing::debug!(target: "recall::router", stage = stage.as_str(), "Entering stage");
    stages.push(stage);
}

fn degrade(degradations: &mut Vec<Degradation>, degradation: Degradation) {
    tracing::warn!(target: "recall::router", degradation = ?degradation, "Degraded result");
    degradations.push(degradation);
}

fn elapsed_us(start: Instant) -> u64 {
    start.elapsed().as_micros() as u64
}

fn fused_explanation(candidate: &CandidateResult, weight: f32) -> String {
    format!(
        "fused {:.4} (bm25 {:.4}, vector {:.4}, weight {:.2})",
        candidate.combined_score,
        candidate.bm25_score,
        normalize_vector(candidate.vector_score),
        weight
    )
}

/// Fused order, truncated to `limit`. `skipped` tags a discarded rerank.
fn fused_results(
    candidates: Vec<CandidateResult>,
    weight: f32,
    limit: usize,
    skipped: Option<&str>,
) -> Vec<RankedResult> {
    candidates
        .into_iter()
        .take(limit)
        .map(|candidate| {
            let mut explanation = fused_explanation(&candidate, weight);
            if let Some(reason) = skipped {
                explanation.push_str(&format!("; rerank skipped ({})", reason));
            }
            RankedResult {
                final_score: candidate.combined_score,
                original_score: candidate.combined_score,
                explanation,
                item: candidate.item,
                metadata: candidate.metadata,
            }
        })
        .collect()
}

/// Judge order, truncated to `limit`.
fn judged_results(
    candidates: Vec<CandidateResult>,
    order: &[RerankScore],
    weight: f32,
    limit: usize,
) -> Vec<RankedResult> {
    let mut slots: Vec<Option<CandidateResult>> = candidates.into_iter().map(Some).collect();
    order
        .iter()
        .filter_map(|score| {
            slots
                .get_mut(score.index)
                .and_then(Option::take)
                .map(|candidate| (score.relevance_score, candidate))
        })
        .take(limit)
        .map(|(relevance, candidate)| {
            let explanation = format!(
                "judge {:.1}/10; {}",
                relevance,
                fused_explanation(&candidate, weight)
            );
            RankedResult {
                final_score: relevance,
                original_score: candidate.combined_score,
                explanation,
                item: candidate.item,
                metadata: candidate.metadata,
            }
        })
        .collect()
}
