//! Score fusion for hybrid retrieval
//!
//! This module provides:
//! - `combine`: the convex blend of a BM25 score and a vector score
//! - `ScoreFusion`: applies BM25 + blend to a batch of candidates
//! - `sort_by_combined_score`: the canonical, stable ranking order
//!
//! `weight` is the share of the final score attributed to BM25:
//! `0` is pure vector, `1` is pure BM25.

use crate::scorer::BM25Scorer;
use crate::stats::CorpusStatistics;
use recall_core::CandidateResult;
use std::cmp::Ordering;

/// Convex combination `weight * bm25 + (1 - weight) * vector`.
///
/// Weights outside [0,1] are clamped. The boundary weights are exact
/// selectors: `combine(b, v, 0) == v` and `combine(b, v, 1) == b`.
pub fn combine(bm25: f32, vector: f32, weight: f32) -> f32 {
    combine_with(|| bm25, vector, weight)
}

/// Like [`combine`], but only evaluates `bm25` when its weight is non-zero.
pub fn combine_with<F>(bm25: F, vector: f32, weight: f32) -> f32
where
    F: FnOnce() -> f32,
{
    let weight = clamp_weight(weight);
    if weight == 0.0 {
        return vector;
    }
    if weight == 1.0 {
        return bm25();
    }
    weight * bm25() + (1.0 - weight) * vector
}

/// Clamp a fusion weight into [0,1]; NaN becomes 0 (pure vector).
pub fn clamp_weight(weight: f32) -> f32 {
    if weight.is_nan() {
        0.0
    } else {
        weight.clamp(0.0, 1.0)
    }
}

/// Bring a store similarity onto [0,1].
///
/// Stores report cosine similarity, which may dip below zero; non-finite
/// values are treated as no similarity.
pub fn normalize_vector(score: f32) -> f32 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Outcome counters from one [`ScoreFusion::apply`] pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FusionStats {
    /// Candidates whose BM25 score was computed
    pub bm25_scored: usize,
    /// Candidates whose BM25 score was non-finite and replaced by 0
    pub bm25_degraded: usize,
}

/// Fills `bm25_score` and `combined_score` on a batch of candidates.
#[derive(Debug, Clone, Copy)]
pub struct ScoreFusion {
    weight: f32,
    scorer: BM25Scorer,
}

impl ScoreFusion {
    /// Fusion with the given BM25 weight and the default BM25 parameters
    pub fn new(weight: f32) -> Self {
        ScoreFusion {
            weight: clamp_weight(weight),
            scorer: BM25Scorer::default(),
        }
    }

    /// Builder: use a custom scorer
    pub fn with_scorer(mut self, scorer: BM25Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Effective BM25 weight
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Whether lexical scoring is enabled at all
    pub fn uses_bm25(&self) -> bool {
        self.weight > 0.0
    }

    /// Score every candidate in place.
    ///
    /// With a zero weight BM25 is skipped entirely and `bm25_score` stays 0.
    /// A candidate whose BM25 computation yields a non-finite value scores 0
    /// lexically rather than poisoning the batch.
    pub fn apply(
        &self,
        candidates: &mut [CandidateResult],
        query_terms: &[String],
        stats: &CorpusStatistics,
    ) -> FusionStats {
        let mut outcome = FusionStats::default();
        for candidate in candidates.iter_mut() {
            let vector = normalize_vector(candidate.vector_score);
            let mut bm25 = 0.0;
            let combined = combine_with(
                || {
                    outcome.bm25_scored += 1;
                    let raw = self.scorer.score_terms(query_terms, &candidate.item, stats);
                    bm25 = if raw.is_finite() {
                        raw
                    } else {
                        outcome.bm25_degraded += 1;
                        0.0
                    };
                    bm25
                },
                vector,
                self.weight,
            );
            candidate.bm25_score = bm25;
            candidate.combined_score = combined;
        }
        outcome
    }
}

/// Compare two scores descending; NaN sorts as equal.
pub fn descending(a: f32, b: f32) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Sort by `combined_score` descending.
///
/// `sort_by` is stable, so ties keep the order the store returned.
pub fn sort_by_combined_score(candidates: &mut [CandidateResult]) {
    candidates.sort_by(|a, b| descending(a.combined_score, b.combined_score));
}
