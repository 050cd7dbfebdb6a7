//! Router response types

use crate::policy::RetrievalParameters;
use recall_core::{QueryAnalysis, RankedResult, SearchFilter};
use serde::{Deserialize, Serialize};

/// Router state machine stages, in the only order they can be visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouterStage {
    /// Classifying the query
    Analyzing,
    /// Generating query variants
    Expanding,
    /// Filtered (or unfiltered) first pass
    Searching,
    /// Unfiltered retry after an empty filtered pass
    FallbackSearching,
    /// Relevance judging
    Reranking,
    /// Response assembled
    Done,
}

impl RouterStage {
    /// Stage name used in logs and `Cancelled` errors
    pub fn as_str(&self) -> &'static str {
        match self {
            RouterStage::Analyzing => "analyzing",
            RouterStage::Expanding => "expanding",
            RouterStage::Searching => "searching",
            RouterStage::FallbackSearching => "fallback_searching",
            RouterStage::Reranking => "reranking",
            RouterStage::Done => "done",
        }
    }
}

impl std::fmt::Display for RouterStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure the router absorbed instead of returning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// Expansion failed or produced nothing; the literal query was used
    ExpansionFailed {
        /// Error message
        reason: String,
    },
    /// The query could not be embedded; no store search ran
    EmbeddingFailed {
        /// Error message
        reason: String,
    },
    /// A store search failed and was treated as empty
    StoreFailed {
        /// Stage of the failed pass
        stage: RouterStage,
        /// Error message
        reason: String,
    },
    /// The judge result was discarded; fused order was kept
    RerankSkipped {
        /// `timeout`, `network`, `malformed`, `contract`, `disabled` or `cancelled`
        reason: String,
    },
    /// Candidates whose BM25 score was non-finite and counted as 0
    NonFiniteScore {
        /// How many candidates were affected
        candidates: usize,
    },
}

/// Per-stage wall time in microseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingTime {
    /// Query analysis
    pub analysis_us: u64,
    /// Query expansion, when it ran
    pub expansion_us: Option<u64>,
    /// Embedding plus every search pass and fusion
    pub search_us: u64,
    /// Relevance judging, when it ran
    pub reranking_us: Option<u64>,
    /// Whole request
    pub total_us: u64,
}

/// What happened to the relevance judge call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RerankStatus {
    /// Disabled by options or policy, no judge configured, or nothing to judge
    NotRequested,
    /// Judge scores define the final order
    Applied {
        /// Candidates sent to the judge
        judged: usize,
        /// Candidates kept after truncation
        kept: usize,
    },
    /// Judge result discarded
    Skipped {
        /// See [`Degradation::RerankSkipped`]
        reason: String,
    },
}

/// Debug details attached when `RouterSearchOptions::debug` is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDebug {
    /// Stages in visit order, ending in `Done`
    pub stages: Vec<RouterStage>,
    /// Parameters derived by the policy
    pub parameters: RetrievalParameters,
    /// BM25 weight actually used
    pub hybrid_weight: f32,
    /// Filter sent with the first pass
    pub filter: Option<SearchFilter>,
    /// Whether the unfiltered retry ran
    pub fallback_used: bool,
    /// Candidates returned by the first pass
    pub first_pass_candidates: usize,
    /// Candidates returned by the fallback pass
    pub fallback_candidates: Option<usize>,
    /// Text scored by BM25
    pub lexical_query: String,
    /// Text sent to the embedding service
    pub semantic_query: String,
    /// Relevance judge outcome
    pub rerank: RerankStatus,
}

/// Result of one routed query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    /// Final ranked list, at most `limit` long
    pub results: Vec<RankedResult>,
    /// Analyzer output the parameters were derived from
    pub query_analysis: QueryAnalysis,
    /// Stage timings
    pub processing_time: ProcessingTime,
    /// Absorbed failures, in the order they occurred
    pub degradations: Vec<Degradation>,
    /// Present when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<RouteDebug>,
}

impl RouteResponse {
    /// True if any stage fell back
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    /// Result ids in rank order
    pub fn ids(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.id()).collect()
    }
}
