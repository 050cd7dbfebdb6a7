//! Per-query router options

use recall_core::RouterConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options for a single [`route`](super::QueryRouter::route) call.
///
/// Defaults come from the `[router]` config section: five results, fifteen
/// store candidates, filtering and reranking on, expansion off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSearchOptions {
    /// Number of results returned
    pub limit: usize,
    /// Run query expansion (also subject to the policy toggle)
    pub use_query_expansion: bool,
    /// Run the relevance judge (also subject to the policy toggle)
    pub use_reranking: bool,
    /// Results kept after reranking; `0` skips the judge
    pub rerank_count: usize,
    /// Candidates requested from the store per pass, raised to `limit` when
    /// smaller. The judge never sees more than this many.
    pub search_limit: usize,
    /// Pass the policy-derived filter to the first search
    pub apply_metadata_filtering: bool,
    /// Retry once without a filter when the filtered pass is empty
    pub fallback_to_general: bool,
    /// Attach a [`RouteDebug`](super::RouteDebug) to the response
    pub debug: bool,
    /// Overrides the policy-derived BM25 weight when set
    pub hybrid_weight: Option<f32>,
    /// Whole-request deadline in milliseconds
    pub deadline_ms: Option<u64>,
    /// Relevance judge timeout in milliseconds
    pub rerank_timeout_ms: u64,
}

impl Default for RouterSearchOptions {
    fn default() -> Self {
        RouterSearchOptions::from(&RouterConfig::default())
    }
}

impl From<&RouterConfig> for RouterSearchOptions {
    fn from(config: &RouterConfig) -> Self {
        RouterSearchOptions {
            limit: config.limit,
            use_query_expansion: config.use_query_expansion,
            use_reranking: config.use_reranking,
            rerank_count: config.rerank_count,
            search_limit: config.search_limit,
            apply_metadata_filtering: config.apply_metadata_filtering,
            fallback_to_general: config.fallback_to_general,
            debug: false,
            hybrid_weight: None,
            deadline_ms: None,
            rerank_timeout_ms: config.rerank_timeout_ms,
        }
    }
}

impl RouterSearchOptions {
    /// Builder: number of results
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Builder: store candidates per pass
    pub fn with_search_limit(mut self, search_limit: usize) -> Self {
        self.search_limit = search_limit;
        self
    }

    /// Builder: results kept after reranking
    pub fn with_rerank_count(mut self, rerank_count: usize) -> Self {
        self.rerank_count = rerank_count;
        self
    }

    /// Builder: enable or disable expansion
    pub fn with_query_expansion(mut self, enabled: bool) -> Self {
        self.use_query_expansion = enabled;
        self
    }

    /// Builder: enable or disable reranking
    pub fn with_reranking(mut self, enabled: bool) -> Self {
        self.use_reranking = enabled;
        self
    }

    /// Builder: enable or disable metadata filtering
    pub fn with_metadata_filtering(mut self, enabled: bool) -> Self {
        self.apply_metadata_filtering = enabled;
        self
    }

    /// Builder: enable or disable the unfiltered fallback pass
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_general = enabled;
        self
    }

    /// Builder: attach debug details to the response
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Builder: fix the BM25 weight for this query
    pub fn with_hybrid_weight(mut self, weight: f32) -> Self {
        self.hybrid_weight = Some(weight);
        self
    }

    /// Builder: bound the whole request
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_ms = Some(deadline.as_millis() as u64);
        self
    }

    /// Builder: bound the relevance judge call
    pub fn with_rerank_timeout(mut self, timeout: Duration) -> Self {
        self.rerank_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Candidates requested per pass: never fewer than `limit`
    pub fn effective_search_limit(&self) -> usize {
        self.search_limit.max(self.limit)
    }

    /// Relevance judge timeout
    pub fn rerank_timeout(&self) -> Duration {
        Duration::from_millis(self.rerank_timeout_ms)
    }

    /// Request deadline, if any
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}
