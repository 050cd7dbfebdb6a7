//! Intelligence layer for Recall
//!
//! Everything between a query string and a ranked answer that needs a
//! judgement call: which parameters to search with, how to rephrase the
//! query, which candidates actually answer it.
//!
//! This crate provides:
//! - `RetrievalParameterPolicy`: query analysis → per-query search parameters
//! - `QueryExpander` and the API-backed `ApiExpander`
//! - `RelevanceJudge`, the API-backed `ApiJudge`, and the `Reranker` that
//!   enforces the judge's timeout and response contract
//! - `QueryRouter`: the analysis → search → fallback → rerank state machine
//!
//! # Usage
//!
//! ```ignore
//! use recall_intelligence::{QueryRouter, RouterSearchOptions};
//!
//! let router = QueryRouter::new(analyzer, store, embedder, stats).with_judge(judge);
//! let response = router.route("how much does the pro plan cost", &RouterSearchOptions::default()).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod expand;
pub mod llm_client;
pub mod policy;
pub mod rerank;
pub mod router;

pub use expand::{ApiExpander, ExpandError, ExpandedQueries, ExpandedQuery, QueryExpander, QueryType};
pub use llm_client::{ChatEndpoint, LlmClientError};
pub use policy::{CategoryFilter, RetrievalParameterPolicy, RetrievalParameters, TechnicalLevelRange};
pub use rerank::{
    validate_response, ApiJudge, JudgeCandidate, JudgeRequest, JudgeResponse, RelevanceJudge,
    RerankError, RerankScore, Reranker, DEFAULT_RERANK_TIMEOUT,
};
pub use router::{
    Degradation, ProcessingTime, QueryRouter, RerankStatus, RouteDebug, RouteResponse,
    RouterSearchOptions, RouterStage,
};
