//! Recall - hybrid retrieval and reranking for private knowledge bases
//!
//! Recall finds the passages in a document corpus that answer a
//! natural-language query. Lexical (BM25) and semantic (vector) evidence are
//! fused per candidate, parameters are chosen from a query classification,
//! and an LLM relevance judge refines the final order.
//!
//! # Quick Start
//!
//! ```ignore
//! use recall::{open_router, RecallConfig, RouterSearchOptions};
//!
//! let config = RecallConfig::from_file(Path::new("recall.toml"))?;
//! let router = open_router(&config, analyzer, store, embedder).await?;
//!
//! let response = router.route("how much does the pro plan cost", &RouterSearchOptions::default()).await?;
//! for result in &response.results {
//!     println!("{} {:.2} {}", result.id(), result.final_score, result.explanation);
//! }
//! ```
//!
//! # Architecture
//!
//! - `recall-core`: data model, collaborator traits, errors, configuration
//! - `recall-search`: tokenizer, corpus statistics, BM25, score fusion
//! - `recall-intelligence`: parameter policy, expansion, reranking, router
//!
//! The document store, embedding service and query analyzer are supplied by
//! the caller as trait objects and chosen once at startup.

use std::sync::Arc;

pub use recall_core::*;
pub use recall_intelligence::*;
pub use recall_search::*;

/// Build a router from a loaded config.
///
/// Loads persisted corpus statistics from `config.statistics.path`, or
/// rebuilds them from `store` (and saves them) when the file is missing or
/// unreadable. Policy, router defaults and the optional model endpoint are
/// taken from the config.
///
/// # Errors
///
/// `Config` if the config fails validation; `Store` or `Persistence` if a
/// rebuild was needed and failed.
pub async fn open_router(
    config: &RecallConfig,
    analyzer: Arc<dyn QueryAnalyzer>,
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingService>,
) -> RecallResult<QueryRouter> {
    config.validate()?;
    let stats = StatsHandle::load_or_rebuild(&config.statistics.path, store.as_ref()).await?;
    Ok(QueryRouter::new(analyzer, store, embedder, Arc::new(stats)).with_config(config))
}
