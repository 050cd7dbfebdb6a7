//! Query expansion
//!
//! The `QueryExpander` trait turns a user query into typed variants. The
//! router folds them into the two texts a search pass needs:
//!
//! | Type | Purpose | Feeds |
//! |------|---------|-------|
//! | `Lex` | Keyword reformulations | BM25 query terms |
//! | `Vec` | Semantic rephrasings | Embedded query text |
//! | `Hyde` | Hypothetical document text | Embedded query text |
//!
//! Expansion never reaches the relevance judge; reranking always sees the
//! literal query.

pub mod api;
pub mod error;
pub mod parser;
pub mod prompt;


use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use api::ApiExpander;
pub use error::ExpandError;

/// Type of expanded query; determines which search input it feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Keyword reformulation
    Lex,
    /// Semantic rephrasing
    Vec,
    /// Hypothetical document text (HyDE)
    Hyde,
}

/// A single expanded query with its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedQuery {
    /// Which search input this variant feeds
    pub query_type: QueryType,
    /// The variant text
    pub text: String,
}

/// Result of query expansion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpandedQueries {
    /// The expanded query variants
    pub queries: Vec<ExpandedQuery>,
}

impl ExpandedQueries {
    /// True if the expander produced nothing usable
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Text scored lexically: the original query plus every `Lex` variant
    pub fn lexical_query(&self, original: &str) -> String {
        self.join(original, |t| t == QueryType::Lex)
    }

    /// Text embedded for vector search: the original query plus every
    /// `Vec` and `Hyde` variant
    pub fn semantic_query(&self, original: &str) -> String {
        self.join(original, |t| t != QueryType::Lex)
    }

    fn join(&self, original: &str, keep: impl Fn(QueryType) -> bool) -> String {
        let mut out = original.trim().to_string();
        for q in self.queries.iter().filter(|q| keep(q.query_type)) {
            out.push(' ');
            out.push_str(&q.text);
        }
        out
    }
}

/// Trait for query expansion implementations.
///
/// Object-safe for use as `Arc<dyn QueryExpander>`.
///
/// # Implementations
///
/// - `ApiExpander`: calls an OpenAI-compatible endpoint
#[async_trait]
pub trait QueryExpander: Send + Sync {
    /// Expand a query into typed search variants.
    async fn expand(&self, query: &str) -> Result<ExpandedQueries, ExpandError>;
}
