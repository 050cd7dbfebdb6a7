//! Error types for reranking

use crate::llm_client::LlmClientError;
use recall_core::RecallError;

/// Errors that can occur during reranking.
///
/// Every variant fails the whole batch; the router falls back to the fused
/// order rather than mixing judged and unjudged candidates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RerankError {
    /// HTTP request failed (network unreachable, connection refused, etc.)
    #[error("network error: {0}")]
    Network(String),
    /// Model output could not be read as scores
    #[error("parse error: {0}")]
    Parse(String),
    /// Judge did not answer within the rerank timeout
    #[error("rerank request timed out")]
    Timeout,
    /// Judge answered, but the response breaks the score contract
    #[error("contract violation: {0}")]
    Contract(String),
    /// The `rerank` cargo feature is not enabled
    #[error("feature '{0}' not enabled")]
    FeatureDisabled(&'static str),
}

impl RerankError {
    /// Short tag used in result explanations and degradation records
    pub fn kind(&self) -> &'static str {
        match self {
            RerankError::Network(_) => "network",
            RerankError::Parse(_) => "malformed",
            RerankError::Timeout => "timeout",
            RerankError::Contract(_) => "contract",
            RerankError::FeatureDisabled(_) => "disabled",
        }
    }
}

impl From<LlmClientError> for RerankError {
    fn from(e: LlmClientError) -> Self {
        match e {
            LlmClientError::Network(msg) => RerankError::Network(msg),
            LlmClientError::Parse(msg) => RerankError::Parse(msg),
            LlmClientError::Timeout => RerankError::Timeout,
            LlmClientError::FeatureDisabled(feat) => RerankError::FeatureDisabled(feat),
        }
    }
}

impl From<RerankError> for RecallError {
    fn from(e: RerankError) -> Self {
        RecallError::Rerank(e.to_string())
    }
}
