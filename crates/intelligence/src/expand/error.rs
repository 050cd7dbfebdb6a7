//! Error types for query expansion

use crate::llm_client::LlmClientError;
use recall_core::RecallError;

/// Errors that can occur during query expansion
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpandError {
    /// HTTP request failed (network unreachable, connection refused, etc.)
    #[error("network error: {0}")]
    Network(String),
    /// Model output held no usable expansion lines
    #[error("parse error: {0}")]
    Parse(String),
    /// Model request timed out
    #[error("model request timed out")]
    Timeout,
    /// The `expand` cargo feature is not enabled
    #[error("feature '{0}' not enabled")]
    FeatureDisabled(&'static str),
}

impl From<LlmClientError> for ExpandError {
    fn from(e: LlmClientError) -> Self {
        match e {
            LlmClientError::Network(msg) => ExpandError::Network(msg),
            LlmClientError::Parse(msg) => ExpandError::Parse(msg),
            LlmClientError::Timeout => ExpandError::Timeout,
            LlmClientError::FeatureDisabled(feat) => ExpandError::FeatureDisabled(feat),
        }
    }
}

impl From<ExpandError> for RecallError {
    fn from(e: ExpandError) -> Self {
        RecallError::Expansion(e.to_string())
    }
}
