//! Error types for Recall
//!
//! A single error enum is shared by every crate in the workspace.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! # Propagation classes
//!
//! Only a handful of variants ever reach a `route()` caller:
//!
//! | Class | Variants | Router behaviour |
//! |-------|----------|------------------|
//! | Fatal | `Analysis`, `InvalidInput`, `Cancelled` | returned to caller |
//! | Recovered | `Store`, `Embedding`, `Expansion`, `Rerank` | logged, fallback taken |
//! | Setup | `Persistence`, `Config`, `Internal` | returned from init paths only |

use std::io;
use thiserror::Error;

/// Result type alias for Recall operations
pub type RecallResult<T> = std::result::Result<T, RecallError>;

/// Error types for the retrieval pipeline
#[derive(Debug, Error)]
pub enum RecallError {
    /// Caller supplied input that cannot be processed (empty corpus, empty query)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Query analysis failed; no retrieval parameters can be derived
    #[error("Query analysis failed: {0}")]
    Analysis(String),

    /// Document store call failed
    #[error("Document store error: {0}")]
    Store(String),

    /// Embedding service failed or returned a vector of the wrong dimension
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Query expansion failed
    #[error("Query expansion error: {0}")]
    Expansion(String),

    /// Relevance judge failed, timed out, or violated its response contract
    #[error("Rerank error: {0}")]
    Rerank(String),

    /// Statistics or config file could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration is malformed or out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller cancelled the request or its deadline elapsed
    #[error("Request cancelled during {stage}")]
    Cancelled {
        /// Pipeline stage that observed the cancellation
        stage: String,
    },

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RecallError {
    /// Build an `InvalidInput` error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        RecallError::InvalidInput(msg.into())
    }

    /// Build an `Internal` error
    pub fn internal(msg: impl Into<String>) -> Self {
        RecallError::Internal(msg.into())
    }

    /// Build a `Config` error
    pub fn config(msg: impl Into<String>) -> Self {
        RecallError::Config(msg.into())
    }

    /// Build a `Cancelled` error for the given stage
    pub fn cancelled(stage: impl Into<String>) -> Self {
        RecallError::Cancelled {
            stage: stage.into(),
        }
    }

    /// True if this error must be surfaced to a `route()` caller.
    ///
    /// Everything else is absorbed by the router into a degraded result.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RecallError::Analysis(_) | RecallError::InvalidInput(_) | RecallError::Cancelled { .. }
        )
    }
}

impl From<io::Error> for RecallError {
    fn from(e: io::Error) -> Self {
        RecallError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for RecallError {
    fn from(e: serde_json::Error) -> Self {
        RecallError::Persistence(format!("JSON error: {}", e))
    }
}
