//! Core types and traits for Recall
//!
//! This crate defines the foundational types used throughout the system:
//! - Error: `RecallError` taxonomy and `RecallResult` alias
//! - Documents: Document, CandidateResult, RankedResult
//! - Analysis: QueryAnalysis, ExtractedEntity, QueryIntent
//! - Filter: SearchFilter passed to the document store
//! - Traits: DocumentStore, EmbeddingService, QueryAnalyzer collaborators
//! - Config: `recall.toml` loading and validation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod document;
pub mod error;
pub mod filter;
pub mod traits;

pub use analysis::{
    EntityConfidence, ExtractedEntity, QueryAnalysis, QueryIntent, MAX_TECHNICAL_LEVEL,
    MIN_TECHNICAL_LEVEL,
};
pub use config::{
    ModelConfig, PolicyConfig, RecallConfig, RouterConfig, StatisticsConfig, CONFIG_FILE_NAME,
    DEFAULT_STATS_FILE,
};
pub use document::{CandidateResult, Document, Metadata, RankedResult};
pub use error::{RecallError, RecallResult};
pub use filter::SearchFilter;
pub use traits::{DocumentStore, EmbeddingService, QueryAnalyzer};
