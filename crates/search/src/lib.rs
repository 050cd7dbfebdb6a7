//! Lexical retrieval for Recall
//!
//! This crate provides:
//! - Tokenizer shared by indexing and query scoring
//! - CorpusStatistics: document frequencies and lengths, persisted to disk
//! - StatsHandle: the process-wide, atomically swapped statistics snapshot
//! - BM25Scorer behind the Scorer trait
//! - ScoreFusion: convex blend of BM25 and vector similarity
//! - InMemoryDocumentStore: brute-force reference DocumentStore
//! - Crawl snapshot import
//!
//! # Usage
//!
//! ```
//! use recall_core::Document;
//! use recall_search::{BM25Scorer, CorpusStatistics, Scorer};
//!
//! let docs = vec![
//!     Document::new("1", "pricing plans start at $10"),
//!     Document::new("2", "our security uses AES-256"),
//! ];
//! let stats = CorpusStatistics::build(&docs).unwrap();
//! assert!(BM25Scorer::default().score("pricing", &docs[0], &stats) > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod crawl;
pub mod fusion;
pub mod handle;
pub mod memory;
pub mod persist;
pub mod scorer;
pub mod stats;
pub mod tokenizer;

pub use crawl::{load_crawl_snapshot, parse_crawl_snapshot};
pub use fusion::{combine, combine_with, normalize_vector, sort_by_combined_score, FusionStats, ScoreFusion};
pub use handle::StatsHandle;
pub use memory::{cosine_similarity, InMemoryDocumentStore};
pub use persist::{StatsFileError, STATS_FORMAT_VERSION, STATS_MAGIC};
pub use scorer::{BM25Scorer, Scorer};
pub use stats::CorpusStatistics;
pub use tokenizer::{tokenize, tokenize_unique, tokenize_with, TokenizerOptions};
