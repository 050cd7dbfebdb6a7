//! Retrieval configuration via `recall.toml`
//!
//! On first start a commented default `recall.toml` is written next to the
//! statistics file. To change settings, edit the file and restart. Every
//! field has a default, so a partial (or empty) file is valid.

use crate::analysis::{QueryIntent, MAX_TECHNICAL_LEVEL, MIN_TECHNICAL_LEVEL};
use crate::error::{RecallError, RecallResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "recall.toml";

/// Default file name for persisted corpus statistics
pub const DEFAULT_STATS_FILE: &str = "recall.stats";

// ============================================================================
// [router]
// ============================================================================

/// Defaults for per-query router options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Number of results returned to the caller
    pub limit: usize,
    /// Number of candidates requested from the document store
    pub search_limit: usize,
    /// Number of results kept after reranking (must not exceed `search_limit`)
    pub rerank_count: usize,
    /// Expand the query before searching
    pub use_query_expansion: bool,
    /// Send candidates to the relevance judge
    pub use_reranking: bool,
    /// Apply policy-derived metadata filters to the first search pass
    pub apply_metadata_filtering: bool,
    /// Retry without filters when the filtered pass finds nothing
    pub fallback_to_general: bool,
    /// Relevance judge timeout in milliseconds
    pub rerank_timeout_ms: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            limit: 5,
            search_limit: 15,
            rerank_count: 10,
            use_query_expansion: false,
            use_reranking: true,
            apply_metadata_filtering: true,
            fallback_to_general: true,
            rerank_timeout_ms: 10_000,
        }
    }
}

// ============================================================================
// [policy]
// ============================================================================

/// Rules mapping query analysis to retrieval parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Lowest level on the technical scale
    pub technical_level_min: u8,
    /// Highest level on the technical scale
    pub technical_level_max: u8,
    /// Levels added on each side of the analyzed level
    pub level_widening: u8,
    /// BM25 share of the fused score for ordinary queries
    pub default_hybrid_weight: f32,
    /// BM25 share when the query names confident entities
    pub entity_hybrid_weight: f32,
    /// Pass categories to the store as a filter (true) or only boost (false)
    pub strict_category_filter: bool,
    /// Multiplier applied to candidates whose category matches a non-strict filter
    pub category_boost: f32,
    /// Intents for which reranking is disabled
    pub no_rerank_intents: Vec<QueryIntent>,
    /// Intents for which query expansion is disabled
    pub no_expand_intents: Vec<QueryIntent>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            technical_level_min: MIN_TECHNICAL_LEVEL,
            technical_level_max: MAX_TECHNICAL_LEVEL,
            level_widening: 1,
            default_hybrid_weight: 0.3,
            entity_hybrid_weight: 0.5,
            strict_category_filter: true,
            category_boost: 1.1,
            no_rerank_intents: vec![QueryIntent::Navigational],
            no_expand_intents: vec![QueryIntent::Navigational],
        }
    }
}

// ============================================================================
// [statistics]
// ============================================================================

/// Where corpus statistics are persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Path of the statistics file
    pub path: PathBuf,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        StatisticsConfig {
            path: PathBuf::from(DEFAULT_STATS_FILE),
        }
    }
}

// ============================================================================
// [model]
// ============================================================================

/// Configuration for an external inference model endpoint.
///
/// When present, it is used to construct the API query expander and the
/// API relevance judge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// OpenAI-compatible API endpoint (e.g. "http://localhost:11434/v1")
    pub endpoint: String,
    /// Model name (e.g. "qwen3:1.7b")
    pub model: String,
    /// Optional API key for authenticated endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// HTTP request timeout in milliseconds (default: 5000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    5000
}

// ============================================================================
// RecallConfig
// ============================================================================

/// Top-level configuration loaded from `recall.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecallConfig {
    /// Router defaults
    #[serde(default)]
    pub router: RouterConfig,
    /// Retrieval parameter policy
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Statistics persistence
    #[serde(default)]
    pub statistics: StatisticsConfig,
    /// Optional model endpoint for expansion and reranking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelConfig>,
}

impl RecallConfig {
    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `RecallError::Config` describing the first violated constraint.
    pub fn validate(&self) -> RecallResult<()> {
        let r = &self.router;
        if r.limit == 0 {
            return Err(RecallError::config("router.limit must be at least 1"));
        }
        if r.search_limit == 0 {
            return Err(RecallError::config("router.search_limit must be at least 1"));
        }
        if r.rerank_count > r.search_limit {
            return Err(RecallError::config(format!(
                "router.rerank_count ({}) must not exceed router.search_limit ({})",
                r.rerank_count, r.search_limit
            )));
        }

        let p = &self.policy;
        if p.technical_level_min > p.technical_level_max {
            return Err(RecallError::config(format!(
                "policy.technical_level_min ({}) is above policy.technical_level_max ({})",
                p.technical_level_min, p.technical_level_max
            )));
        }
        for (name, weight) in [
            ("default_hybrid_weight", p.default_hybrid_weight),
            ("entity_hybrid_weight", p.entity_hybrid_weight),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(RecallError::config(format!(
                    "policy.{} must be within [0, 1], got {}",
                    name, weight
                )));
            }
        }
        if !p.category_boost.is_finite() || p.category_boost < 1.0 {
            return Err(RecallError::config(format!(
                "policy.category_boost must be >= 1.0, got {}",
                p.category_boost
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Recall retrieval configuration

[router]
limit = 5                       # results returned to the caller
search_limit = 15               # candidates requested from the document store
rerank_count = 10               # results kept after reranking (<= search_limit)
use_query_expansion = false
use_reranking = true
apply_metadata_filtering = true
fallback_to_general = true      # retry without filters when nothing matches
rerank_timeout_ms = 10000

[policy]
technical_level_min = 1
technical_level_max = 5
level_widening = 1              # analyzed level +/- this many levels
default_hybrid_weight = 0.3     # BM25 share of the fused score
entity_hybrid_weight = 0.5      # BM25 share when the query names entities
strict_category_filter = true   # false = boost matching categories instead of filtering
category_boost = 1.1
no_rerank_intents = ["navigational"]
no_expand_intents = ["navigational"]

[statistics]
path = "recall.stats"

# Model configuration for query expansion and reranking.
# [model]
# endpoint = "http://localhost:11434/v1"
# model = "qwen3:1.7b"
# api_key = "your-api-key"      # optional
# timeout_ms = 5000              # optional, default 5000
"#
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> RecallResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RecallError::Persistence(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: RecallConfig = toml::from_str(&content).map_err(|e| {
            RecallError::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> RecallResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                RecallError::Persistence(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> RecallResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| RecallError::internal(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            RecallError::Persistence(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
