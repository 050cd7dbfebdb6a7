//! Retrieval parameter policy
//!
//! A pure mapping from a query's analysis to the knobs of one search:
//! fusion weight, metadata filter, and the expansion / rerank toggles.
//! Parameters are derived fresh for every query and never shared.

use recall_core::{EntityConfidence, PolicyConfig, QueryAnalysis, SearchFilter};
use serde::{Deserialize, Serialize};

/// Inclusive technical-level window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalLevelRange {
    /// Lowest accepted level
    pub min: u8,
    /// Highest accepted level
    pub max: u8,
}

/// Categories the query is about, and whether they restrict the store query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFilter {
    /// Primary category first, then secondary categories, deduplicated
    pub categories: Vec<String>,
    /// `true`: passed to the store as a filter; `false`: score boost only
    pub strict: bool,
}

/// Per-query retrieval parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalParameters {
    /// BM25 share of the fused score, in [0,1]
    pub hybrid_weight: f32,
    /// Accepted technical levels
    pub technical_level_range: TechnicalLevelRange,
    /// Category filter or boost
    pub category_filter: CategoryFilter,
    /// Entities every result must mention
    pub required_entities: Vec<String>,
    /// Run query expansion
    pub expand_query: bool,
    /// Run the relevance judge
    pub rerank: bool,
}

impl RetrievalParameters {
    /// Store filter for the first search pass, `None` if nothing constrains.
    ///
    /// A technical-level window covering the whole scale is omitted, as are
    /// non-strict categories.
    pub fn to_search_filter(&self, scale: TechnicalLevelRange) -> Option<SearchFilter> {
        let mut filter = SearchFilter::default();

        if self.category_filter.strict && !self.category_filter.categories.is_empty() {
            filter.categories = Some(self.category_filter.categories.clone());
        }
        if self.technical_level_range != scale {
            filter.technical_level_min = Some(self.technical_level_range.min);
            filter.technical_level_max = Some(self.technical_level_range.max);
        }
        if !self.required_entities.is_empty() {
            filter.required_entities = Some(self.required_entities.clone());
        }

        filter.into_option()
    }

    /// Whether `category` is one of the query's categories (case-insensitive)
    pub fn matches_category(&self, category: &str) -> bool {
        self.category_filter
            .categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }
}

/// Maps [`QueryAnalysis`] to [`RetrievalParameters`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalParameterPolicy {
    config: PolicyConfig,
}

impl RetrievalParameterPolicy {
    /// Policy with explicit rules
    pub fn new(config: PolicyConfig) -> Self {
        RetrievalParameterPolicy { config }
    }

    /// The rules in effect
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// The full technical-level scale
    pub fn scale(&self) -> TechnicalLevelRange {
        TechnicalLevelRange {
            min: self.config.technical_level_min,
            max: self.config.technical_level_max,
        }
    }

    /// Derive parameters for one query.
    pub fn derive(&self, analysis: &QueryAnalysis) -> RetrievalParameters {
        let scale = self.scale();
        let level = analysis.technical_level.max(scale.min).min(scale.max);
        let widening = self.config.level_widening;
        let technical_level_range = TechnicalLevelRange {
            min: level.saturating_sub(widening).max(scale.min),
            max: level.saturating_add(widening).min(scale.max),
        };

        let mut categories: Vec<String> = Vec::new();
        for category in std::iter::once(&analysis.primary_category)
            .chain(analysis.secondary_categories.iter())
        {
            let category = category.trim();
            if !category.is_empty() && !categories.iter().any(|c| c.eq_ignore_ascii_case(category)) {
                categories.push(category.to_string());
            }
        }

        let mut required_entities: Vec<String> = Vec::new();
        for entity in analysis
            .entities
            .iter()
            .filter(|e| e.confidence > EntityConfidence::Uncertain)
        {
            let name = entity.name.trim();
            if !name.is_empty() && !required_entities.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                required_entities.push(name.to_string());
            }
        }

        let hybrid_weight = if required_entities.is_empty() {
            self.config.default_hybrid_weight
        } else {
            self.config.entity_hybrid_weight
        };

        RetrievalParameters {
            hybrid_weight: hybrid_weight.clamp(0.0, 1.0),
            technical_level_range,
            category_filter: CategoryFilter {
                categories,
                strict: self.config.strict_category_filter,
            },
            required_entities,
            expand_query: !self.config.no_expand_intents.contains(&analysis.intent),
            rerank: !self.config.no_rerank_intents.contains(&analysis.intent),
        }
    }
}
