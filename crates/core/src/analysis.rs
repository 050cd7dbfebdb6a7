//! Query analysis output
//!
//! The query-analysis service classifies a query into a category, a
//! technical level and a set of named entities. These types are the
//! contract between that service and the retrieval parameter policy.

use serde::{Deserialize, Serialize};

/// Lowest technical level on the analysis scale
pub const MIN_TECHNICAL_LEVEL: u8 = 1;
/// Highest technical level on the analysis scale
pub const MAX_TECHNICAL_LEVEL: u8 = 5;

/// How sure the analyzer is about an extracted entity.
///
/// Ordered from least to most confident so that policies can compare
/// against a threshold (`confidence > EntityConfidence::Uncertain`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityConfidence {
    /// Probably not a real entity
    Low,
    /// Could go either way
    Uncertain,
    /// Probably a real entity
    Likely,
    /// Definitely a real entity
    Certain,
}

/// A named entity extracted from the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntity {
    /// Surface form of the entity
    pub name: String,
    /// Analyzer confidence
    pub confidence: EntityConfidence,
}

impl ExtractedEntity {
    /// Create a new entity
    pub fn new(name: impl Into<String>, confidence: EntityConfidence) -> Self {
        ExtractedEntity {
            name: name.into(),
            confidence,
        }
    }
}

/// What the user is trying to do with the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryIntent {
    /// Wants an explanation or facts
    Informational,
    /// Wants to find a specific page or section
    Navigational,
    /// Wants to do something (sign up, buy, contact)
    Transactional,
    /// Wants to fix a problem
    Troubleshooting,
    /// Wants to compare options
    Comparison,
    /// Anything the analyzer could not place
    #[serde(other)]
    Other,
}

impl QueryIntent {
    /// Lowercase name, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryIntent::Informational => "informational",
            QueryIntent::Navigational => "navigational",
            QueryIntent::Transactional => "transactional",
            QueryIntent::Troubleshooting => "troubleshooting",
            QueryIntent::Comparison => "comparison",
            QueryIntent::Other => "other",
        }
    }
}

/// Classification of a single query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    /// Main topic category
    pub primary_category: String,
    /// Additional plausible categories
    #[serde(default)]
    pub secondary_categories: Vec<String>,
    /// Technical level on the `MIN_TECHNICAL_LEVEL..=MAX_TECHNICAL_LEVEL` scale
    pub technical_level: u8,
    /// Named entities found in the query
    #[serde(default)]
    pub entities: Vec<ExtractedEntity>,
    /// Query intent
    pub intent: QueryIntent,
}

impl QueryAnalysis {
    /// Create an analysis with no secondary categories or entities
    pub fn new(primary_category: impl Into<String>, technical_level: u8, intent: QueryIntent) -> Self {
        QueryAnalysis {
            primary_category: primary_category.into(),
            secondary_categories: vec![],
            technical_level,
            entities: vec![],
            intent,
        }
    }

    /// Builder: set secondary categories
    pub fn with_secondary_categories(mut self, categories: Vec<String>) -> Self {
        self.secondary_categories = categories;
        self
    }

    /// Builder: set entities
    pub fn with_entities(mut self, entities: Vec<ExtractedEntity>) -> Self {
        self.entities = entities;
        self
    }
}
