//! Metadata filter passed to the document store
//!
//! Every field is optional; an all-`None` filter is normalized away by
//! [`SearchFilter::into_option`] so that "no filter" has one representation.
//!
//! Matching rules used by [`SearchFilter::matches`]:
//! - `categories`: metadata `category` equals one of the listed values (case-insensitive)
//! - `technical_level_min` / `technical_level_max`: metadata `technical_level` within bounds
//! - `required_entities`: every entity appears in metadata `entities` (case-insensitive)
//!
//! A document missing a field that the filter constrains does not match.

use crate::document::Metadata;
use serde::{Deserialize, Serialize};

/// Store-side metadata filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Allowed categories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// Inclusive lower bound on technical level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_level_min: Option<u8>,
    /// Inclusive upper bound on technical level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_level_max: Option<u8>,
    /// Entities that must all be present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_entities: Option<Vec<String>>,
}

impl SearchFilter {
    /// True if no field constrains anything
    pub fn is_empty(&self) -> bool {
        self.categories.as_ref().map_or(true, |c| c.is_empty())
            && self.technical_level_min.is_none()
            && self.technical_level_max.is_none()
            && self.required_entities.as_ref().map_or(true, |e| e.is_empty())
    }

    /// `None` for an empty filter, `Some(self)` otherwise
    pub fn into_option(self) -> Option<SearchFilter> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    /// Check a document's metadata against this filter
    pub fn matches(&self, metadata: &Metadata) -> bool {
        if let Some(categories) = self.categories.as_ref().filter(|c| !c.is_empty()) {
            let category = match metadata.get("category").and_then(|v| v.as_str()) {
                Some(c) => c,
                None => return false,
            };
            if !categories.iter().any(|c| c.eq_ignore_ascii_case(category)) {
                return false;
            }
        }

        if self.technical_level_min.is_some() || self.technical_level_max.is_some() {
            let level = match metadata.get("technical_level").and_then(|v| v.as_u64()) {
                Some(l) => l,
                None => return false,
            };
            if let Some(min) = self.technical_level_min {
                if level < u64::from(min) {
                    return false;
                }
            }
            if let Some(max) = self.technical_level_max {
                if level > u64::from(max) {
                    return false;
                }
            }
        }

        if let Some(required) = self.required_entities.as_ref().filter(|e| !e.is_empty()) {
            let present: Vec<&str> = match metadata.get("entities").and_then(|v| v.as_array()) {
                Some(arr) => arr.iter().filter_map(|v| v.as_str()).collect(),
                None => return false,
            };
            let all_present = required
                .iter()
                .all(|r| present.iter().any(|p| p.eq_ignore_ascii_case(r)));
            if !all_present {
                return false;
            }
        }

        true
    }
}
