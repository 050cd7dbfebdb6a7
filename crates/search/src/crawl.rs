//! Corpus import from a web-crawl snapshot
//!
//! The crawler writes one JSON object keyed by URL:
//!
//! ```json
//! {
//!   "https://example.com/pricing": {
//!     "status": "success",
//!     "title": "Pricing",
//!     "text": "Plans start at $10 ..."
//!   },
//!   "https://example.com/old": { "status": "error", "error_message": "..." }
//! }
//! ```
//!
//! Only successful pages with non-empty text become documents.

use recall_core::{Document, RecallError, RecallResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
struct CrawlEntry {
    #[serde(default)]
    status: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Parse a crawl snapshot into documents ordered by URL.
///
/// Document id is the URL; text is `title + "\n" + text` when a title is
/// present.
pub fn parse_crawl_snapshot(json: &str) -> RecallResult<Vec<Document>> {
    let entries: BTreeMap<String, CrawlEntry> = serde_json::from_str(json)
        .map_err(|e| RecallError::invalid_input(format!("malformed crawl snapshot: {}", e)))?;

    let total = entries.len();
    let documents: Vec<Document> = entries
        .into_iter()
        .filter(|(_, entry)| entry.status == SUCCESS)
        .filter_map(|(url, entry)| {
            let body = entry.text.as_deref().map(str::trim).unwrap_or_default();
            if body.is_empty() {
                return None;
            }
            let text = match entry.title.as_deref().map(str::trim) {
                Some(title) if !title.is_empty() => format!("{}\n{}", title, body),
                _ => body.to_string(),
            };
            Some(Document::new(url, text))
        })
        .collect();

    tracing::debug!(
        target: "recall::stats",
        entries = total,
        documents = documents.len(),
        "Parsed crawl snapshot"
    );
    Ok(documents)
}

/// Read and parse a crawl snapshot file.
pub fn load_crawl_snapshot(path: &Path) -> RecallResult<Vec<Document>> {
    let json = std::fs::read_to_string(path)?;
    parse_crawl_snapshot(&json)
}
