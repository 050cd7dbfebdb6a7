//! Output parser for LLM query expansion responses
//!
//! Parses `lex:`, `vec:`, and `hyde:` prefixed lines from model output.
//! Tolerant: unrecognized lines are skipped, an empty result is left for
//! the caller to treat as a failed expansion.

use super::{ExpandedQueries, ExpandedQuery, QueryType};
use recall_search::tokenize_unique;

/// Parse LLM output into typed expanded queries, without a drift guard.
pub fn parse_expansion(text: &str) -> ExpandedQueries {
    parse_expansion_with_filter(text, None)
}

/// Parse LLM output, dropping lex/vec lines that share no term with the
/// original query.
///
/// Query terms come from the scoring tokenizer, so stopwords never count as
/// overlap. A term matches when it occurs anywhere in the lowercased
/// expansion ("auth" matches "authentication"). `hyde:` lines are exempt;
/// a hypothetical passage may use entirely different vocabulary. Exact
/// repeats of the original query are dropped.
pub fn parse_expansion_with_filter(text: &str, original_query: Option<&str>) -> ExpandedQueries {
    let query_terms: Vec<String> = original_query.map(tokenize_unique).unwrap_or_default();
    let original_lower = original_query.map(|q| q.trim().to_lowercase());

    let mut queries: Vec<ExpandedQuery> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim().trim_start_matches(&['-', '*'][..]).trim_start();
        let (query_type, expansion_text) = match split_prefix(trimmed) {
            Some(parsed) => parsed,
            None => continue,
        };
        if expansion_text.is_empty() {
            continue;
        }

        let expansion_lower = expansion_text.to_lowercase();
        if original_lower.as_deref() == Some(expansion_lower.as_str()) {
            continue;
        }
        if !query_terms.is_empty() && query_type != QueryType::Hyde {
            let has_overlap = query_terms
                .iter()
                .any(|term| expansion_lower.contains(term.as_str()));
            if !has_overlap {
                continue;
            }
        }
        if queries
            .iter()
            .any(|q| q.query_type == query_type && q.text.eq_ignore_ascii_case(expansion_text))
        {
            continue;
        }

        queries.push(ExpandedQuery {
            query_type,
            text: expansion_text.to_string(),
        });
    }

    ExpandedQueries { queries }
}

/// Case-insensitive `lex:`/`vec:`/`hyde:` prefix split.
fn split_prefix(line: &str) -> Option<(QueryType, &str)> {
    let (prefix, rest) = line.split_once(':')?;
    let query_type = match prefix.trim().to_ascii_lowercase().as_str() {
        "lex" => QueryType::Lex,
        "vec" => QueryType::Vec,
        "hyde" => QueryType::Hyde,
        _ => return None,
    };
    Some((query_type, rest.trim()))
}
