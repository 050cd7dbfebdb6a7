//! Prompt template for query expansion

/// System prompt for query expansion via an LLM.
///
/// Instructs the model to output `lex:`, `vec:`, and `hyde:` prefixed lines.
pub const SYSTEM_PROMPT: &str = "\
You expand search queries for a company knowledge base made of help-center \
pages, product documentation, pricing and policy text.

Given a user's question, write alternative search variants that improve recall.

Output format (one per line, no other text):
lex: <keywords and synonyms for lexical BM25 matching>
vec: <natural language rephrasing for semantic similarity>
hyde: <a short passage the ideal knowledge-base page would contain>

Rules:
- Generate 1-3 lex lines (synonyms, product terms, abbreviations)
- Generate 1 vec line
- Generate at most 1 hyde line (50-200 chars)
- Keep at least one word of the original question in every lex and vec line
- Do NOT include any explanation, numbering, or markdown
- Output ONLY lines starting with lex:, vec:, or hyde:";

/// Build the messages array for an OpenAI-compatible chat completions request.
pub fn build_messages(query: &str) -> serde_json::Value {
    serde_json::json!([
        {"role": "system", "content": SYSTEM_PROMPT},
        {"role": "user", "content": format!("Question: {}", query)}
    ])
}
