//! Prompt template for relevance judging via chat completions

use super::JudgeCandidate;

/// System prompt for relevance scoring.
///
/// Instructs the model to output `N: score` lines for each numbered passage.
pub const SYSTEM_PROMPT: &str = "\
You judge search relevance for a company knowledge base. Given a question and \
numbered passages, score how well each passage answers the question from 0 to 10.

Output format (one per line, no other text):
1: <score>
2: <score>
...

Rules:
- 0 = irrelevant, 5 = related but does not answer, 10 = directly answers
- Score every passage listed, in order
- Output ONLY numbered score lines";

/// Longest passage excerpt sent to the judge, in characters
pub const MAX_PASSAGE_CHARS: usize = 1200;

/// Build the messages array for a judging request.
///
/// Passages are numbered 1..=N in candidate order; long passages are cut at
/// a character boundary.
pub fn build_judge_messages(query: &str, candidates: &[JudgeCandidate]) -> serde_json::Value {
    let mut user_content = format!("Question: {}\n\nPassages:", query);
    for (i, candidate) in candidates.iter().enumerate() {
        let excerpt: String = candidate.text.chars().take(MAX_PASSAGE_CHARS).collect();
        user_content.push_str(&format!("\n{}. {}", i + 1, excerpt.replace('\n', " ")));
    }

    serde_json::json!([
        {"role": "system", "content": SYSTEM_PROMPT},
        {"role": "user", "content": user_content}
    ])
}
