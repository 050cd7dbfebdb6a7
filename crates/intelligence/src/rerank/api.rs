//! API-based relevance judge using an OpenAI-compatible chat completions endpoint
//!
//! Sends a single batch prompt with the query and numbered passages, asks
//! the model to score each passage 0-10, and maps the `N: score` lines back
//! onto the request positions.

use super::{JudgeRequest, JudgeResponse, RelevanceJudge, RerankError};
use crate::llm_client::{retry_once, ChatEndpoint, LlmClientError};
use async_trait::async_trait;
use recall_core::ModelConfig;

/// Default judge temperature: deterministic for consistent scoring.
const DEFAULT_JUDGE_TEMPERATURE: f32 = 0.0;

/// Relevance judge backed by an OpenAI-compatible endpoint.
///
/// Works with Ollama, vLLM, llama.cpp server, OpenAI, and other compatible providers.
pub struct ApiJudge {
    endpoint: ChatEndpoint,
    temperature: f32,
}

impl ApiJudge {
    /// `endpoint` is the base URL (e.g. "http://localhost:11434/v1").
    pub fn new(endpoint: &str, model: &str, api_key: Option<&str>, timeout_ms: u64) -> Self {
        ApiJudge {
            endpoint: ChatEndpoint::new(endpoint, model, api_key, timeout_ms),
            temperature: DEFAULT_JUDGE_TEMPERATURE,
        }
    }

    /// Build from the `[model]` config section
    pub fn from_config(config: &ModelConfig) -> Self {
        ApiJudge {
            endpoint: ChatEndpoint::from_config(config),
            temperature: DEFAULT_JUDGE_TEMPERATURE,
        }
    }

    /// Override the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// The endpoint this judge calls
    pub fn endpoint(&self) -> &ChatEndpoint {
        &self.endpoint
    }

    #[cfg(feature = "rerank")]
    async fn call_api(&self, request: &JudgeRequest) -> Result<String, LlmClientError> {
        use super::prompt::build_judge_messages;

        // Room for "NN: 10.0\n" per passage
        const TOKENS_PER_PASSAGE: u32 = 8;
        const MIN_JUDGE_MAX_TOKENS: u32 = 64;

        let max_tokens = (request.candidates.len() as u32)
            .saturating_mul(TOKENS_PER_PASSAGE)
            .max(MIN_JUDGE_MAX_TOKENS);
        let body = self.endpoint.request_body(
            build_judge_messages(&request.query, &request.candidates),
            self.temperature,
            max_tokens,
        );
        self.endpoint.complete(body).await
    }

    #[cfg(not(feature = "rerank"))]
    async fn call_api(&self, _request: &JudgeRequest) -> Result<String, LlmClientError> {
        Err(LlmClientError::FeatureDisabled("rerank"))
    }
}

/// Parse the model's `N: score` lines into a positional score vector.
///
/// Line numbers are 1-based. Lines that are not `N: score` are ignored; a
/// later line for the same number overrides an earlier one. Scores are kept
/// as written (no clamping) so that out-of-range answers fail validation.
///
/// # Errors
///
/// A message naming the first passage with no parsable score.
pub fn parse_judge_response(text: &str, candidate_count: usize) -> Result<Vec<f32>, String> {
    let mut scores: Vec<Option<f32>> = vec![None; candidate_count];

    for line in text.lines() {
        let line = line.trim();
        let (num_part, score_part) = match line.split_once(':') {
            Some(parts) => parts,
            None => continue,
        };
        let num_part = num_part.trim().trim_end_matches('.');
        let score_part = score_part
            .trim()
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default();

        if let (Ok(line_num), Ok(score)) = (num_part.parse::<usize>(), score_part.parse::<f32>()) {
            if line_num >= 1 && line_num <= candidate_count {
                scores[line_num - 1] = Some(score);
            }
        }
    }

    scores
        .into_iter()
        .enumerate()
        .map(|(i, s)| s.ok_or_else(|| format!("no score for passage {}", i + 1)))
        .collect()
}

#[async_trait]
impl RelevanceJudge for ApiJudge {
    async fn judge(&self, request: &JudgeRequest) -> Result<JudgeResponse, RerankError> {
        let count = request.candidates.len();
        let parsed = retry_once(
            || self.call_api(request),
            |text| parse_judge_response(text, count),
            |result| result.is_err(),
            || LlmClientError::Parse("model returned incomplete scores after retry".into()),
            "rerank",
        )
        .await?;

        match parsed {
            Ok(scores) => Ok(JudgeResponse { scores }),
            Err(msg) => Err(RerankError::Parse(msg)),
        }
    }
}
