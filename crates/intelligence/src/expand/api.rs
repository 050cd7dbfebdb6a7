//! API-based query expander using an OpenAI-compatible endpoint
//!
//! Calls `{endpoint}/chat/completions` with the expansion prompt and parses
//! the response into typed queries, retrying once on failure or empty output.

use super::parser::parse_expansion_with_filter;
use super::{ExpandError, ExpandedQueries, QueryExpander};
use crate::llm_client::{retry_once, ChatEndpoint, LlmClientError};
use async_trait::async_trait;
use recall_core::ModelConfig;

/// Default expansion temperature: moderate creativity for query variations.
const DEFAULT_EXPAND_TEMPERATURE: f32 = 0.7;
/// Default max tokens for expansion responses.
const DEFAULT_EXPAND_MAX_TOKENS: u32 = 600;

/// Query expander backed by an OpenAI-compatible chat completions endpoint.
///
/// Works with Ollama, vLLM, llama.cpp server, OpenAI, and other compatible providers.
pub struct ApiExpander {
    endpoint: ChatEndpoint,
    temperature: f32,
    max_tokens: u32,
}

impl ApiExpander {
    /// `endpoint` is the base URL (e.g. "http://localhost:11434/v1").
    pub fn new(endpoint: &str, model: &str, api_key: Option<&str>, timeout_ms: u64) -> Self {
        Self::with_endpoint(ChatEndpoint::new(endpoint, model, api_key, timeout_ms))
    }

    /// Build from the `[model]` config section
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::with_endpoint(ChatEndpoint::from_config(config))
    }

    fn with_endpoint(endpoint: ChatEndpoint) -> Self {
        ApiExpander {
            endpoint,
            temperature: DEFAULT_EXPAND_TEMPERATURE,
            max_tokens: DEFAULT_EXPAND_MAX_TOKENS,
        }
    }

    /// Override the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the maximum response tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// The endpoint this expander calls
    pub fn endpoint(&self) -> &ChatEndpoint {
        &self.endpoint
    }

    #[cfg(feature = "expand")]
    async fn call_api(&self, query: &str) -> Result<String, LlmClientError> {
        use super::prompt::build_messages;

        let body = self
            .endpoint
            .request_body(build_messages(query), self.temperature, self.max_tokens);
        self.endpoint.complete(body).await
    }

    #[cfg(not(feature = "expand"))]
    async fn call_api(&self, _query: &str) -> Result<String, LlmClientError> {
        Err(LlmClientError::FeatureDisabled("expand"))
    }
}

#[async_trait]
impl QueryExpander for ApiExpander {
    async fn expand(&self, query: &str) -> Result<ExpandedQueries, ExpandError> {
        let result = retry_once(
            || self.call_api(query),
            |text| parse_expansion_with_filter(text, Some(query)),
            |result| result.is_empty(),
            || LlmClientError::Parse("model returned no valid expansion lines after retry".into()),
            "expand",
        )
        .await?;

        tracing::debug!(
            target: "recall::expand",
            variants = result.queries.len(),
            "Query expanded"
        );
        Ok(result)
    }
}
