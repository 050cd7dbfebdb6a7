//! Shared LLM client infrastructure for expansion and relevance judging
//!
//! Provides the error type, the blocking HTTP call, its async wrapper and
//! the retry helper used by both `ApiExpander` and `ApiJudge`.

use recall_core::ModelConfig;
use std::future::Future;
use std::time::Duration;

// ============================================================================
// Error Type
// ============================================================================

/// Errors that can occur when calling an external LLM endpoint
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmClientError {
    /// HTTP request failed (network unreachable, connection refused, etc.)
    #[error("network error: {0}")]
    Network(String),
    /// Failed to parse model response
    #[error("parse error: {0}")]
    Parse(String),
    /// Model request timed out
    #[error("model request timed out")]
    Timeout,
    /// Required cargo feature (expand/rerank) is not enabled
    #[error("feature '{0}' not enabled")]
    FeatureDisabled(&'static str),
}

// ============================================================================
// Endpoint
// ============================================================================

/// An OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEndpoint {
    /// Full URL to the chat completions endpoint
    pub url: String,
    /// Model name to request
    pub model: String,
    /// Optional bearer token
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl ChatEndpoint {
    /// `endpoint` is the base URL (e.g. "http://localhost:11434/v1");
    /// `/chat/completions` is appended.
    pub fn new(endpoint: &str, model: &str, api_key: Option<&str>, timeout_ms: u64) -> Self {
        let base = endpoint.trim_end_matches('/');
        ChatEndpoint {
            url: format!("{}/chat/completions", base),
            model: model.to_string(),
            api_key: api_key.map(str::to_string),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Build from the `[model]` config section
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(
            &config.endpoint,
            &config.model,
            config.api_key.as_deref(),
            config.timeout_ms,
        )
    }

    /// Request body with the given messages and sampling parameters
    pub fn request_body(
        &self,
        messages: serde_json::Value,
        temperature: f32,
        max_tokens: u32,
    ) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        })
    }

    /// Send a request on the blocking pool and return the message content.
    pub async fn complete(&self, body: serde_json::Value) -> Result<String, LlmClientError> {
        let endpoint = self.clone();
        tokio::task::spawn_blocking(move || {
            call_chat_completions(
                &endpoint.url,
                endpoint.api_key.as_deref(),
                endpoint.timeout,
                &body,
            )
        })
        .await
        .map_err(|e| LlmClientError::Network(format!("blocking task failed: {}", e)))?
    }
}

// ============================================================================
// Blocking HTTP Call
// ============================================================================

/// Call an OpenAI-compatible chat completions endpoint and extract the response content.
///
/// Parses `choices[0].message.content` from the response.
#[cfg(any(feature = "expand", feature = "rerank"))]
pub fn call_chat_completions(
    url: &str,
    api_key: Option<&str>,
    timeout: Duration,
    body: &serde_json::Value,
) -> Result<String, LlmClientError> {
    let body_bytes = serde_json::to_vec(body)
        .map_err(|e| LlmClientError::Parse(format!("failed to serialize request: {}", e)))?;

    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    let agent = ureq::Agent::new_with_config(config);

    let mut request = agent.post(url).header("Content-Type", "application/json");
    if let Some(key) = api_key {
        request = request.header("Authorization", &format!("Bearer {}", key));
    }

    let mut response = request.send(&body_bytes[..]).map_err(|e| {
        let msg = e.to_string();
        if msg.contains("timed out") || msg.contains("Timeout") {
            LlmClientError::Timeout
        } else {
            LlmClientError::Network(msg)
        }
    })?;

    let response_text = response
        .body_mut()
        .read_to_string()
        .map_err(|e| LlmClientError::Network(format!("failed to read response: {}", e)))?;

    extract_content(&response_text)
}

/// Placeholder when neither HTTP-backed feature is enabled.
#[cfg(not(any(feature = "expand", feature = "rerank")))]
pub fn call_chat_completions(
    _url: &str,
    _api_key: Option<&str>,
    _timeout: Duration,
    _body: &serde_json::Value,
) -> Result<String, LlmClientError> {
    Err(LlmClientError::FeatureDisabled("expand/rerank"))
}

/// Pull `choices[0].message.content` out of a chat completions response.
pub fn extract_content(response_text: &str) -> Result<String, LlmClientError> {
    let json: serde_json::Value = serde_json::from_str(response_text)
        .map_err(|e| LlmClientError::Parse(format!("invalid JSON response: {}", e)))?;

    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            let preview: String = response_text.chars().take(200).collect();
            LlmClientError::Parse(format!("unexpected response format: {}", preview))
        })
}

// ============================================================================
// Retry Helper
// ============================================================================

/// Execute an LLM call with a single retry on failure or empty results.
///
/// 1. Awaits `call_fn()` to get raw text
/// 2. Calls `parse_fn()` to parse it
/// 3. If parsing succeeds but `is_empty_fn()` returns true, retries once
/// 4. If the call itself fails, retries once
///
/// `operation` is a label for tracing messages (e.g. "expand" or "rerank").
pub async fn retry_once<T, C, Fut>(
    call_fn: C,
    parse_fn: impl Fn(&str) -> T,
    is_empty_fn: impl Fn(&T) -> bool,
    on_empty_err: impl Fn() -> LlmClientError,
    operation: &str,
) -> Result<T, LlmClientError>
where
    C: Fn() -> Fut,
    Fut: Future<Output = Result<String, LlmClientError>>,
{
    match call_fn().await {
        Ok(text) => {
            let result = parse_fn(&text);
            if !is_empty_fn(&result) {
                return Ok(result);
            }
            tracing::warn!(
                target: "recall::llm_client",
                op = operation,
                "First call returned no valid results, retrying"
            );
        }
        Err(e) => {
            tracing::warn!(
                target: "recall::llm_client",
                op = operation,
                error = %e,
                "First call failed, retrying"
            );
        }
    }

    match call_fn().await {
        Ok(text) => {
            let result = parse_fn(&text);
            if is_empty_fn(&result) {
                tracing::warn!(
                    target: "recall::llm_client",
                    op = operation,
                    "Retry also returned no valid results, falling back"
                );
                Err(on_empty_err())
            } else {
                Ok(result)
            }
        }
        Err(e) => {
            tracing::warn!(
                target: "recall::llm_client",
                op = operation,
                error = %e,
                "Retry also failed, falling back"
            );
            Err(e)
        }
    }
}
