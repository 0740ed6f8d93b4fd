//! Provider-agnostic LLM client.
//!
//! One `complete(request) → structured JSON` operation behind a trait, with
//! three interchangeable implementations selected once from configuration.
//! Provider differences (wire shapes, auth headers, schema enforcement) stay
//! inside the implementations; callers never branch on the provider.

pub mod anthropic;
pub mod azure;
pub mod openai;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::{LlmConfig, LlmProvider};
use crate::error::{Result, ScrapeError};

pub use anthropic::AnthropicClient;
pub use azure::AzureOpenAiClient;
pub use openai::OpenAiClient;

/// One chat-completion round-trip constrained to structured output.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    /// JSON schema the response must conform to. Providers that support
    /// schema-constrained decoding enforce it on the wire; others carry it
    /// as an instruction. The response is parsed as JSON either way.
    pub schema: Option<Value>,
    pub max_tokens: u32,
    /// Pinned to 0.0 for classification so re-runs reproduce.
    pub temperature: f32,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            schema: None,
            max_tokens: 1024,
            temperature: 0.0,
        }
    }

    #[must_use]
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Chat-completion backend abstraction.
#[async_trait]
pub trait LlmClient: Send + Sync + std::fmt::Debug {
    /// Send the request and return the parsed JSON value of the response.
    async fn complete(&self, request: CompletionRequest) -> Result<Value>;

    fn provider(&self) -> &'static str;
}

/// Construct the configured backend. Called once at job start.
pub fn build_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    match config.provider {
        LlmProvider::Anthropic => Ok(Arc::new(AnthropicClient::new(config))),
        LlmProvider::OpenAi => Ok(Arc::new(OpenAiClient::new(config))),
        LlmProvider::AzureOpenAi => Ok(Arc::new(AzureOpenAiClient::new(config)?)),
    }
}

/// Parse model output as JSON, tolerating a markdown code fence around it.
pub(crate) fn parse_structured(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim);
    if let Some(inner) = unfenced
        && let Ok(value) = serde_json::from_str(inner)
    {
        return Ok(value);
    }

    let preview: String = trimmed.chars().take(200).collect();
    Err(ScrapeError::Llm(format!(
        "response is not valid JSON: {preview}"
    )))
}
