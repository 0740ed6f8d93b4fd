//! Anthropic messages-API backend.
//!
//! The messages API has no schema-constrained decoding mode, so a request's
//! schema travels as an instruction appended to the prompt; conformance is
//! still enforced by the shared JSON parse at the boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CompletionRequest, LlmClient, parse_structured};
use crate::config::LlmConfig;
use crate::error::{Result, ScrapeError};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Anthropic-hosted messages API.
#[derive(Clone, Debug)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicClient {
    #[must_use]
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Value> {
        let mut prompt = request.prompt.clone();
        if let Some(schema) = &request.schema {
            prompt.push_str(&format!(
                "\n\nRespond with a single JSON object conforming to this schema, nothing else:\n{schema}"
            ));
        }

        let body = MessagesRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScrapeError::Llm(format!("anthropic request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ScrapeError::Llm(format!(
                "anthropic returned {status}: {detail}"
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ScrapeError::Llm(format!("anthropic response unreadable: {e}")))?;
        let text = parsed
            .content
            .first()
            .map(|block| block.text.clone())
            .ok_or_else(|| ScrapeError::Llm("anthropic returned no content".into()))?;

        parse_structured(&text)
    }

    fn provider(&self) -> &'static str {
        "anthropic"
    }
}
