//! OpenAI chat-completions backend.
//!
//! Uses `response_format: json_schema` with strict decoding when the request
//! carries a schema, so out-of-enumeration answers are rejected on the wire.
//! The wire types are shared with the Azure backend, which speaks the same
//! shape at a different endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CompletionRequest, LlmClient, parse_structured};
use crate::config::LlmConfig;
use crate::error::{Result, ScrapeError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
pub(crate) struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: &'static str,
    pub json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
pub(crate) struct JsonSchemaFormat {
    pub name: &'static str,
    pub strict: bool,
    pub schema: Value,
}

#[derive(Deserialize)]
pub(crate) struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Deserialize)]
pub(crate) struct ChatResponseMessage {
    pub content: String,
}

pub(crate) fn chat_body(model: &str, request: &CompletionRequest) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![ChatMessage {
            role: "user",
            content: request.prompt.clone(),
        }],
        temperature: request.temperature,
        max_completion_tokens: request.max_tokens,
        response_format: request.schema.clone().map(|schema| ResponseFormat {
            format_type: "json_schema",
            json_schema: JsonSchemaFormat {
                name: "structured_response",
                strict: true,
                schema,
            },
        }),
    }
}

pub(crate) fn first_choice(response: ChatResponse, provider: &str) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| ScrapeError::Llm(format!("{provider} returned no choices")))
}

/// OpenAI-hosted chat completions.
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
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
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Value> {
        let body = chat_body(&self.model, &request);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScrapeError::Llm(format!("openai request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ScrapeError::Llm(format!(
                "openai returned {status}: {detail}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ScrapeError::Llm(format!("openai response unreadable: {e}")))?;
        parse_structured(&first_choice(parsed, "openai")?)
    }

    fn provider(&self) -> &'static str {
        "openai"
    }
}
