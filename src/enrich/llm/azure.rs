//! Azure OpenAI backend.
//!
//! Same chat-completions wire shape as OpenAI, addressed through a resource
//! endpoint + deployment name, authenticated with the `api-key` header and
//! an `api-version` query parameter.

use async_trait::async_trait;
use serde_json::Value;

use super::openai::{ChatResponse, chat_body, first_choice};
use super::{CompletionRequest, LlmClient, parse_structured};
use crate::config::LlmConfig;
use crate::error::{Result, ScrapeError};

const DEFAULT_API_VERSION: &str = "2024-08-01-preview";

/// Azure-hosted OpenAI deployment.
#[derive(Clone, Debug)]
pub struct AzureOpenAiClient {
    http: reqwest::Client,
    api_key: String,
    deployment: String,
    endpoint: String,
    api_version: String,
}

impl AzureOpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| ScrapeError::Config("azure provider requires an endpoint".into()))?;
        let deployment = config
            .deployment
            .clone()
            .ok_or_else(|| ScrapeError::Config("azure provider requires a deployment name".into()))?;

        Ok(Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            deployment,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version: config
                .api_version
                .clone()
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        })
    }
}

#[async_trait]
impl LlmClient for AzureOpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Value> {
        // Azure resolves the model from the deployment; the body's model
        // field is carried for parity and ignored by the service.
        let body = chat_body(&self.deployment, &request);

        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        );

        let response = self
            .http
            .post(url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScrapeError::Llm(format!("azure request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ScrapeError::Llm(format!(
                "azure returned {status}: {detail}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ScrapeError::Llm(format!("azure response unreadable: {e}")))?;
        parse_structured(&first_choice(parsed, "azure")?)
    }

    fn provider(&self) -> &'static str {
        "azure_openai"
    }
}
