//! HTTP-level tests for the three LLM backends against a local mock server.

use mockito::Matcher;
use serde_json::json;

use sitescribe::{CompletionRequest, LlmConfig, LlmProvider, build_client};

fn classification_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {"section_type": {"type": "string", "enum": ["fees", "other"]}},
        "required": ["section_type"],
        "additionalProperties": false
    })
}

#[tokio::test]
async fn openai_client_sends_schema_and_parses_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o",
            "temperature": 0.0,
            "response_format": {"type": "json_schema"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{"message": {"content": "{\"section_type\": \"fees\"}"}}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let config = LlmConfig::new(LlmProvider::OpenAi, "test-key", "gpt-4o")
        .with_endpoint(server.url());
    let client = build_client(&config).expect("client");

    let value = client
        .complete(CompletionRequest::new("classify").with_schema(classification_schema()))
        .await
        .expect("completion");

    assert_eq!(value["section_type"], "fees");
    mock.assert_async().await;
}

#[tokio::test]
async fn anthropic_client_parses_message_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "test-key")
        .match_header("anthropic-version", "2023-06-01")
        .match_body(Matcher::PartialJson(json!({
            "model": "claude-sonnet-4-5",
            "temperature": 0.0
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "content": [{"type": "text", "text": "{\"section_type\": \"other\"}"}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let config = LlmConfig::new(LlmProvider::Anthropic, "test-key", "claude-sonnet-4-5")
        .with_endpoint(server.url());
    let client = build_client(&config).expect("client");

    let value = client
        .complete(CompletionRequest::new("classify").with_schema(classification_schema()))
        .await
        .expect("completion");

    assert_eq!(value["section_type"], "other");
    mock.assert_async().await;
}

#[tokio::test]
async fn azure_client_addresses_the_deployment() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/openai/deployments/my-deployment/chat/completions")
        .match_query(Matcher::UrlEncoded(
            "api-version".into(),
            "2024-06-01".into(),
        ))
        .match_header("api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{"message": {"content": "```json\n{\"section_type\": \"fees\"}\n```"}}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let config = LlmConfig::new(LlmProvider::AzureOpenAi, "test-key", "gpt-4o")
        .with_endpoint(server.url())
        .with_deployment("my-deployment")
        .with_api_version("2024-06-01");
    let client = build_client(&config).expect("client");

    // Fenced JSON still parses at the boundary.
    let value = client
        .complete(CompletionRequest::new("classify"))
        .await
        .expect("completion");

    assert_eq!(value["section_type"], "fees");
    mock.assert_async().await;
}

#[tokio::test]
async fn azure_without_endpoint_is_a_config_error() {
    let config = LlmConfig::new(LlmProvider::AzureOpenAi, "test-key", "gpt-4o");
    let err = build_client(&config).unwrap_err();
    assert!(err.to_string().contains("endpoint"));
}

#[tokio::test]
async fn server_errors_surface_as_llm_errors() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let config = LlmConfig::new(LlmProvider::OpenAi, "test-key", "gpt-4o")
        .with_endpoint(server.url());
    let client = build_client(&config).expect("client");

    let err = client
        .complete(CompletionRequest::new("classify"))
        .await
        .unwrap_err();
    assert!(matches!(err, sitescribe::ScrapeError::Llm(_)));
}

#[tokio::test]
async fn prose_responses_are_rejected_not_invented() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{"message": {"content": "This section is probably about fees."}}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let config = LlmConfig::new(LlmProvider::OpenAi, "test-key", "gpt-4o")
        .with_endpoint(server.url());
    let client = build_client(&config).expect("client");

    let err = client
        .complete(CompletionRequest::new("classify"))
        .await
        .unwrap_err();
    assert!(matches!(err, sitescribe::ScrapeError::Llm(_)));
}
