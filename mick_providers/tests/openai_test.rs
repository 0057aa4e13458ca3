//! HTTP-level tests for `OpenAiProvider` against a mock completion server.

use mick_core::{ChatMessage, CompletionConfig, CompletionError, LLMProvider};
use mick_providers::OpenAiProvider;
use mockito::Matcher;
use serde_json::json;

fn provider_for(server: &mockito::ServerGuard) -> OpenAiProvider {
    OpenAiProvider::new("test-key".to_string()).with_base_url(server.url())
}

fn history() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("You're a helpful assistant"),
        ChatMessage::user("hello"),
    ]
}

#[tokio::test]
async fn sends_full_history_and_sampling_parameters() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-3.5-turbo",
            "max_tokens": 500,
            "messages": [
                {"role": "system", "content": "You're a helpful assistant"},
                {"role": "user", "content": "hello"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hi there!"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#,
        )
        .create_async()
        .await;

    let provider = provider_for(&server);
    let response = provider
        .chat(&history(), &CompletionConfig::default())
        .await;

    mock.assert_async().await;
    let response = response.unwrap_or_else(|e| panic!("completion failed: {e}"));
    assert_eq!(response.content, "Hi there!");
    let usage = response.usage.unwrap_or_else(|| panic!("usage missing"));
    assert_eq!(usage.total_tokens, 15);
}

#[tokio::test]
async fn partial_or_absent_usage_is_tolerated() {
    let mut server = mockito::Server::new_async().await;
    let _partial = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({"model": "partial"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"content":"hi"}}],"usage":{"total_tokens":5}}"#)
        .create_async()
        .await;
    let _absent = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({"model": "absent"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"content":"hey"}}]}"#)
        .create_async()
        .await;

    let provider = provider_for(&server);

    let partial = CompletionConfig {
        model: "partial".to_string(),
        ..CompletionConfig::default()
    };
    let response = provider
        .chat(&history(), &partial)
        .await
        .unwrap_or_else(|e| panic!("completion failed: {e}"));
    assert_eq!(response.content, "hi");
    let usage = response.usage.unwrap_or_else(|| panic!("usage missing"));
    assert_eq!(usage.total_tokens, 5);
    assert_eq!(usage.prompt_tokens, 0);
    assert_eq!(usage.completion_tokens, 0);

    let absent = CompletionConfig {
        model: "absent".to_string(),
        ..CompletionConfig::default()
    };
    let response = provider
        .chat(&history(), &absent)
        .await
        .unwrap_or_else(|e| panic!("completion failed: {e}"));
    assert_eq!(response.content, "hey");
    assert!(response.usage.is_none());
}

#[tokio::test]
async fn api_error_carries_status_and_message() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#)
        .create_async()
        .await;

    let provider = provider_for(&server);
    let err = provider
        .chat(&history(), &CompletionConfig::default())
        .await
        .err()
        .unwrap_or_else(|| panic!("expected an error"));

    assert!(matches!(err, CompletionError::Api { status: 401, .. }));
    assert_eq!(err.to_string(), "HTTP 401: Incorrect API key provided");
}

#[tokio::test]
async fn missing_content_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;

    let provider = provider_for(&server);
    let err = provider
        .chat(&history(), &CompletionConfig::default())
        .await
        .err()
        .unwrap_or_else(|| panic!("expected an error"));

    assert!(matches!(err, CompletionError::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let provider =
        OpenAiProvider::new("test-key".to_string()).with_base_url("http://127.0.0.1:9".to_string());
    let err = provider
        .chat(&history(), &CompletionConfig::default())
        .await
        .err()
        .unwrap_or_else(|| panic!("expected an error"));

    assert!(matches!(err, CompletionError::Transport(_)));
}
