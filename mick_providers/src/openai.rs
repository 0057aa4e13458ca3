use async_trait::async_trait;
use mick_core::{ChatMessage, CompletionConfig, CompletionError, LLMProvider, LLMResponse, Usage};
use reqwest::Client;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Chat-completion client for OpenAI and API-compatible services.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn new(api_key: String) -> Self {
        info!("Creating OpenAiProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request; a failure here is final.
    async fn try_send(&self, request: &Value) -> Result<LLMResponse, CompletionError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(CompletionError::transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(CompletionError::transport)?;

        if !status.is_success() {
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: api_error_message(&body)
                    .or_else(|| status.canonical_reason().map(str::to_string))
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let response: Value = serde_json::from_str(&body)
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| CompletionError::MalformedResponse("missing content".to_string()))?
            .to_string();

        let usage = response["usage"].as_object().map(|u| Usage {
            prompt_tokens: token_count(u, "prompt_tokens"),
            completion_tokens: token_count(u, "completion_tokens"),
            total_tokens: token_count(u, "total_tokens"),
        });

        Ok(LLMResponse { content, usage })
    }
}

/// Compatible servers often send a partial `usage`; absent counts are zero.
fn token_count(usage: &Map<String, Value>, key: &str) -> u32 {
    usage
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

/// Pull `error.message` out of an API error body, falling back to the raw
/// body text when it is not the usual JSON envelope.
fn api_error_message(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value["error"]["message"].as_str() {
            return Some(message.to_string());
        }
    }

    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[async_trait]
impl LLMProvider for OpenAiProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        config: &CompletionConfig,
    ) -> Result<LLMResponse, CompletionError> {
        let request = json!({
            "model": config.model,
            "messages": messages,
            "max_tokens": config.max_tokens,
            "temperature": config.temperature,
        });

        info!(
            "Sending request to completion API: model={}, messages={}",
            config.model,
            messages.len()
        );

        let response = self.try_send(&request).await?;

        if let Some(usage) = response.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }
        info!("Received response from completion API");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_from_json_envelope() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(
            api_error_message(body).as_deref(),
            Some("Incorrect API key provided")
        );
    }

    #[test]
    fn error_message_from_plain_body() {
        assert_eq!(
            api_error_message("  upstream timeout \n").as_deref(),
            Some("upstream timeout")
        );
        assert_eq!(api_error_message("   "), None);
    }

    #[test]
    fn missing_token_counts_are_zero() {
        let usage = json!({"total_tokens": 5});
        let usage = usage.as_object().cloned().unwrap_or_default();
        assert_eq!(token_count(&usage, "total_tokens"), 5);
        assert_eq!(token_count(&usage, "prompt_tokens"), 0);
        assert_eq!(token_count(&Map::new(), "completion_tokens"), 0);
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let provider =
            OpenAiProvider::new("key".to_string()).with_base_url("http://localhost:8080/v1/".into());
        assert_eq!(provider.base_url(), "http://localhost:8080/v1");
    }
}
