//! OpenAI chat-completions provider.
//!
//! API: https://platform.openai.com/docs/api-reference/chat

use crate::client::{ChatMessage, LlmClient, LlmRequest, LlmResponse, LlmUsage};
use newsdesk_core::{AppError, AppResult};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<LlmUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI LLM client.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client against the public OpenAI endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a client against an OpenAI-compatible endpoint.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn to_openai_request<'a>(&self, request: &'a LlmRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    fn convert_response(&self, response: ChatCompletionResponse) -> AppResult<LlmResponse> {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AppError::GenerationFailed("OpenAI response contained no choices".to_string())
            })?;

        Ok(LlmResponse {
            content,
            model: response.model,
            usage: response.usage.unwrap_or_default(),
        })
    }
}

/// Describe a failed status the way users care about it.
fn describe_status(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "authentication failed",
        StatusCode::TOO_MANY_REQUESTS => "rate limit exceeded",
        s if s.is_server_error() => "provider unavailable",
        _ => "request rejected",
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending chat request to OpenAI (model: {})", request.model);
        tracing::debug!("{} messages in request", request.messages.len());

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.to_openai_request(request))
            .send()
            .await
            .map_err(|e| {
                AppError::GenerationFailed(format!("Failed to send request to OpenAI: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("OpenAI returned {}: {}", status, error_text);
            return Err(AppError::GenerationFailed(format!(
                "OpenAI {} ({})",
                describe_status(status),
                status
            )));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::GenerationFailed(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let converted = self.convert_response(body)?;
        tracing::info!(
            "Received completion from OpenAI ({} tokens)",
            converted.usage.total_tokens
        );

        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let client = OpenAiClient::new("sk-test");
        let request = LlmRequest::new(
            vec![
                ChatMessage::system("rules"),
                ChatMessage::system("articles"),
                ChatMessage::user("question"),
            ],
            "gpt-3.5-turbo",
        )
        .with_temperature(0.7)
        .with_max_tokens(2000);

        let body = serde_json::to_value(client.to_openai_request(&request)).unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);
        assert_eq!(body["messages"][2]["role"], "user");
    }

    #[test]
    fn test_convert_response_takes_first_choice() {
        let client = OpenAiClient::new("sk-test");
        let raw: ChatCompletionResponse = serde_json::from_str(
            r#"{
                "model": "gpt-3.5-turbo-0125",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "answer"}}],
                "usage": {"prompt_tokens": 900, "completion_tokens": 100, "total_tokens": 1000}
            }"#,
        )
        .unwrap();

        let response = client.convert_response(raw).unwrap();
        assert_eq!(response.content, "answer");
        assert_eq!(response.usage.total_tokens, 1000);
    }

    #[test]
    fn test_convert_response_without_choices_fails() {
        let client = OpenAiClient::new("sk-test");
        let raw: ChatCompletionResponse =
            serde_json::from_str(r#"{"model": "gpt-3.5-turbo", "choices": []}"#).unwrap();

        assert!(matches!(
            client.convert_response(raw),
            Err(AppError::GenerationFailed(_))
        ));
    }

    #[test]
    fn test_describe_status() {
        assert_eq!(
            describe_status(StatusCode::UNAUTHORIZED),
            "authentication failed"
        );
        assert_eq!(
            describe_status(StatusCode::TOO_MANY_REQUESTS),
            "rate limit exceeded"
        );
        assert_eq!(
            describe_status(StatusCode::BAD_GATEWAY),
            "provider unavailable"
        );
    }
}
