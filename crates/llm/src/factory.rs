//! LLM provider factory.
//!
//! Builds the long-lived LLM client handle from configuration. The handle is
//! created once at startup and shared by reference afterwards.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use newsdesk_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key, required by OpenAI
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// secret is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    match provider_type {
        ProviderType::Ollama => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            Ok(Arc::new(OllamaClient::with_base_url(base_url)))
        }
        ProviderType::OpenAI => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI provider requires API key".to_string())
            })?;
            let client = match endpoint {
                Some(base_url) => OpenAiClient::with_base_url(base_url, api_key),
                None => OpenAiClient::new(api_key),
            };
            Ok(Arc::new(client))
        }
    }
}
