//! LLM integration crate for Newsdesk.
//!
//! Provider-agnostic chat completion behind the [`LlmClient`] trait.
//!
//! # Providers
//! - **OpenAI**: chat completions (default)
//! - **Ollama**: local chat endpoint
//!
//! # Example
//! ```no_run
//! use newsdesk_llm::{ChatMessage, LlmClient, LlmRequest, OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new("sk-...");
//! let request = LlmRequest::new(vec![ChatMessage::user("Hello")], "gpt-3.5-turbo");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{ChatMessage, ChatRole, LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
pub use types::ProviderType;
