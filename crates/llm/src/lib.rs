//! LLM integration crate for askdocs.
//!
//! Provides a provider-agnostic abstraction for text-completion services.
//! The retrieval orchestrator only ever sees the [`LlmClient`] trait; the
//! concrete provider is chosen at startup via the factory.
//!
//! # Providers
//! - **Ollama**: local LLM runtime (default)
//! - **OpenAI**: chat completions API
//! - **Mock**: scripted replies for tests
//!
//! # Example
//! ```no_run
//! use askdocs_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{MockLlmClient, OllamaClient, OpenAiClient};
