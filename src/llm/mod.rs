pub mod providers;

use async_trait::async_trait;

use crate::config::{LlmConfig, LlmProvider};
use crate::error::Result;

/// Response from the generative backend
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub tokens_used: Option<u32>,
}

/// Trait for generative-language backends.
///
/// One synchronous request/response exchange; no streaming. Transport and
/// auth failures are surfaced to the caller, which decides about retrying.
#[async_trait]
pub trait Llm: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse>;
    async fn is_available(&self) -> bool;
    fn provider(&self) -> LlmProvider;
}

/// Create a backend instance based on configuration.
///
/// A missing API key is not an error here: credential presence is checked
/// at request time so mining-only sessions work without a backend key.
pub fn create_llm(config: &LlmConfig) -> Result<Box<dyn Llm>> {
    match config.provider {
        LlmProvider::Gemini => Ok(Box::new(providers::GeminiProvider::new(config.clone())?)),
        LlmProvider::OpenAi => Ok(Box::new(providers::OpenAiProvider::new(config.clone())?)),
    }
}
