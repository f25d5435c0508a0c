use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{Llm, LlmResponse};
use crate::config::{LlmConfig, LlmProvider};
use crate::error::{AnalyzerError, Result};

fn generation_failed(detail: String) -> AnalyzerError {
    AnalyzerError::GenerationFailed {
        source: anyhow::anyhow!(detail),
    }
}

/// Gemini provider implementation
pub struct GeminiProvider {
    config: LlmConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiUsage {
    #[serde(rename = "totalTokenCount")]
    total_token_count: u32,
}

impl GeminiProvider {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl Llm for GeminiProvider {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(AnalyzerError::MissingCredential("GEMINI_API_KEY"))?;

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            },
        };

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.config.model, api_key
        );

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzerError::GenerationFailed { source: e.into() })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(generation_failed(format!("Gemini API error {}: {}", status, text)));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::GenerationFailed { source: e.into() })?;

        let content = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| generation_failed("No candidates in Gemini response".to_string()))?;

        let tokens_used = gemini_response.usage_metadata.map(|u| u.total_token_count);

        Ok(LlmResponse {
            content,
            tokens_used,
        })
    }

    async fn is_available(&self) -> bool {
        if let Some(api_key) = &self.config.api_key {
            let url = format!(
                "https://generativelanguage.googleapis.com/v1beta/models?key={}",
                api_key
            );

            match self.client.get(&url).send().await {
                Ok(response) => response.status().is_success(),
                Err(_) => false,
            }
        } else {
            false
        }
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::Gemini
    }
}

/// OpenAI provider implementation
pub struct OpenAiProvider {
    config: LlmConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    total_tokens: u32,
}

impl OpenAiProvider {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl Llm for OpenAiProvider {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(AnalyzerError::MissingCredential("OPENAI_API_KEY"))?;

        let request = OpenAiRequest {
            model: self.config.model.clone(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending request to OpenAI API");

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzerError::GenerationFailed { source: e.into() })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(generation_failed(format!("OpenAI API error {}: {}", status, text)));
        }

        let openai_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::GenerationFailed { source: e.into() })?;

        let content = openai_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| generation_failed("No choices in OpenAI response".to_string()))?;

        let tokens_used = openai_response.usage.map(|u| u.total_tokens);

        Ok(LlmResponse {
            content,
            tokens_used,
        })
    }

    async fn is_available(&self) -> bool {
        if let Some(api_key) = &self.config.api_key {
            match self
                .client
                .get("https://api.openai.com/v1/models")
                .header("Authorization", format!("Bearer {}", api_key))
                .send()
                .await
            {
                Ok(response) => response.status().is_success(),
                Err(_) => false,
            }
        } else {
            false
        }
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::OpenAi
    }
}

/// Canned backend used by tests and offline runs
pub struct MockLlmProvider {
    pub response: String,
}

#[async_trait]
impl Llm for MockLlmProvider {
    async fn complete(&self, _prompt: &str) -> Result<LlmResponse> {
        Ok(LlmResponse {
            content: self.response.clone(),
            tokens_used: Some(10),
        })
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::Gemini
    }
}
