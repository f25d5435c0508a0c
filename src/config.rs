use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AnalyzerError, Result};

/// Hard cap on results per window, keeps external quota spend bounded
pub const MAX_RESULTS_CAP: u32 = 50;

/// Configuration for the spirituality trend analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Video search settings
    pub search: SearchConfig,

    /// Generative backend settings
    pub llm: LlmConfig,

    /// Philosophical context and prompt assembly settings
    pub context: ContextConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search keyword phrase sent to the video platform
    pub query: String,

    /// Maximum videos per time window (clamped to 1..=50)
    pub max_results: u32,

    /// API key for the video search service
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Retries for transient search failures
    pub max_retries: u32,
}

/// Generative backend providers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LlmProvider {
    Gemini,
    OpenAi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider to use
    pub provider: LlmProvider,

    /// API key for the provider
    pub api_key: Option<String>,

    /// Model to use
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Number of lecture themes to request per generation
    pub theme_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Optional HTML or plain-text file overriding the built-in
    /// philosophical context
    pub philosophy_file: Option<PathBuf>,

    /// Records included in the trend digest of the prompt
    pub digest_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig {
                query: "spirituality philosophy meaning of life".to_string(),
                max_results: 20,
                api_key: None,
                timeout_seconds: 30,
                max_retries: 2,
            },
            llm: LlmConfig {
                provider: LlmProvider::Gemini,
                api_key: None,
                model: "gemini-pro".to_string(),
                max_tokens: 4096,
                temperature: 0.7,
                timeout_seconds: 120,
                theme_count: 5,
            },
            context: ContextConfig {
                philosophy_file: None,
                digest_limit: 15,
            },
        }
    }
}

impl Config {
    /// Load configuration: first TOML file found, then environment
    /// overrides on top
    pub fn load() -> Result<Self> {
        let config_paths = [
            "theme-tracker.toml",
            "config/theme-tracker.toml",
            "~/.config/theme-tracker/config.toml",
            "/etc/theme-tracker/config.toml",
        ];

        let mut config = Self::default();
        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(parsed) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        config = parsed;
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        config.apply_env();
        Ok(config)
    }

    /// Overlay environment variables onto this configuration.
    ///
    /// Credentials are opaque strings; presence is checked at the point
    /// of use, never their contents.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("YOUTUBE_API_KEY") {
            self.search.api_key = Some(key);
        }
        match self.llm.provider {
            LlmProvider::Gemini => {
                if let Ok(key) = std::env::var("GEMINI_API_KEY") {
                    self.llm.api_key = Some(key);
                }
            }
            LlmProvider::OpenAi => {
                if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                    self.llm.api_key = Some(key);
                }
            }
        }
        if let Ok(query) = std::env::var("THEME_TRACKER_QUERY") {
            self.search.query = query;
        }
        if let Ok(max) = std::env::var("THEME_TRACKER_MAX_RESULTS") {
            if let Ok(max) = max.parse() {
                self.search.max_results = max;
            }
        }
        if let Ok(model) = std::env::var("THEME_TRACKER_MODEL") {
            self.llm.model = model;
        }
    }

    /// Validate configuration bounds
    pub fn validate(&self) -> Result<()> {
        if self.search.query.trim().is_empty() {
            return Err(AnalyzerError::Configuration(
                "search query must not be empty".to_string(),
            ));
        }

        if self.search.max_results == 0 || self.search.max_results > MAX_RESULTS_CAP {
            return Err(AnalyzerError::Configuration(format!(
                "max_results must be in 1..={}",
                MAX_RESULTS_CAP
            )));
        }

        if self.llm.theme_count == 0 {
            return Err(AnalyzerError::Configuration(
                "theme_count must be greater than 0".to_string(),
            ));
        }

        if self.context.digest_limit == 0 {
            return Err(AnalyzerError::Configuration(
                "digest_limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_query(mut self, query: String) -> Self {
        self.config.search.query = query;
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.config.search.max_results = max_results;
        self
    }

    pub fn with_search_api_key(mut self, api_key: String) -> Self {
        self.config.search.api_key = Some(api_key);
        self
    }

    pub fn with_llm_provider(mut self, provider: LlmProvider) -> Self {
        self.config.llm.provider = provider;
        self
    }

    pub fn with_llm_api_key(mut self, api_key: String) -> Self {
        self.config.llm.api_key = Some(api_key);
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.config.llm.model = model;
        self
    }

    pub fn with_theme_count(mut self, theme_count: u32) -> Self {
        self.config.llm.theme_count = theme_count;
        self
    }

    pub fn with_philosophy_file(mut self, path: PathBuf) -> Self {
        self.config.context.philosophy_file = Some(path);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
