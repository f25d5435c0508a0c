//! Error taxonomy for the trend mining and theme generation pipeline

/// Result type for analyzer operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Error types for analyzer operations
#[derive(thiserror::Error, Debug)]
pub enum AnalyzerError {
    #[error("Missing credential: {0} is not set in the environment")]
    MissingCredential(&'static str),

    #[error("Authentication rejected by the video search service: {0}")]
    Authentication(String),

    #[error("Video search quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Mining failed after retries: {0}")]
    MiningFailed(String),

    #[error("Corpus is empty, nothing to summarize")]
    EmptyCorpus,

    #[error("Theme generation failed: {source}")]
    GenerationFailed {
        #[source]
        source: anyhow::Error,
    },

    #[error("Generation backend returned no parseable themes")]
    NoThemesGenerated,

    #[error("A theme generation request is already in flight for this session")]
    GenerationInProgress,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalyzerError {
    /// Whether the failure is transient and worth retrying
    pub fn is_transient(&self) -> bool {
        match self {
            AnalyzerError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            AnalyzerError::MiningFailed(_) => true,
            _ => false,
        }
    }
}
