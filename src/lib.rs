//! Spirituality trend mining and lecture theme generation.
//!
//! Mines trending spirituality videos from YouTube across three lookback
//! windows, classifies each into a spiritual-domain category, and asks a
//! generative backend for age-targeted lecture themes grounded in a fixed
//! philosophical context.

pub mod config;
pub mod corpus;
pub mod error;
pub mod llm;
pub mod miner;
pub mod prompt;
pub mod session;
pub mod taxonomy;
pub mod themes;
pub mod youtube;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder, LlmConfig, LlmProvider, SearchConfig};
pub use crate::corpus::{Corpus, TimeWindow, VideoRecord};
pub use crate::error::{AnalyzerError, Result};
pub use crate::llm::{create_llm, Llm, LlmResponse};
pub use crate::miner::WindowMiner;
pub use crate::prompt::{AgeCohort, ContextDocument, PhilosophyContext, ThemeRequestBuilder};
pub use crate::session::{SourceSelector, TrendAnalyzer};
pub use crate::taxonomy::{categorize, SpiritCategory};
pub use crate::themes::{ThemeGenerator, ThemeSuggestion};
pub use crate::youtube::{SearchHit, VideoSearch, VideoStatistics, YouTubeClient};
