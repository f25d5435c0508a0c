use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::config::Config;
use crate::corpus::{Corpus, TimeWindow};
use crate::error::{AnalyzerError, Result};
use crate::llm::{create_llm, Llm};
use crate::miner::WindowMiner;
use crate::prompt::{AgeCohort, PhilosophyContext, ThemeRequestBuilder};
use crate::themes::{ThemeGenerator, ThemeSuggestion};
use crate::youtube::{VideoSearch, YouTubeClient};

/// Which corpus a generation request draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSelector {
    Window(TimeWindow),
    Combined,
}

impl SourceSelector {
    pub fn label(&self) -> &'static str {
        match self {
            SourceSelector::Window(window) => window.label(),
            SourceSelector::Combined => "Combined (All Time Periods)",
        }
    }

    /// Parse a selector name as used on the command line
    pub fn parse(name: &str) -> Option<SourceSelector> {
        if name.eq_ignore_ascii_case("combined") {
            return Some(SourceSelector::Combined);
        }
        TimeWindow::parse(name).map(SourceSelector::Window)
    }
}

/// Session facade over the mining and generation pipeline.
///
/// Holds the corpora mined during this session in memory only; nothing is
/// persisted. All methods take `&self`, so one analyzer can be shared
/// across tasks.
pub struct TrendAnalyzer {
    miner: WindowMiner,
    builder: ThemeRequestBuilder,
    generator: ThemeGenerator,
    corpora: RwLock<HashMap<TimeWindow, Corpus>>,
    // single-flight guard: at most one generation request per session,
    // a second caller fails fast with GenerationInProgress
    generation_guard: Mutex<()>,
}

impl TrendAnalyzer {
    /// Build an analyzer against the real external services
    pub async fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let search: Arc<dyn VideoSearch> = Arc::new(YouTubeClient::new(&config.search)?);
        let llm = create_llm(&config.llm)?;
        let philosophy = PhilosophyContext::load(&config.context).await;

        Ok(Self::with_services(config, search, llm, philosophy))
    }

    /// Build an analyzer with injected services
    pub fn with_services(
        config: &Config,
        search: Arc<dyn VideoSearch>,
        llm: Box<dyn Llm>,
        philosophy: PhilosophyContext,
    ) -> Self {
        Self {
            miner: WindowMiner::new(search, &config.search),
            builder: ThemeRequestBuilder::new(
                philosophy,
                config.context.digest_limit,
                config.llm.theme_count,
            ),
            generator: ThemeGenerator::new(llm),
            corpora: RwLock::new(HashMap::new()),
            generation_guard: Mutex::new(()),
        }
    }

    /// Mine one window and keep its corpus for the session
    pub async fn mine_window(&self, window: TimeWindow) -> Result<Corpus> {
        let corpus = self.miner.mine(window).await?;
        self.corpora.write().await.insert(window, corpus.clone());
        Ok(corpus)
    }

    /// Mine several windows concurrently, keeping every successful corpus.
    ///
    /// Returns the per-window outcomes so the caller can report which
    /// windows failed.
    pub async fn mine_all(&self, windows: &[TimeWindow]) -> Vec<(TimeWindow, Result<Corpus>)> {
        let results = self.miner.mine_all(windows).await;

        let mut store = self.corpora.write().await;
        for (window, result) in &results {
            if let Ok(corpus) = result {
                store.insert(*window, corpus.clone());
            }
        }
        drop(store);

        let succeeded = results.iter().filter(|(_, r)| r.is_ok()).count();
        info!("Mined {}/{} windows", succeeded, results.len());
        results
    }

    /// Resolve a source selector against the corpora held by this session
    pub async fn corpus(&self, selector: SourceSelector) -> Result<Corpus> {
        let store = self.corpora.read().await;
        match selector {
            SourceSelector::Window(window) => {
                store.get(&window).cloned().ok_or(AnalyzerError::EmptyCorpus)
            }
            SourceSelector::Combined => {
                let corpora: Vec<Corpus> = store.values().cloned().collect();
                if corpora.is_empty() {
                    return Err(AnalyzerError::EmptyCorpus);
                }
                Ok(Corpus::combine(&corpora))
            }
        }
    }

    /// Generate lecture themes for a cohort from the selected corpus.
    ///
    /// At most one request is in flight per session; a concurrent call
    /// fails with `GenerationInProgress` rather than queueing, so no
    /// quota is spent redundantly.
    pub async fn generate_themes(
        &self,
        selector: SourceSelector,
        cohort: AgeCohort,
    ) -> Result<Vec<ThemeSuggestion>> {
        let _guard = self
            .generation_guard
            .try_lock()
            .map_err(|_| AnalyzerError::GenerationInProgress)?;

        let corpus = self.corpus(selector).await?;
        info!(
            "Generating themes from {} ({} videos) for ages {}",
            selector.label(),
            corpus.len(),
            cohort.label()
        );

        let document = self.builder.build(&corpus, cohort)?;
        self.generator.generate(&document).await
    }
}
