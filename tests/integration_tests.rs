use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;

use theme_tracker::config::ConfigBuilder;
use theme_tracker::corpus::TimeWindow;
use theme_tracker::error::{AnalyzerError, Result};
use theme_tracker::llm::{Llm, LlmResponse};
use theme_tracker::prompt::{AgeCohort, PhilosophyContext};
use theme_tracker::session::{SourceSelector, TrendAnalyzer};
use theme_tracker::taxonomy::SpiritCategory;
use theme_tracker::youtube::{SearchHit, VideoSearch, VideoStatistics};
use theme_tracker::{Config, LlmProvider};

/// Canned per-window behavior for the search seam
enum WindowScenario {
    /// (id, title, view count) triples returned for the window
    Hits(Vec<(&'static str, &'static str, u64)>),
    Quota,
}

struct ScriptedSearch {
    scenarios: HashMap<TimeWindow, WindowScenario>,
    views: HashMap<String, u64>,
}

impl ScriptedSearch {
    fn new(scenarios: Vec<(TimeWindow, WindowScenario)>) -> Self {
        let mut views = HashMap::new();
        for (_, scenario) in &scenarios {
            if let WindowScenario::Hits(hits) = scenario {
                for (id, _, count) in hits {
                    views.insert(id.to_string(), *count);
                }
            }
        }
        Self {
            scenarios: scenarios.into_iter().collect(),
            views,
        }
    }

    /// Recover the window from the publish-date cutoff the miner sends
    fn window_for(published_after: DateTime<Utc>) -> TimeWindow {
        let days = (Utc::now() - published_after).num_days();
        if days >= 100 {
            TimeWindow::SixMonths
        } else if days >= 20 {
            TimeWindow::Month
        } else {
            TimeWindow::Week
        }
    }
}

#[async_trait]
impl VideoSearch for ScriptedSearch {
    async fn search(
        &self,
        _query: &str,
        published_after: DateTime<Utc>,
        _max_results: u32,
    ) -> Result<Vec<SearchHit>> {
        let window = Self::window_for(published_after);
        match self.scenarios.get(&window) {
            Some(WindowScenario::Hits(hits)) => Ok(hits
                .iter()
                .enumerate()
                .map(|(position, (id, title, _))| SearchHit {
                    id: id.to_string(),
                    title: title.to_string(),
                    description: String::new(),
                    channel: "Seeker Channel".to_string(),
                    published_at: published_after + Duration::hours(position as i64 + 1),
                    thumbnail: format!("https://i.ytimg.com/vi/{}/hq.jpg", id),
                })
                .collect()),
            Some(WindowScenario::Quota) => {
                Err(AnalyzerError::QuotaExceeded("quotaExceeded".to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    async fn statistics(&self, ids: &[String]) -> Result<HashMap<String, VideoStatistics>> {
        Ok(ids
            .iter()
            .map(|id| {
                (
                    id.clone(),
                    VideoStatistics {
                        view_count: self.views.get(id).copied().unwrap_or(0),
                        like_count: 1,
                        comment_count: 1,
                    },
                )
            })
            .collect())
    }
}

struct CannedLlm {
    response: &'static str,
}

#[async_trait]
impl Llm for CannedLlm {
    async fn complete(&self, _prompt: &str) -> Result<LlmResponse> {
        Ok(LlmResponse {
            content: self.response.to_string(),
            tokens_used: Some(42),
        })
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::Gemini
    }
}

/// Backend that blocks until released, for overlapping-request tests
struct BlockingLlm {
    release: Arc<Notify>,
}

#[async_trait]
impl Llm for BlockingLlm {
    async fn complete(&self, _prompt: &str) -> Result<LlmResponse> {
        self.release.notified().await;
        Ok(LlmResponse {
            content: "1. **Patience**: waiting has its own reward.".to_string(),
            tokens_used: None,
        })
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::Gemini
    }
}

fn test_config() -> Config {
    ConfigBuilder::new()
        .with_search_api_key("test-key".to_string())
        .with_llm_api_key("test-key".to_string())
        .build()
}

fn analyzer_with(
    scenarios: Vec<(TimeWindow, WindowScenario)>,
    llm: Box<dyn Llm>,
) -> TrendAnalyzer {
    TrendAnalyzer::with_services(
        &test_config(),
        Arc::new(ScriptedSearch::new(scenarios)),
        llm,
        PhilosophyContext::built_in(),
    )
}

const THEMES_RESPONSE: &str = "\
1. **The Inner Compass**: Practical direction for a noisy world.
   Speaks to the search for authenticity visible in the trends.
2. **Stillness as Strength**: Meditation beyond the app store.
   Builds on the meditation content dominating the corpus.
3. **Science Meets the Soul**: What quantum talk is really asking.
   Links curiosity-driven viewing with the school's teaching.
";

#[tokio::test]
async fn test_mine_and_combine_across_windows() {
    let analyzer = analyzer_with(
        vec![
            (
                TimeWindow::Week,
                WindowScenario::Hits(vec![
                    ("w1", "Guided meditation for sleep", 900),
                    ("w2", "Zen stories explained", 800),
                    ("w3", "Quantum consciousness debate", 700),
                    ("shared1", "Yoga nidra session", 600),
                    ("shared2", "Near death experiences", 500),
                ]),
            ),
            (
                TimeWindow::Month,
                WindowScenario::Hits(vec![
                    ("shared1", "Yoga nidra session", 650),
                    ("shared2", "Near death experiences", 500),
                    ("m1", "The Bhagavad Gita in one hour", 400),
                    ("m2", "Christian mysticism revival", 300),
                    ("m3", "What is mindfulness really", 200),
                ]),
            ),
        ],
        Box::new(CannedLlm {
            response: THEMES_RESPONSE,
        }),
    );

    let results = analyzer
        .mine_all(&[TimeWindow::Week, TimeWindow::Month])
        .await;
    assert!(results.iter().all(|(_, r)| r.is_ok()));

    let combined = analyzer.corpus(SourceSelector::Combined).await.unwrap();
    assert_eq!(combined.len(), 8);

    // Max observed view count survives for an id mined in both windows
    let shared = combined.iter().find(|r| r.id == "shared1").unwrap();
    assert_eq!(shared.view_count, 650);

    // Ranked by descending views
    let views: Vec<u64> = combined.iter().map(|r| r.view_count).collect();
    let mut sorted = views.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(views, sorted);
}

#[tokio::test]
async fn test_quota_failure_is_isolated_per_window() {
    let analyzer = analyzer_with(
        vec![
            (
                TimeWindow::Week,
                WindowScenario::Hits(vec![("w1", "Morning meditation", 100)]),
            ),
            (
                TimeWindow::Month,
                WindowScenario::Hits(vec![("m1", "Taoism for beginners", 200)]),
            ),
            (TimeWindow::SixMonths, WindowScenario::Quota),
        ],
        Box::new(CannedLlm {
            response: THEMES_RESPONSE,
        }),
    );

    let results = analyzer.mine_all(&TimeWindow::ALL).await;

    let failed: Vec<TimeWindow> = results
        .iter()
        .filter(|(_, r)| r.is_err())
        .map(|(w, _)| *w)
        .collect();
    assert_eq!(failed, vec![TimeWindow::SixMonths]);
    assert!(matches!(
        results
            .iter()
            .find(|(w, _)| *w == TimeWindow::SixMonths)
            .map(|(_, r)| r),
        Some(Err(AnalyzerError::QuotaExceeded(_)))
    ));

    // The successful windows still combine
    let combined = analyzer.corpus(SourceSelector::Combined).await.unwrap();
    assert_eq!(combined.len(), 2);
}

#[tokio::test]
async fn test_mined_records_are_categorized() {
    let analyzer = analyzer_with(
        vec![(
            TimeWindow::Week,
            WindowScenario::Hits(vec![
                ("a", "Guided meditation for sleep", 300),
                ("b", "Quantum physics and reality", 200),
                ("c", "Street food tour", 100),
            ]),
        )],
        Box::new(CannedLlm {
            response: THEMES_RESPONSE,
        }),
    );

    let corpus = analyzer.mine_window(TimeWindow::Week).await.unwrap();

    let by_id: HashMap<&str, SpiritCategory> =
        corpus.iter().map(|r| (r.id.as_str(), r.category)).collect();
    assert_eq!(by_id["a"], SpiritCategory::MeditationMindfulness);
    assert_eq!(by_id["b"], SpiritCategory::ScienceAndSpirituality);
    assert_eq!(by_id["c"], SpiritCategory::General);
}

#[tokio::test]
async fn test_generate_themes_end_to_end() {
    let analyzer = analyzer_with(
        vec![(
            TimeWindow::Week,
            WindowScenario::Hits(vec![("a", "Guided meditation for sleep", 300)]),
        )],
        Box::new(CannedLlm {
            response: THEMES_RESPONSE,
        }),
    );

    analyzer.mine_window(TimeWindow::Week).await.unwrap();
    let themes = analyzer
        .generate_themes(SourceSelector::Window(TimeWindow::Week), AgeCohort::From30To40)
        .await
        .unwrap();

    assert_eq!(themes.len(), 3);
    assert_eq!(themes[0].title, "The Inner Compass");
    assert!(themes.iter().all(|t| t.cohort == AgeCohort::From30To40));
}

#[tokio::test]
async fn test_generate_without_corpus_is_empty_corpus() {
    let analyzer = analyzer_with(
        Vec::new(),
        Box::new(CannedLlm {
            response: THEMES_RESPONSE,
        }),
    );

    let result = analyzer
        .generate_themes(SourceSelector::Combined, AgeCohort::Over60)
        .await;
    assert!(matches!(result, Err(AnalyzerError::EmptyCorpus)));
}

#[tokio::test]
async fn test_unparseable_response_is_no_themes_generated() {
    let analyzer = analyzer_with(
        vec![(
            TimeWindow::Week,
            WindowScenario::Hits(vec![("a", "Guided meditation for sleep", 300)]),
        )],
        Box::new(CannedLlm { response: "" }),
    );

    analyzer.mine_window(TimeWindow::Week).await.unwrap();
    let result = analyzer
        .generate_themes(SourceSelector::Window(TimeWindow::Week), AgeCohort::From20To30)
        .await;
    assert!(matches!(result, Err(AnalyzerError::NoThemesGenerated)));
}

#[tokio::test]
async fn test_second_generation_request_is_rejected() {
    let release = Arc::new(Notify::new());
    let analyzer = Arc::new(analyzer_with(
        vec![(
            TimeWindow::Week,
            WindowScenario::Hits(vec![("a", "Guided meditation for sleep", 300)]),
        )],
        Box::new(BlockingLlm {
            release: release.clone(),
        }),
    ));

    analyzer.mine_window(TimeWindow::Week).await.unwrap();

    let background = analyzer.clone();
    let first = tokio::spawn(async move {
        background
            .generate_themes(SourceSelector::Window(TimeWindow::Week), AgeCohort::From20To30)
            .await
    });

    // Let the first request reach the backend and hold the guard
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let second = analyzer
        .generate_themes(SourceSelector::Window(TimeWindow::Week), AgeCohort::From20To30)
        .await;
    assert!(matches!(second, Err(AnalyzerError::GenerationInProgress)));

    release.notify_one();
    let themes = first.await.unwrap().unwrap();
    assert_eq!(themes.len(), 1);
}
