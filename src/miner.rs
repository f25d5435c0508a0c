use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::SearchConfig;
use crate::corpus::{Corpus, TimeWindow, VideoRecord};
use crate::error::Result;
use crate::taxonomy::categorize;
use crate::youtube::VideoSearch;

/// Mines one ranked corpus per time window from the video platform.
///
/// A window mine is all-or-nothing: quota or authentication failures
/// surface as errors with no partial corpus, so corpora held from other
/// windows stay intact and usable.
pub struct WindowMiner {
    search: Arc<dyn VideoSearch>,
    query: String,
    max_results: u32,
}

impl WindowMiner {
    pub fn new(search: Arc<dyn VideoSearch>, config: &SearchConfig) -> Self {
        Self {
            search,
            query: config.query.clone(),
            max_results: config.max_results.clamp(1, crate::config::MAX_RESULTS_CAP),
        }
    }

    /// Mine the given window: search, fetch statistics, categorize, rank
    pub async fn mine(&self, window: TimeWindow) -> Result<Corpus> {
        info!("🔍 Mining {} videos for '{}'", window.label(), self.query);

        let cutoff = window.cutoff(Utc::now());
        let hits = self.search.search(&self.query, cutoff, self.max_results).await?;

        let ids: Vec<String> = hits.iter().map(|hit| hit.id.clone()).collect();
        let stats = self.search.statistics(&ids).await?;

        let records: Vec<VideoRecord> = hits
            .into_iter()
            .map(|hit| {
                let stat = stats.get(&hit.id).cloned().unwrap_or_default();
                let category = categorize(&hit.title, &hit.description);
                VideoRecord {
                    id: hit.id,
                    title: hit.title,
                    description: hit.description,
                    channel: hit.channel,
                    published_at: hit.published_at,
                    view_count: stat.view_count,
                    like_count: stat.like_count,
                    comment_count: stat.comment_count,
                    thumbnail: hit.thumbnail,
                    window,
                    category,
                }
            })
            .collect();

        let corpus = Corpus::from_records(records);
        info!("✅ Mined {} videos for {}", corpus.len(), window.label());
        Ok(corpus)
    }

    /// Mine several windows concurrently.
    ///
    /// The mines are independent: each returns its own result and one
    /// window's failure never aborts the others.
    pub async fn mine_all(&self, windows: &[TimeWindow]) -> Vec<(TimeWindow, Result<Corpus>)> {
        let futures = windows.iter().map(|&window| async move {
            let result = self.mine(window).await;
            if let Err(ref e) = result {
                warn!("Mining {} failed: {}", window.label(), e);
            }
            (window, result)
        });

        join_all(futures).await
    }
}
