use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::taxonomy::SpiritCategory;

/// Lookback windows used to bound the search query by publish date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeWindow {
    Week,
    Month,
    SixMonths,
}

impl TimeWindow {
    /// All windows, in ascending lookback order
    pub const ALL: [TimeWindow; 3] = [TimeWindow::Week, TimeWindow::Month, TimeWindow::SixMonths];

    /// Lookback duration for this window
    pub fn lookback(&self) -> Duration {
        match self {
            TimeWindow::Week => Duration::weeks(1),
            TimeWindow::Month => Duration::days(30),
            TimeWindow::SixMonths => Duration::days(180),
        }
    }

    /// Publish-date cutoff for a mining run started at `now`
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.lookback()
    }

    /// Human-readable label for display
    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::Week => "Last Week",
            TimeWindow::Month => "Last Month",
            TimeWindow::SixMonths => "Last 6 Months",
        }
    }

    /// Parse a window name as used on the command line
    pub fn parse(name: &str) -> Option<TimeWindow> {
        match name.to_lowercase().as_str() {
            "week" | "1w" => Some(TimeWindow::Week),
            "month" | "1m" => Some(TimeWindow::Month),
            "six-months" | "6m" => Some(TimeWindow::SixMonths),
            _ => None,
        }
    }
}

/// One mined video with its statistics and derived category.
///
/// The category is assigned once during mining and never changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Platform video id, globally unique per platform
    pub id: String,

    /// Video title
    pub title: String,

    /// Video description
    pub description: String,

    /// Channel that published the video
    pub channel: String,

    /// Publish timestamp
    pub published_at: DateTime<Utc>,

    /// View count, the sole ranking key within a window
    pub view_count: u64,

    /// Like count
    pub like_count: u64,

    /// Comment count
    pub comment_count: u64,

    /// Thumbnail URL
    pub thumbnail: String,

    /// Window this record was mined from
    pub window: TimeWindow,

    /// Derived spiritual-domain category
    pub category: SpiritCategory,
}

impl VideoRecord {
    /// Watch URL on the video platform
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

/// Ranked, deduplicated collection of mined video records.
///
/// Ordered by descending view count, ties broken by descending publish time
/// so equal-view records rank deterministically. Built fresh per mining
/// request; merges produce a new corpus rather than mutating in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus {
    records: Vec<VideoRecord>,
}

impl Corpus {
    /// Build a corpus from raw records: drop duplicate ids, apply ranking
    pub fn from_records(records: Vec<VideoRecord>) -> Self {
        let mut seen: HashMap<String, VideoRecord> = HashMap::new();
        for record in records {
            match seen.get(&record.id) {
                Some(existing) if existing.view_count >= record.view_count => {}
                _ => {
                    seen.insert(record.id.clone(), record);
                }
            }
        }
        let mut records: Vec<VideoRecord> = seen.into_values().collect();
        Self::rank(&mut records);
        Self { records }
    }

    /// Merge corpora from multiple windows into one deduplicated corpus.
    ///
    /// When the same id was mined in more than one window the occurrence
    /// with the maximum observed view count survives. The result contains
    /// each distinct id exactly once and is re-ranked by the standard rule.
    pub fn combine(corpora: &[Corpus]) -> Corpus {
        let all: Vec<VideoRecord> = corpora
            .iter()
            .flat_map(|c| c.records.iter().cloned())
            .collect();
        Self::from_records(all)
    }

    fn rank(records: &mut [VideoRecord]) {
        records.sort_by(|a, b| {
            b.view_count
                .cmp(&a.view_count)
                .then(b.published_at.cmp(&a.published_at))
                .then(a.id.cmp(&b.id))
        });
    }

    /// Ranked records, highest view count first
    pub fn records(&self) -> &[VideoRecord] {
        &self.records
    }

    /// The top `n` records by rank
    pub fn top(&self, n: usize) -> &[VideoRecord] {
        &self.records[..self.records.len().min(n)]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VideoRecord> {
        self.records.iter()
    }
}
