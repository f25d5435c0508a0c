//! Theme generation and response parsing.
//!
//! The backend is asked for a numbered list, one theme per item, with the
//! title in bold followed by description and reasoning. That convention is
//! the parsing contract here: a new block starts at a line matching
//! `^\s*\d+[.)]`, the title is the bold span (or the head of the first line
//! up to a `:` separator), and everything else in the block becomes the
//! rationale. Blocks that yield no title or no rationale are dropped
//! instead of failing the whole response.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AnalyzerError, Result};
use crate::llm::Llm;
use crate::prompt::{AgeCohort, ContextDocument};

/// One generated lecture theme, tied to the cohort it was generated for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeSuggestion {
    /// Short lecture title
    pub title: String,

    /// Rationale paragraph linking the theme to the mined trends
    pub rationale: String,

    /// Target age cohort
    pub cohort: AgeCohort,
}

/// Sends an assembled context document to the generative backend and
/// parses the free-form response into discrete suggestions.
///
/// No automatic retry: generation is not idempotent-cheap, so retrying is
/// left to the caller.
pub struct ThemeGenerator {
    llm: Box<dyn Llm>,
}

impl ThemeGenerator {
    pub fn new(llm: Box<dyn Llm>) -> Self {
        Self { llm }
    }

    /// Run one generation request to completion.
    ///
    /// Backend failures surface as `GenerationFailed` with the cause
    /// attached; a response with zero parseable themes fails with
    /// `NoThemesGenerated`.
    pub async fn generate(&self, document: &ContextDocument) -> Result<Vec<ThemeSuggestion>> {
        debug!("Sending generation request ({} chars of context)", document.prompt().len());

        let response = self.llm.complete(document.prompt()).await?;
        debug!("Generation completed (tokens: {:?})", response.tokens_used);

        let themes = parse_theme_response(&response.content, document.cohort());
        if themes.is_empty() {
            return Err(AnalyzerError::NoThemesGenerated);
        }

        info!("✅ Generated {} lecture themes for ages {}", themes.len(), document.cohort().label());
        Ok(themes)
    }
}

/// Parse a backend response into theme suggestions, best-effort.
///
/// Each numbered block is an independent parse attempt; malformed blocks
/// are skipped silently, which is the only place this crate swallows an
/// error.
pub fn parse_theme_response(response: &str, cohort: AgeCohort) -> Vec<ThemeSuggestion> {
    let item_start = Regex::new(r"^\s*\d+[.)]\s*(.*)$").expect("static pattern is valid");

    let mut blocks: Vec<Vec<String>> = Vec::new();
    for line in response.lines() {
        if let Some(caps) = item_start.captures(line) {
            blocks.push(vec![caps[1].to_string()]);
        } else if let Some(current) = blocks.last_mut() {
            current.push(line.to_string());
        }
        // lines before the first numbered item are preamble, ignored
    }

    blocks
        .into_iter()
        .filter_map(|block| parse_block(&block, cohort))
        .collect()
}

fn parse_block(lines: &[String], cohort: AgeCohort) -> Option<ThemeSuggestion> {
    let head = lines.first()?.trim();

    let bold = Regex::new(r"\*\*(.+?)\*\*").expect("static pattern is valid");
    let (title, head_rest) = if let Some(caps) = bold.captures(head) {
        let span = caps.get(0)?;
        let rest = head[span.end()..]
            .trim_start_matches(|c: char| matches!(c, ':' | '-' | '–' | '—') || c.is_whitespace())
            .to_string();
        (caps[1].trim().to_string(), rest)
    } else if let Some((title, rest)) = head.split_once(':') {
        (title.trim().to_string(), rest.trim().to_string())
    } else {
        (head.to_string(), String::new())
    };

    let mut rationale_parts = Vec::new();
    if !head_rest.is_empty() {
        rationale_parts.push(head_rest);
    }
    for line in &lines[1..] {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            rationale_parts.push(trimmed.to_string());
        }
    }

    let rationale = rationale_parts.join(" ");
    if title.is_empty() || rationale.is_empty() {
        return None;
    }

    Some(ThemeSuggestion {
        title,
        rationale,
        cohort,
    })
}
