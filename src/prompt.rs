//! Context-document assembly for theme generation

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::config::ContextConfig;
use crate::corpus::Corpus;
use crate::error::{AnalyzerError, Result};

/// Characters of philosophical context included in a prompt, at most.
/// Keeps the request under the backend's token limits.
const PHILOSOPHY_CHAR_LIMIT: usize = 10_000;

/// Target age brackets for lecture themes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AgeCohort {
    From20To30,
    From30To40,
    From40To50,
    From50To60,
    Over60,
}

impl AgeCohort {
    pub const ALL: [AgeCohort; 5] = [
        AgeCohort::From20To30,
        AgeCohort::From30To40,
        AgeCohort::From40To50,
        AgeCohort::From50To60,
        AgeCohort::Over60,
    ];

    /// Bracket label as shown to users and to the backend
    pub fn label(&self) -> &'static str {
        match self {
            AgeCohort::From20To30 => "20-30",
            AgeCohort::From30To40 => "30-40",
            AgeCohort::From40To50 => "40-50",
            AgeCohort::From50To60 => "50-60",
            AgeCohort::Over60 => "60+",
        }
    }

    /// Life-stage concerns used verbatim in prompt assembly
    pub fn descriptor(&self) -> &'static str {
        match self {
            AgeCohort::From20To30 => {
                "digital natives, social media focused, seeking authenticity, \
                 concerned about climate crisis, mental health aware"
            }
            AgeCohort::From30To40 => {
                "career-focused, starting families, balancing work-life, \
                 health conscious, pragmatic spirituality"
            }
            AgeCohort::From40To50 => {
                "mid-life reflection, established careers, parenting teens, \
                 seeking deeper meaning, stress management"
            }
            AgeCohort::From50To60 => {
                "empty nest transitions, career peak or change, caring for \
                 aging parents, legacy considerations"
            }
            AgeCohort::Over60 => {
                "retirement planning/living, health challenges, grandparenting, \
                 mortality awareness, wisdom sharing"
            }
        }
    }

    /// Parse a cohort as given on the command line
    pub fn parse(name: &str) -> Option<AgeCohort> {
        match name {
            "20-30" => Some(AgeCohort::From20To30),
            "30-40" => Some(AgeCohort::From30To40),
            "40-50" => Some(AgeCohort::From40To50),
            "50-60" => Some(AgeCohort::From50To60),
            "60+" | "60" => Some(AgeCohort::Over60),
            _ => None,
        }
    }
}

/// Fixed interpretive framework of the philosophical school.
///
/// Loaded once at startup and never mutated. The default is the compiled-in
/// text below; a configured file overrides it, with HTML documents reduced
/// to their visible text first.
#[derive(Debug, Clone)]
pub struct PhilosophyContext {
    text: String,
}

impl PhilosophyContext {
    /// Load the context per configuration, falling back to the built-in
    /// text when no file is configured or the file cannot be read
    pub async fn load(config: &ContextConfig) -> Self {
        match &config.philosophy_file {
            Some(path) => match Self::from_file(path).await {
                Ok(context) => {
                    info!("📚 Loaded philosophical context from: {}", path.display());
                    context
                }
                Err(e) => {
                    warn!("Failed to load philosophy file, using built-in context: {}", e);
                    Self::built_in()
                }
            },
            None => Self::built_in(),
        }
    }

    /// Built-in context text
    pub fn built_in() -> Self {
        Self {
            text: DEFAULT_PHILOSOPHY.trim().to_string(),
        }
    }

    /// An empty context; the builder then emits the trend-only prompt
    pub fn empty() -> Self {
        Self { text: String::new() }
    }

    async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AnalyzerError::Configuration(format!("{}: {}", path.display(), e)))?;

        let text = if looks_like_html(path, &content) {
            extract_html_text(&content)
        } else {
            content.trim().to_string()
        };

        Ok(Self { text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

fn looks_like_html(path: &Path, content: &str) -> bool {
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false);

    by_extension || content.trim_start().starts_with('<')
}

/// Reduce an HTML document to its visible paragraph text, one block per
/// line, whitespace collapsed
fn extract_html_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("p, h1, h2, h3, h4, h5, h6, li").expect("static selector is valid");

    let mut blocks = Vec::new();
    for element in document.select(&selector) {
        let text: Vec<&str> = element.text().collect();
        let joined = text.join(" ");
        let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() {
            blocks.push(collapsed);
        }
    }

    blocks.join("\n")
}

/// Structured context sent to the generative backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextDocument {
    prompt: String,
    cohort: AgeCohort,
}

impl ContextDocument {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn cohort(&self) -> AgeCohort {
        self.cohort
    }
}

/// Deterministic assembly of corpus digest, philosophical context and
/// cohort descriptor into one context document.
///
/// No network and no randomness: the same corpus and cohort always produce
/// byte-identical output.
pub struct ThemeRequestBuilder {
    philosophy: PhilosophyContext,
    digest_limit: usize,
    theme_count: u32,
}

impl ThemeRequestBuilder {
    pub fn new(philosophy: PhilosophyContext, digest_limit: usize, theme_count: u32) -> Self {
        Self {
            philosophy,
            digest_limit,
            theme_count,
        }
    }

    /// Assemble the context document for one generation request.
    ///
    /// Fails with `EmptyCorpus` when there is nothing to summarize.
    pub fn build(&self, corpus: &Corpus, cohort: AgeCohort) -> Result<ContextDocument> {
        if corpus.is_empty() {
            return Err(AnalyzerError::EmptyCorpus);
        }

        let digest: Vec<String> = corpus
            .top(self.digest_limit)
            .iter()
            .map(|record| format!("- {} ({})", record.title, record.category.label()))
            .collect();
        let digest = digest.join("\n");

        let philosophy = truncate_chars(self.philosophy.text(), PHILOSOPHY_CHAR_LIMIT);

        let prompt = if philosophy.is_empty() {
            format!(
                "As a spiritual content creator, analyze these trending video titles \
                 related to spirituality:\n\n\
                 {digest}\n\n\
                 Based on these trends, suggest {count} compelling lecture themes that \
                 would resonate specifically with people aged {cohort} years.\n\
                 Consider that this age group typically has these characteristics: {traits}.\n\n\
                 For each theme:\n\
                 1. Provide a catchy title\n\
                 2. Write a short description (2-3 sentences)\n\
                 3. Explain why this theme would resonate with this specific age group\n\n\
                 Format your response as a numbered list with the title in bold, \
                 followed by the description and reasoning.",
                digest = digest,
                count = self.theme_count,
                cohort = cohort.label(),
                traits = cohort.descriptor(),
            )
        } else {
            format!(
                "As a spiritual content creator for a philosophical school of thought, \
                 analyze these trending video titles related to spirituality:\n\n\
                 {digest}\n\n\
                 The philosophical school has the following context, which should guide \
                 your suggestions:\n\
                 ----\n\
                 {philosophy}\n\
                 ----\n\n\
                 Based on these trends and the philosophical context, suggest {count} \
                 compelling lecture themes that would resonate specifically with people \
                 aged {cohort} years.\n\
                 Consider that this age group typically has these characteristics: {traits}.\n\n\
                 Make sure your suggested themes align with the philosophical approach \
                 described in the context.\n\n\
                 For each theme:\n\
                 1. Provide a catchy title that reflects both current trends and the \
                 philosophical approach\n\
                 2. Write a short description (2-3 sentences)\n\
                 3. Explain why this theme would resonate with this specific age group\n\
                 4. Briefly note how it connects to the philosophical context\n\n\
                 Format your response as a numbered list with the title in bold, \
                 followed by the description and reasoning.",
                digest = digest,
                philosophy = philosophy,
                count = self.theme_count,
                cohort = cohort.label(),
                traits = cohort.descriptor(),
            )
        };

        Ok(ContextDocument { prompt, cohort })
    }
}

/// Truncate on a character boundary, appending an ellipsis when cut
fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let truncated: String = text.chars().take(limit).collect();
    format!("{}...", truncated)
}

/// The Lectorium Rosicrucianum framing the original lecture series is
/// grounded in, as published by the school
const DEFAULT_PHILOSOPHY: &str = "\
Rosacruz Áurea | LECTORIUM ROSICRUCIANUM
A Rosacruz Áurea é uma Escola iniciática contemporânea, dedicada à transformação da \
consciência e da vida do ser humano atual.
Fundada na Holanda há aproximadamente 100 anos, está presente em todos os continentes \
e em mais de 60 países.
A fonte do conhecimento da Rosacruz Áurea é a própria Sabedoria Universal, manifestada \
em todos os tempos, culturas e povos.
A Rosacruz Áurea dirige-se ao ser humano buscador, oferecendo-lhe elementos para que \
ele encontre em si mesmo suas respostas e as converta em seu próprio caminho de \
transformação. Estes elementos também se encontram em seu símbolo: ponto central, \
triângulo, quadrado e círculo. Juntos, eles representam em todos os níveis \
macrocósmico, cósmico ou microcósmico um símbolo universal da criação divina.
O mundo enfrenta uma crise de liderança, reflexo da falência de uma consciência \
incapaz de responder aos desafios atuais. O modelo de vida baseado no egocentrismo se \
esgotou. No entanto, a transformação ainda é possível - e começa dentro de cada um. A \
verdadeira transformação começa no mundo interior, onde reside a essência mais \
profunda do ser.
O que é a Jornada do Herói senão uma busca interior pela libertação do egocentrismo, \
guiada pela Singularidade do Espírito que está no mais interior do ser humano? Como \
transcender o ego, conectar-se à essência divina e transformar a consciência e a vida?";
