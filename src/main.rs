use anyhow::Result;
use clap::{Arg, Command};
use tracing::{info, warn};

use theme_tracker::config::Config;
use theme_tracker::corpus::TimeWindow;
use theme_tracker::prompt::AgeCohort;
use theme_tracker::session::{SourceSelector, TrendAnalyzer};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "theme_tracker=info,warn".into()),
        )
        .init();

    let matches = Command::new("Spirituality Trend Analyzer")
        .version("0.1.0")
        .about("Mines trending spirituality videos and generates age-targeted lecture themes")
        .arg(
            Arg::new("window")
                .short('w')
                .long("window")
                .value_name("WINDOW")
                .help("Window to mine: week, month, six-months or all")
                .default_value("all"),
        )
        .arg(
            Arg::new("query")
                .short('q')
                .long("query")
                .value_name("QUERY")
                .help("Search query override"),
        )
        .arg(
            Arg::new("max-results")
                .short('n')
                .long("max-results")
                .value_name("NUM")
                .help("Maximum videos per window (1-50)"),
        )
        .arg(
            Arg::new("cohort")
                .short('c')
                .long("cohort")
                .value_name("AGES")
                .help("Generate themes for this age cohort: 20-30, 30-40, 40-50, 50-60 or 60+"),
        )
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("SOURCE")
                .help("Corpus for theme generation: week, month, six-months or combined")
                .default_value("combined"),
        )
        .arg(
            Arg::new("top")
                .long("top")
                .value_name("NUM")
                .help("Ranked videos to print per corpus")
                .default_value("10"),
        )
        .get_matches();

    let mut config = Config::load()?;
    if let Some(query) = matches.get_one::<String>("query") {
        config.search.query = query.clone();
    }
    if let Some(max) = matches.get_one::<String>("max-results") {
        config.search.max_results = max.parse()?;
    }
    config.validate()?;

    let windows = match matches.get_one::<String>("window").map(String::as_str) {
        Some("all") | None => TimeWindow::ALL.to_vec(),
        Some(name) => {
            let window = TimeWindow::parse(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown window: {}", name))?;
            vec![window]
        }
    };

    let top: usize = matches.get_one::<String>("top").unwrap().parse()?;

    info!("🚀 Spirituality trend analyzer starting");
    info!("🔍 Query: '{}'", config.search.query);

    let analyzer = TrendAnalyzer::new(&config).await?;

    let results = analyzer.mine_all(&windows).await;
    let mut mined_any = false;
    for (window, result) in &results {
        match result {
            Ok(corpus) => {
                mined_any = true;
                println!("\n=== {} ({} videos) ===", window.label(), corpus.len());
                for (rank, record) in corpus.top(top).iter().enumerate() {
                    println!("{:>2}. {} [{}]", rank + 1, record.title, record.category.label());
                    println!(
                        "    {} views | {} | {}",
                        record.view_count,
                        record.channel,
                        record.watch_url()
                    );
                }
            }
            Err(e) => {
                warn!("❌ {} failed: {}", window.label(), e);
            }
        }
    }

    if !mined_any {
        anyhow::bail!("No window could be mined");
    }

    if let Some(cohort_name) = matches.get_one::<String>("cohort") {
        let cohort = AgeCohort::parse(cohort_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown cohort: {}", cohort_name))?;
        let source_name = matches.get_one::<String>("source").unwrap();
        let selector = SourceSelector::parse(source_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown source: {}", source_name))?;

        let themes = analyzer.generate_themes(selector, cohort).await?;

        println!("\n=== Lecture themes for ages {} ({}) ===", cohort.label(), selector.label());
        for (number, theme) in themes.iter().enumerate() {
            println!("\n{}. {}", number + 1, theme.title);
            println!("   {}", theme.rationale);
        }
    }

    Ok(())
}
