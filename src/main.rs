use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use yt_sentiment_analyzer::report;
use yt_sentiment_analyzer::{
    Analyzer, ClassifierConfig, ClassifierProvider, Config, OutputFormat, RunPolicy, SentimentFilter, Session,
};

#[derive(Parser)]
#[command(name = "yt-sentiment")]
#[command(version)]
#[command(about = "Classify the sentiment of YouTube video comments")]
struct Cli {
    /// YouTube video URL to analyze (repeatable; results accumulate in one session)
    #[arg(short, long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// Read video URLs from stdin, one analysis per line
    #[arg(short, long)]
    interactive: bool,

    /// YouTube Data API key
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Sentiment filter for the comment listing: none, positive or negative
    #[arg(short, long, value_name = "FILTER")]
    filter: Option<String>,

    /// Classifier provider: huggingface, lmstudio, openai, gemini or lexicon
    #[arg(long, value_name = "PROVIDER")]
    classifier: Option<String>,

    /// API key or token for the classifier provider
    #[arg(long, value_name = "KEY")]
    classifier_key: Option<String>,

    /// Drop earlier results before each new video instead of appending
    #[arg(long)]
    reset_per_video: bool,

    /// Output format
    #[arg(long, value_parser = ["text", "json"])]
    format: Option<String>,

    /// Configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(key) = &cli.api_key {
        config.youtube.api_key = Some(key.clone());
    }

    if let Some(provider) = &cli.classifier {
        let provider: ClassifierProvider = provider.parse()?;
        if provider != config.classifier.provider {
            config.classifier.model = ClassifierConfig::default_model(provider).to_string();
        }
        config.classifier.provider = provider;
    }

    if let Some(key) = &cli.classifier_key {
        config.classifier.api_key = Some(key.clone());
    }

    if cli.reset_per_video {
        config.session.run_policy = RunPolicy::ResetPerVideo;
    }

    match cli.format.as_deref() {
        Some("json") => config.output.format = OutputFormat::JSON,
        Some("text") => config.output.format = OutputFormat::Text,
        _ => {}
    }

    Ok(())
}

fn init_logging(level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { level };
    let directive = format!("yt_sentiment_analyzer={level},yt_sentiment={level},warn");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)))
        .with_writer(std::io::stderr)
        .init();
}

/// Analyze one URL and print the report; returns whether it succeeded
async fn run_one(
    analyzer: &Analyzer,
    session: &mut Session,
    url: &str,
    filter: SentimentFilter,
    config: &Config,
) -> bool {
    match analyzer.analyze(url, session, filter).await {
        Ok(analysis) => {
            match report::render(&analysis, config.output.format, config.output.max_comment_chars) {
                Ok(rendered) => println!("{}", rendered),
                Err(e) => error!("Failed to render report: {}", e),
            }
            true
        }
        Err(e) => {
            error!("❌ {}", e);
            false
        }
    }
}

async fn run_interactive(
    analyzer: &Analyzer,
    session: &mut Session,
    mut filter: SentimentFilter,
    config: &Config,
) -> Result<()> {
    info!("⌨️ Interactive mode: paste a video URL, or :filter <none|positive|negative>, :summary, :reset, :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line.split_once(' ').unwrap_or((line, "")) {
            ("", _) => continue,
            (":quit", _) | (":q", _) => break,
            (":reset", _) => session.reset(),
            (":filter", value) => match value.parse::<SentimentFilter>() {
                Ok(f) => {
                    filter = f;
                    info!("🔎 Filter set to {}", filter);
                }
                Err(e) => warn!("{}", e),
            },
            (":summary", _) => {
                let summary = session.aggregate(filter).summary;
                println!(
                    "Total Comments: {}\nPositive Comments: {} ({:.2}%)\nNegative Comments: {} ({:.2}%)",
                    summary.total, summary.positive, summary.positive_percent, summary.negative, summary.negative_percent
                );
            }
            _ => {
                run_one(analyzer, session, line, filter, config).await;
            }
        }
    }

    info!("👋 Session ended with {} classified comments", session.len());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    apply_overrides(&mut config, &cli)?;

    init_logging(&config.output.log_level, cli.verbose);
    debug!("{}", config.summary());

    config.validate()?;

    if cli.urls.is_empty() && !cli.interactive {
        return Err(anyhow!("Nothing to analyze: pass --url <URL> or --interactive"));
    }

    let filter = match &cli.filter {
        Some(value) => value.parse::<SentimentFilter>()?,
        None => config.session.default_filter,
    };

    let analyzer = Analyzer::from_config(&config).await?;
    let mut session = Session::new(config.session.run_policy);

    let mut succeeded = 0;
    for url in &cli.urls {
        if run_one(&analyzer, &mut session, url, filter, &config).await {
            succeeded += 1;
        }
    }

    if cli.interactive {
        return run_interactive(&analyzer, &mut session, filter, &config).await;
    }

    if succeeded == 0 {
        return Err(anyhow!("No video could be analyzed"));
    }

    info!("🎉 Analyzed {}/{} videos", succeeded, cli.urls.len());
    Ok(())
}
