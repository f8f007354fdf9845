use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::Engine;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use tamis::classifier::amqp::AmqpBroker;
use tamis::classifier::{ClassifierClient, FanOut, ImageClassifier};
use tamis::config::Config;
use tamis::pipeline::{ModerationPipeline, Submission};
use tamis::profanity::{PatternCompiler, ProfanityScanner};

/// Tamis: content moderation gate for marketplace submissions.
///
/// Screens free text for obfuscated abusive language and images for
/// explicit content before they are stored.
#[derive(Parser)]
#[command(name = "tamis", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show configuration and check that the word lists compile
    Status,

    /// Scan one or more texts for abusive content
    CheckText {
        /// Texts to scan
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Classify one or more image files with the remote classifier
    CheckImage {
        /// Image files to classify
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Run the full moderation pipeline over one submission
    Moderate {
        /// Text field as name=value (repeatable)
        #[arg(long = "text", value_parser = parse_named)]
        texts: Vec<(String, String)>,

        /// Image as name=path (repeatable)
        #[arg(long = "image", value_parser = parse_named)]
        images: Vec<(String, String)>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tamis=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            let config = Config::load()?;

            println!("{}", "=== Tamis status ===".bold());
            println!("Broker:        {}", redact_url(&config.amqp_url));
            println!("Work queue:    {}", config.validation_queue);
            println!("Reply timeout: {}s", config.reply_timeout.as_secs());
            println!("Setup timeout: {}s", config.setup_timeout.as_secs());
            match config.max_in_flight {
                Some(n) => println!("Max in flight: {n}"),
                None => println!("Max in flight: unbounded"),
            }

            for path in config.word_list_paths() {
                let state = if path.is_file() {
                    "found".green()
                } else {
                    "missing".red()
                };
                println!("Word list:     {} ({})", path.display(), state);
            }

            config.require_word_lists()?;
            let scanner = build_scanner(&config)?;
            println!(
                "Matcher:       {} words compiled",
                scanner.matcher().word_count()
            );
        }

        Commands::CheckText { texts } => {
            let config = Config::load()?;
            config.require_word_lists()?;
            let scanner = build_scanner(&config)?;

            let hits = scanner.scan_each(&texts);
            tamis::output::terminal::display_text_results(&texts, &hits);

            if hits.iter().any(|h| *h) {
                std::process::exit(1);
            }
        }

        Commands::CheckImage { paths } => {
            let config = Config::load()?;
            config.require_broker()?;

            let images = paths
                .iter()
                .map(|p| encode_image_file(p))
                .collect::<Result<Vec<_>>>()?;
            let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();

            let fanout = build_fanout(&config);

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("  {spinner} {msg}")
                    .context("invalid spinner template")?,
            );
            spinner.set_message(format!("Classifying {} image(s)...", images.len()));
            spinner.enable_steady_tick(Duration::from_millis(100));

            let outcomes = fanout.validate_many(&images).await;
            spinner.finish_and_clear();

            tamis::output::terminal::display_image_outcomes(&names, &outcomes);

            let all_safe = outcomes
                .iter()
                .all(|o| o.as_ref().is_ok_and(|r| r.is_safe));
            if !all_safe {
                std::process::exit(1);
            }
        }

        Commands::Moderate { texts, images } => {
            let config = Config::load()?;
            config.require_word_lists()?;
            if !images.is_empty() {
                config.require_broker()?;
            }

            let scanner = build_scanner(&config)?;
            let pipeline = ModerationPipeline::with_fanout(scanner, build_fanout(&config));

            let mut submission = Submission::default();
            for (name, value) in texts {
                submission = submission.with_text(name, value);
            }
            for (name, path) in images {
                let encoded = encode_image_file(Path::new(&path))?;
                submission = submission.with_image(name, encoded);
            }

            let verdict = pipeline.moderate(&submission).await?;
            tamis::output::terminal::display_verdict(&verdict);

            if !verdict.is_accepted() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Load both word lists and compile the matcher. Fails if either list is unreadable.
fn build_scanner(config: &Config) -> Result<ProfanityScanner> {
    let compiler = PatternCompiler::with_size_limit(config.pattern_size_limit);
    let matcher = compiler
        .compile_files(&config.word_list_paths())
        .context("Failed to build the profanity matcher")?;
    info!(words = matcher.word_count(), "Profanity matcher ready");
    Ok(ProfanityScanner::new(matcher))
}

fn build_fanout(config: &Config) -> FanOut {
    let broker = Arc::new(AmqpBroker::new(config.amqp_url.clone()));
    let client: Arc<dyn ImageClassifier> = Arc::new(
        ClassifierClient::new(broker)
            .with_work_queue(config.validation_queue.clone())
            .with_reply_timeout(config.reply_timeout)
            .with_setup_timeout(config.setup_timeout),
    );

    let fanout = FanOut::new(client);
    match config.max_in_flight {
        Some(n) => fanout.with_max_in_flight(n),
        None => fanout,
    }
}

/// Read an image file and base64-encode it for the classifier.
fn encode_image_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

/// Parse a `name=value` argument.
fn parse_named(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got {raw:?}")),
    }
}

/// Hide the password part of a broker URL for display.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let creds = &url[scheme_end + 3..at];
            let user = creds.split(':').next().unwrap_or_default();
            format!("{}{}:***{}", &url[..scheme_end + 3], user, &url[at..])
        }
        _ => url.to_string(),
    }
}
