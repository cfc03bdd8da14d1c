//! CLI binary for web3-news-report.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig` / `ReportConfig`, runs the pipeline and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use web3_news_report::report::ReportSummary;
use web3_news_report::{
    process_articles, run_pipeline, Article, LlmProposalGenerator, Notification,
    NoopProgressCallback, PipelineConfig, PipelineProgressCallback, ProgressCallback,
    ProposalGenerator, ReportConfig, RssFeedSource, RunSummary, SmtpMailer, Stage,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One spinner per stage; feed and article events are printed above it.
struct CliProgressCallback {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    fn println(&self, line: String) {
        match self.bar.lock().unwrap().as_ref() {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix(stage.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        *self.bar.lock().unwrap() = Some(bar);
    }

    fn on_stage_complete(&self, stage: Stage, detail: &str) {
        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
        eprintln!("{} {}  {}", green("✔"), bold(&stage.to_string()), dim(detail));
    }

    fn on_feed_fetched(&self, source: &str, kept: usize) {
        self.println(format!("  {} {:<20} {}", green("✓"), source, dim(&format!("{kept} relevant"))));
    }

    fn on_feed_error(&self, source: &str, error: &str) {
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.println(format!("  {} {:<20} {}", red("✗"), source, red(&msg)));
    }

    fn on_article_enriched(&self, index: usize, total: usize, ok: bool) {
        if let Some(bar) = self.bar.lock().unwrap().as_ref() {
            bar.set_message(format!("{}/{}", index + 1, total));
        }
        if !ok {
            self.println(format!(
                "  {} Article {:>2}/{:<2}  {}",
                red("✗"),
                index + 1,
                total,
                dim("placeholder used")
            ));
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Fetch, enrich, render and email (all defaults)
  newsreport

  # Render only, to a fixed path
  newsreport --no-enrich --no-email -o digest.pdf

  # Render a saved article list
  newsreport --input articles.json --no-enrich --no-email

  # Use a specific model
  newsreport --provider anthropic --model claude-3-5-haiku-latest

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  ANTHROPIC_MODEL         Model used when only ANTHROPIC_API_KEY is set
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  EMAIL_HOST              SMTP server (required for email)
  EMAIL_PORT              SMTP port (default 587)
  EMAIL_USER              SMTP user and sender address (required for email)
  EMAIL_PASSWORD          SMTP password (required for email)
  EMAIL_USE_TLS           true = STARTTLS, false = implicit TLS (default true)
  EMAIL_RECIPIENTS        Comma-separated recipient list

  Variables are also read from a .env file in the working directory.
"#;

/// Build a PDF digest of blockchain-ecosystem news.
#[derive(Parser, Debug)]
#[command(
    name = "newsreport",
    version,
    about = "Build a PDF digest of blockchain-ecosystem news and email it",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Write the PDF to this path instead of a timestamped file.
    #[arg(short, long, env = "NEWSREPORT_OUTPUT")]
    output: Option<PathBuf>,

    /// File-name prefix for timestamped output.
    #[arg(long, env = "NEWSREPORT_PREFIX", default_value = web3_news_report::config::DEFAULT_OUTPUT_PREFIX)]
    prefix: String,

    /// Report title.
    #[arg(long, env = "NEWSREPORT_TITLE", default_value = web3_news_report::config::DEFAULT_TITLE)]
    title: String,

    /// Render articles from a JSON file instead of fetching feeds.
    #[arg(long, env = "NEWSREPORT_INPUT")]
    input: Option<PathBuf>,

    /// Keep feed summaries instead of generating research proposals.
    #[arg(long, env = "NEWSREPORT_NO_ENRICH")]
    no_enrich: bool,

    /// Do not email the report.
    #[arg(long, env = "NEWSREPORT_NO_EMAIL")]
    no_email: bool,

    /// Comma-separated recipients, overriding EMAIL_RECIPIENTS.
    #[arg(long, env = "NEWSREPORT_TO", value_delimiter = ',')]
    to: Vec<String>,

    /// LLM model ID.
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Entries considered per feed before relevance filtering.
    #[arg(long, env = "NEWSREPORT_MAX_ENTRIES", default_value_t = 3)]
    max_entries: usize,

    /// Retries per article on LLM failure.
    #[arg(long, env = "NEWSREPORT_MAX_RETRIES", default_value_t = 2)]
    max_retries: u32,

    /// Print the run summary as JSON on stdout.
    #[arg(long, env = "NEWSREPORT_JSON")]
    json: bool,

    /// Disable progress spinners.
    #[arg(long, env = "NEWSREPORT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "NEWSREPORT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "NEWSREPORT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let pipeline = PipelineConfig {
        max_entries_per_feed: cli.max_entries,
        enrich: !cli.no_enrich,
        model: cli.model.clone(),
        provider_name: cli.provider.clone(),
        max_retries: cli.max_retries,
        notify: !cli.no_email,
        ..PipelineConfig::default()
    };

    let mut report_builder = ReportConfig::builder()
        .title(&cli.title)
        .output_prefix(&cli.prefix);
    if let Some(ref path) = cli.output {
        report_builder = report_builder.output_path(path);
    }
    let report = report_builder.build().context("Invalid configuration")?;

    // ── Collaborators ────────────────────────────────────────────────────
    let generator = if pipeline.enrich {
        Some(
            LlmProposalGenerator::from_config(&pipeline)
                .context("Cannot generate proposals (use --no-enrich to skip)")?,
        )
    } else {
        None
    };

    let mailer = if pipeline.notify {
        Some(SmtpMailer::from_env().context("Cannot send email (use --no-email to skip)")?)
    } else {
        None
    };
    let recipients: Vec<String> = match (&mailer, cli.to.is_empty()) {
        (Some(m), true) => m.default_recipients().to_vec(),
        _ => cli.to.clone(),
    };
    if mailer.is_some() && recipients.is_empty() {
        anyhow::bail!("No recipients: set EMAIL_RECIPIENTS or pass --to");
    }
    let notification = mailer.as_ref().map(|m| Notification {
        mailer: m,
        recipients: &recipients,
    });

    let progress: ProgressCallback = if show_progress {
        CliProgressCallback::new() as ProgressCallback
    } else {
        Arc::new(NoopProgressCallback)
    };
    let generator = generator.as_ref().map(|g| g as &dyn ProposalGenerator);

    // ── Run ──────────────────────────────────────────────────────────────
    let summary = match cli.input {
        Some(ref path) => {
            let articles = read_articles(path).await?;
            process_articles(
                articles,
                generator,
                notification,
                &pipeline,
                &report,
                progress.as_ref(),
            )
            .await
        }
        None => {
            let feed = RssFeedSource::new(pipeline.http_timeout_secs)
                .context("Failed to build HTTP client")?;
            run_pipeline(
                &feed,
                generator,
                notification,
                &pipeline,
                &report,
                progress.as_ref(),
            )
            .await
        }
    }
    .context("Report generation failed")?;

    print_summary(&cli, &summary)
}

async fn read_articles(path: &Path) -> Result<Vec<Article>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read articles from {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid article JSON in {:?}", path))
}

fn print_summary(cli: &Cli, summary: &RunSummary) -> Result<()> {
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(summary).context("Failed to serialise summary")?
        );
        return Ok(());
    }
    if cli.quiet {
        return Ok(());
    }

    eprintln!(
        "{}  {}",
        green("✔"),
        bold(&summary.pdf_path.display().to_string())
    );
    eprint!("{}", ReportSummary::from_articles(&summary.articles));
    for err in &summary.article_errors {
        eprintln!("  {} {}", red("✗"), err);
    }
    match summary.email_sent {
        Some(true) => eprintln!("{} email sent", green("✔")),
        Some(false) => eprintln!("{} email failed; the PDF was kept", red("✘")),
        None => {}
    }
    Ok(())
}
