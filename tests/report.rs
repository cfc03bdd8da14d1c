//! Integration tests for the report pipeline.
//!
//! Every network collaborator is replaced by an in-process fake, so these
//! run offline and write only into temp directories.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use web3_news_report::config::FeedSpec;
use web3_news_report::pipeline::enrich::ProposalFailure;
use web3_news_report::{
    generate_report_to_file, process_articles, run_pipeline, Article, ArticleError, FeedSource,
    Mailer, NoopProgressCallback, Notification, PipelineConfig, PipelineProgressCallback,
    ProposalGenerator, RawEntry, ReportConfig, ReportError, Stage,
};

// ── Fakes ────────────────────────────────────────────────────────────────────

struct StaticFeed;

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch(&self, source_name: &str, _url: &str) -> Result<Vec<RawEntry>, ReportError> {
        match source_name {
            "ethereum_blog" => Ok(vec![
                RawEntry {
                    title: Some("Dencun mainnet announcement".into()),
                    summary: Some("<p>Proto-danksharding brings <b>blobs</b> to Ethereum.</p>".into()),
                    link: Some("https://blog.ethereum.org/dencun".into()),
                    published: Some("Wed, 13 Mar 2024 13:55:35 GMT".into()),
                    updated: None,
                },
                RawEntry {
                    title: Some("Devcon tickets".into()),
                    summary: Some("Tickets on sale next week.".into()),
                    ..Default::default()
                },
            ]),
            "arbitrum_medium" => Ok(vec![RawEntry {
                title: Some("Stylus update".into()),
                summary: Some("New tooling for the Arbitrum rollup.".into()),
                link: Some("https://medium.com/offchainlabs/stylus".into()),
                published: None,
                updated: Some("2024-02-01".into()),
            }]),
            _ => Err(ReportError::FeedFetchFailed {
                source_name: source_name.into(),
                url: "https://example.invalid/feed".into(),
                reason: "connection refused".into(),
            }),
        }
    }
}

/// Returns a structured proposal unless the summary mentions Arbitrum.
struct FakeGenerator;

#[async_trait]
impl ProposalGenerator for FakeGenerator {
    async fn propose(&self, summary: &str) -> Result<String, ProposalFailure> {
        if summary.contains("Arbitrum") {
            return Err(ProposalFailure {
                retries: 2,
                detail: "503 Service Unavailable".into(),
            });
        }
        Ok(format!(
            "# Executive Summary\n\nStudy of: {summary}\n\n## Methodology\n\n- Interviews\n- Surveys\n"
        ))
    }
}

struct FakeMailer {
    accept: bool,
    calls: AtomicUsize,
}

impl FakeMailer {
    fn new(accept: bool) -> Self {
        Self {
            accept,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(
        &self,
        _subject: &str,
        _body: &str,
        recipients: &[String],
        attachment: &Path,
    ) -> Result<bool, ReportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(!recipients.is_empty());
        assert!(attachment.exists(), "PDF must be on disk before sending");
        Ok(self.accept)
    }
}

#[derive(Default)]
struct StageRecorder {
    stages: Mutex<Vec<Stage>>,
}

impl PipelineProgressCallback for StageRecorder {
    fn on_stage_start(&self, stage: Stage) {
        self.stages.lock().unwrap().push(stage);
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn pipeline_config() -> PipelineConfig {
    PipelineConfig {
        feeds: vec![
            FeedSpec::new("ethereum_blog", "https://blog.ethereum.org/feed.xml"),
            FeedSpec::new("flow_blog", "https://example.invalid/feed"),
            FeedSpec::new("arbitrum_medium", "https://medium.com/feed/offchainlabs"),
        ],
        ..PipelineConfig::default()
    }
}

fn report_config(path: &Path) -> ReportConfig {
    ReportConfig::builder()
        .output_path(path)
        .build()
        .unwrap()
}

/// Route library logs to the test harness (`cargo test -- --nocapture`).
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("web3_news_report=debug"))
        .with_test_writer()
        .try_init();
}

fn recipients() -> Vec<String> {
    vec!["research@example.com".to_string()]
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn generate_to_file_writes_a_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("digest.pdf");
    let articles = vec![
        Article::new(
            "ethereum_blog",
            "Dencun",
            "https://blog.ethereum.org/dencun",
            "Wed, 13 Mar 2024 13:55:35 GMT",
            "Blobs are live.",
        ),
        Article::new(
            "arbitrum_medium",
            "Stylus",
            "https://medium.com/offchainlabs/stylus",
            "2024-02-01",
            "Rust contracts on Arbitrum.",
        ),
    ];

    generate_report_to_file(&articles, &path, &report_config(&path)).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(String::from_utf8_lossy(&bytes).trim_end().ends_with("%%EOF"));
    let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 1, "only the finished PDF remains");
}

#[test]
fn empty_article_list_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("digest.pdf");
    let err = generate_report_to_file(&[], &path, &report_config(&path)).unwrap_err();
    assert!(matches!(err, ReportError::EmptyInput));
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn full_run_with_fakes() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.pdf");
    let mailer = FakeMailer::new(true);
    let to = recipients();
    let progress = StageRecorder::default();

    let summary = run_pipeline(
        &StaticFeed,
        Some(&FakeGenerator),
        Some(Notification {
            mailer: &mailer,
            recipients: &to,
        }),
        &pipeline_config(),
        &report_config(&path),
        &progress,
    )
    .await
    .unwrap();

    // "Devcon tickets" matches no keyword; the flow_blog feed fails.
    assert_eq!(summary.articles.len(), 2);
    assert_eq!(summary.pdf_path, path);
    assert!(path.exists());
    assert_eq!(summary.email_sent, Some(true));
    assert_eq!(mailer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        *progress.stages.lock().unwrap(),
        vec![Stage::Fetch, Stage::Enrich, Stage::Render, Stage::Notify]
    );

    let dencun = &summary.articles[0];
    assert!(dencun.summary.starts_with("# Executive Summary"));
    assert_eq!(
        dencun.original_summary.as_deref(),
        Some("Proto-danksharding brings blobs to Ethereum.")
    );

    let stylus = &summary.articles[1];
    assert_eq!(stylus.summary, "Error generating proposal");
    assert_eq!(stylus.date, "2024-02-01");
    assert_eq!(
        summary.article_errors,
        vec![ArticleError::EnrichmentFailed {
            index: 1,
            retries: 2,
            detail: "503 Service Unavailable".into()
        }]
    );
}

#[tokio::test]
async fn rejected_email_keeps_the_pdf() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.pdf");
    let mailer = FakeMailer::new(false);
    let to = recipients();

    let summary = run_pipeline(
        &StaticFeed,
        None,
        Some(Notification {
            mailer: &mailer,
            recipients: &to,
        }),
        &pipeline_config(),
        &report_config(&path),
        &NoopProgressCallback,
    )
    .await
    .unwrap();

    assert_eq!(summary.email_sent, Some(false));
    assert!(path.exists());
    assert!(summary.article_errors.is_empty());
}

#[tokio::test]
async fn disabled_stages_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.pdf");
    let mailer = FakeMailer::new(true);
    let to = recipients();
    let config = PipelineConfig {
        enrich: false,
        notify: false,
        ..pipeline_config()
    };

    let summary = run_pipeline(
        &StaticFeed,
        Some(&FakeGenerator),
        Some(Notification {
            mailer: &mailer,
            recipients: &to,
        }),
        &config,
        &report_config(&path),
        &NoopProgressCallback,
    )
    .await
    .unwrap();

    assert_eq!(summary.email_sent, None);
    assert_eq!(mailer.calls.load(Ordering::SeqCst), 0);
    assert!(summary.articles.iter().all(|a| a.original_summary.is_none()));
}

#[tokio::test]
async fn no_relevant_articles_is_empty_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.pdf");
    let config = PipelineConfig {
        feeds: vec![FeedSpec::new("flow_blog", "https://example.invalid/feed")],
        ..PipelineConfig::default()
    };

    let err = run_pipeline(
        &StaticFeed,
        None,
        None,
        &config,
        &report_config(&path),
        &NoopProgressCallback,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReportError::EmptyInput));
    assert!(!path.exists());
}

#[tokio::test]
async fn saved_articles_render_without_fetching() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.pdf");
    let articles: Vec<Article> = serde_json::from_str(
        r#"[{"source":"polygon_blog","title":"zkEVM","summary":"Validity proofs for everyone."}]"#,
    )
    .unwrap();

    let summary = process_articles(
        articles,
        None,
        None,
        &PipelineConfig::default(),
        &report_config(&path),
        &NoopProgressCallback,
    )
    .await
    .unwrap();

    assert_eq!(summary.articles[0].date, "No Date");
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF-"));
}
