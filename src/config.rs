//! Configuration types for report generation and the news pipeline.
//!
//! * [`ReportConfig`] controls how articles become a PDF (title, output
//!   path, routing thresholds). Built via [`ReportConfigBuilder`].
//! * [`PipelineConfig`] controls the collaborators around the report: which
//!   feeds are read, how proposals are generated, who gets the email.
//! * [`SmtpSettings`] are read from the environment, never from flags, so
//!   credentials stay out of shell history.

use crate::error::ReportError;
use chrono::NaiveDateTime;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

pub const DEFAULT_TITLE: &str = "Web3 News Updates Report";
pub const DEFAULT_OUTPUT_PREFIX: &str = "web3_news_report";
pub const DEFAULT_SUBJECT: &str = "Blockchain News Research Proposals";
pub const DEFAULT_BODY: &str =
    "Please find attached the latest blockchain news research proposals report.";

/// Configuration for turning a batch of articles into one PDF.
///
/// # Example
/// ```rust
/// use web3_news_report::ReportConfig;
///
/// let config = ReportConfig::builder()
///     .title("Weekly Digest")
///     .output_prefix("digest")
///     .build()
///     .unwrap();
/// assert_eq!(config.toc_threshold, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Document title on the first page. Default: "Web3 News Updates Report".
    pub title: String,

    /// File-name prefix for timestamped output paths. Default: `web3_news_report`.
    pub output_prefix: String,

    /// Explicit output path. When `None`, [`Self::resolve_output_path`]
    /// derives `<prefix>_<YYYYMMDD_HHMMSS>.pdf`.
    pub output_path: Option<PathBuf>,

    /// A structured body gets a table of contents when it tokenizes into
    /// more elements than this. Default: 10.
    pub toc_threshold: usize,

    /// Bodies longer than this many characters take the structured path.
    /// Default: 500.
    pub structured_length_threshold: usize,

    /// Plain bodies are cut to this many characters plus `...`. Default: 600.
    pub plain_truncate_chars: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            output_path: None,
            toc_threshold: 10,
            structured_length_threshold: 500,
            plain_truncate_chars: 600,
        }
    }
}

impl ReportConfig {
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder {
            config: Self::default(),
        }
    }

    /// The explicit output path, or a timestamped one in the working directory.
    pub fn resolve_output_path(&self, now: NaiveDateTime) -> PathBuf {
        match &self.output_path {
            Some(path) => path.clone(),
            None => PathBuf::from(format!(
                "{}_{}.pdf",
                self.output_prefix,
                now.format("%Y%m%d_%H%M%S")
            )),
        }
    }
}

/// Builder for [`ReportConfig`].
#[derive(Debug)]
pub struct ReportConfigBuilder {
    config: ReportConfig,
}

impl ReportConfigBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.output_prefix = prefix.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = Some(path.into());
        self
    }

    pub fn toc_threshold(mut self, n: usize) -> Self {
        self.config.toc_threshold = n;
        self
    }

    pub fn structured_length_threshold(mut self, n: usize) -> Self {
        self.config.structured_length_threshold = n;
        self
    }

    pub fn plain_truncate_chars(mut self, n: usize) -> Self {
        self.config.plain_truncate_chars = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReportConfig, ReportError> {
        let c = &self.config;
        if c.plain_truncate_chars == 0 {
            return Err(ReportError::Configuration(
                "plain_truncate_chars must be >= 1".into(),
            ));
        }
        if c.output_path.is_none() && c.output_prefix.trim().is_empty() {
            return Err(ReportError::Configuration(
                "output_prefix must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Pipeline ─────────────────────────────────────────────────────────────

/// One RSS/Atom feed to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSpec {
    /// Source key stored on every article, e.g. `ethereum_blog`.
    pub name: String,
    pub url: String,
}

impl FeedSpec {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

pub fn default_feeds() -> Vec<FeedSpec> {
    vec![
        FeedSpec::new("ethereum_blog", "https://blog.ethereum.org/feed.xml"),
        FeedSpec::new("arbitrum_medium", "https://medium.com/feed/offchainlabs"),
    ]
}

pub const DEFAULT_KEYWORDS: [&str; 10] = [
    "upgrade", "update", "fork", "hardfork", "testnet", "mainnet", "release", "version",
    "protocol", "network",
];

/// Configuration for the fetch → enrich → notify collaborators.
#[derive(Clone)]
pub struct PipelineConfig {
    /// Feeds read in order. Default: Ethereum blog and Arbitrum on Medium.
    pub feeds: Vec<FeedSpec>,

    /// Only the first N entries of each feed are considered. Default: 3.
    pub max_entries_per_feed: usize,

    /// An entry is kept when its title or summary contains one of these
    /// (case-insensitive).
    pub keywords: Vec<String>,

    /// Replace summaries with generated research proposals. Default: true.
    pub enrich: bool,

    /// LLM model identifier. If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, uses `ProviderFactory::from_env()`.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Maximum tokens per proposal. Default: 1000.
    pub max_tokens: usize,

    pub temperature: f32,

    /// Retry attempts after the first failed proposal call. Default: 2.
    pub max_retries: u32,

    /// Initial retry delay; doubles after each attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Feed download timeout. Default: 10.
    pub http_timeout_secs: u64,

    /// Send the report by email. Default: true.
    pub notify: bool,

    pub subject: String,
    pub body: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            max_entries_per_feed: 3,
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            enrich: true,
            model: None,
            provider_name: None,
            provider: None,
            max_tokens: 1000,
            temperature: 0.7,
            max_retries: 2,
            retry_backoff_ms: 500,
            http_timeout_secs: 10,
            notify: true,
            subject: DEFAULT_SUBJECT.to_string(),
            body: DEFAULT_BODY.to_string(),
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("feeds", &self.feeds)
            .field("max_entries_per_feed", &self.max_entries_per_feed)
            .field("keywords", &self.keywords)
            .field("enrich", &self.enrich)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("notify", &self.notify)
            .finish()
    }
}

// ── SMTP ─────────────────────────────────────────────────────────────────

pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Mail server credentials and recipients.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// STARTTLS on a plain connection when true, implicit TLS otherwise.
    pub use_tls: bool,
    pub recipients: Vec<String>,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("use_tls", &self.use_tls)
            .field("recipients", &self.recipients)
            .finish()
    }
}

impl SmtpSettings {
    /// Read `EMAIL_HOST`, `EMAIL_PORT`, `EMAIL_USER`, `EMAIL_PASSWORD`,
    /// `EMAIL_USE_TLS` and `EMAIL_RECIPIENTS` from the process environment.
    pub fn from_env() -> Result<Self, ReportError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ReportError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &str| {
            get(name).ok_or_else(|| ReportError::MissingEnv {
                name: name.to_string(),
            })
        };

        let host = required("EMAIL_HOST")?;
        let user = required("EMAIL_USER")?;
        let password = required("EMAIL_PASSWORD")?;

        let port = match get("EMAIL_PORT") {
            None => DEFAULT_SMTP_PORT,
            Some(raw) => match raw.parse::<u16>() {
                Ok(p) if p >= 1 => p,
                _ => {
                    return Err(ReportError::Configuration(format!(
                        "EMAIL_PORT must be between 1 and 65535, got '{raw}'"
                    )))
                }
            },
        };

        let use_tls = match get("EMAIL_USE_TLS").map(|v| v.to_lowercase()) {
            None => true,
            Some(v) if v == "true" => true,
            Some(v) if v == "false" => false,
            Some(other) => {
                warn!("EMAIL_USE_TLS='{other}' is not 'true' or 'false'; using true");
                true
            }
        };

        let recipients = get("EMAIL_RECIPIENTS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            user,
            password,
            use_tls,
            recipients,
        })
    }
}
