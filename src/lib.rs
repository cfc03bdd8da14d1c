//! # web3-news-report
//!
//! Turn blockchain-ecosystem RSS feeds into a styled PDF digest, optionally
//! rewriting each item as a user-research proposal with an LLM, and email
//! the result.
//!
//! ## Pipeline Overview
//!
//! ```text
//! RSS feeds
//!  │
//!  ├─ 1. Fetch    download feeds, keep keyword-relevant entries
//!  ├─ 2. Enrich   summary → research proposal (edgequake-llm, retry/backoff)
//!  ├─ 3. Assemble group by source, tokenize markdown, lay out blocks
//!  ├─ 4. Render   paginate A4 pages, draw them with printpdf (spawn_blocking)
//!  └─ 5. Notify   email the PDF over SMTP
//! ```
//!
//! Steps 3 and 4 are pure and local; only 1, 2 and 5 touch the network, and
//! each sits behind a trait ([`FeedSource`], [`ProposalGenerator`],
//! [`Mailer`]) so it can be replaced.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use web3_news_report::{generate_report, Article, ReportConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let articles = vec![Article::new(
//!         "ethereum_blog",
//!         "Dencun is live",
//!         "https://blog.ethereum.org/2024/03/13/dencun-mainnet",
//!         "Wed, 13 Mar 2024 14:00:00 GMT",
//!         "Proto-danksharding ships to mainnet.",
//!     )];
//!     let path = generate_report(&articles, &ReportConfig::default())?;
//!     eprintln!("wrote {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `newsreport` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod error;
pub mod etl;
pub mod generate;
pub mod model;
pub mod pdf;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod report;
pub mod style;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{FeedSpec, PipelineConfig, ReportConfig, ReportConfigBuilder, SmtpSettings};
pub use error::{ArticleError, ReportError};
pub use etl::{process_articles, run_pipeline, Notification};
pub use generate::{generate_report, generate_report_to_file, render_report};
pub use model::{Article, RawEntry, RunSummary};
pub use pipeline::{
    FeedSource, LlmProposalGenerator, Mailer, ProposalGenerator, RssFeedSource, SmtpMailer,
};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback, Stage};
pub use report::{assemble, RenderedDocument, ReportSummary};
