//! Network-facing pipeline stages.
//!
//! Each submodule owns one collaborator behind an async trait, so the
//! orchestrator in [`crate::etl`] can be driven by in-process fakes in tests.
//!
//! ## Data Flow
//!
//! ```text
//! feed ──▶ enrich ──▶ (report + pdf) ──▶ notify
//! (RSS)    (LLM)        (local only)      (SMTP)
//! ```
//!
//! 1. [`feed`]: download RSS/Atom feeds, keep keyword-relevant entries
//! 2. [`enrich`]: rewrite each summary as a research proposal with
//!    retry/backoff; failures degrade to a placeholder
//! 3. [`notify`]: email the finished PDF

pub mod enrich;
pub mod feed;
pub mod notify;

pub use enrich::{enrich_articles, resolve_provider, LlmProposalGenerator, ProposalGenerator};
pub use feed::{collect_articles, FeedSource, RssFeedSource};
pub use notify::{Mailer, SmtpMailer};
