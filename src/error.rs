//! Error types for the web3-news-report library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ReportError`] is **fatal**: the run cannot produce a report at all
//!   (missing credentials, no articles, the PDF could not be written).
//!   Returned as `Err(ReportError)` from the `generate*` and `run_pipeline`
//!   entry points.
//!
//! * [`ArticleError`] is **non-fatal**: a single article could not be enriched
//!   but every other article is fine. Collected into
//!   [`crate::model::RunSummary`] so callers can inspect partial success
//!   instead of losing the whole batch to one bad API call.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the web3-news-report library.
///
/// Article-level failures use [`ArticleError`] and are recorded in the run
/// summary rather than propagated here.
#[derive(Debug, Error)]
pub enum ReportError {
    // ── Configuration errors ─────────────────────────────────────────────
    /// A required environment variable is unset or empty.
    #[error("Missing required environment variable: {name}\nSet it in your shell or in a .env file.")]
    MissingEnv { name: String },

    /// Builder validation or environment parsing failed.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The configured LLM provider could not be created.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Input errors ─────────────────────────────────────────────────────
    /// There is nothing to render.
    #[error("No articles provided for PDF generation")]
    EmptyInput,

    /// The feed could not be downloaded.
    #[error("Failed to fetch feed '{source_name}' from {url}: {reason}")]
    FeedFetchFailed {
        source_name: String,
        url: String,
        reason: String,
    },

    /// The feed was downloaded but is not valid RSS/Atom.
    #[error("Feed '{source_name}' could not be parsed: {reason}")]
    FeedParseFailed { source_name: String, reason: String },

    // ── Rendering errors ─────────────────────────────────────────────────
    /// The PDF renderer rejected the document.
    #[error("PDF rendering failed: {0}")]
    RenderFailed(String),

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Transport errors ─────────────────────────────────────────────────
    /// The report file to attach does not exist.
    #[error("Attachment not found: '{path}'")]
    AttachmentMissing { path: PathBuf },

    /// The message could not be built or handed to the SMTP server.
    #[error("Email transport failed: {0}")]
    TransportFailed(String),

    // ── Catch-all ────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReportError {
    /// True for errors that abort a run before any network or file I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ReportError::MissingEnv { .. }
                | ReportError::Configuration(_)
                | ReportError::ProviderNotConfigured { .. }
        )
    }
}

/// A non-fatal error for a single article.
///
/// The article stays in the batch; the error is reported alongside the
/// generated PDF.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ArticleError {
    /// Proposal generation failed after retries; a placeholder was used.
    #[error("Article {index}: proposal generation failed after {retries} retries: {detail}")]
    EnrichmentFailed {
        index: usize,
        retries: u32,
        detail: String,
    },

    /// The article had no summary to send to the model.
    #[error("Article {index}: no summary to enrich")]
    MissingSummary { index: usize },
}
