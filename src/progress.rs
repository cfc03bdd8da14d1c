//! Progress-callback trait for pipeline stage and article events.
//!
//! Pass an [`Arc<dyn PipelineProgressCallback>`] to
//! [`crate::etl::run_pipeline`] to receive events as the run moves through
//! fetch, enrichment, rendering and notification. The CLI uses this to drive
//! its spinners; a service could forward events to a channel instead.
//!
//! # Example
//!
//! ```rust
//! use web3_news_report::PipelineProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct Counter(AtomicUsize);
//!
//! impl PipelineProgressCallback for Counter {
//!     fn on_article_enriched(&self, index: usize, total: usize, ok: bool) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("proposal {}/{} ({})", index + 1, total, if ok { "ok" } else { "failed" });
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetch,
    Enrich,
    Render,
    Notify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Fetch => "Fetching feeds",
            Stage::Enrich => "Generating proposals",
            Stage::Render => "Rendering PDF",
            Stage::Notify => "Sending email",
        })
    }
}

/// Called by the pipeline as it runs.
///
/// All methods default to no-ops so implementations override only what
/// they need. Implementations must be `Send + Sync`; the pipeline may call
/// them from a blocking worker thread during rendering.
pub trait PipelineProgressCallback: Send + Sync {
    /// A stage is about to begin.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// A stage finished. `detail` is a short human-readable result.
    fn on_stage_complete(&self, stage: Stage, detail: &str) {
        let _ = (stage, detail);
    }

    /// One feed was read; `kept` articles passed the relevance filter.
    fn on_feed_fetched(&self, source: &str, kept: usize) {
        let _ = (source, kept);
    }

    /// A feed failed and was skipped.
    fn on_feed_error(&self, source: &str, error: &str) {
        let _ = (source, error);
    }

    /// Proposal generation finished for article `index` (0-based).
    fn on_article_enriched(&self, index: usize, total: usize, ok: bool) {
        let _ = (index, total, ok);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
