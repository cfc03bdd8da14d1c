//! End-to-end run: fetch → enrich → render → notify.

use crate::config::{PipelineConfig, ReportConfig};
use crate::error::ReportError;
use crate::generate::render_report;
use crate::model::{Article, RunSummary};
use crate::pdf::write_pdf;
use crate::pipeline::enrich::{enrich_articles, ProposalGenerator};
use crate::pipeline::feed::{collect_articles, FeedSource};
use crate::pipeline::notify::Mailer;
use crate::progress::{PipelineProgressCallback, Stage};
use chrono::Local;
use std::time::Instant;
use tracing::{info, warn};

/// Email delivery for one run.
pub struct Notification<'a> {
    pub mailer: &'a dyn Mailer,
    pub recipients: &'a [String],
}

/// Run the whole pipeline once.
///
/// Enrichment runs only when `pipeline.enrich` is set and a generator is
/// given; the same goes for `pipeline.notify` and `notification`.
///
/// # Errors
/// - [`ReportError::EmptyInput`] when no feed produced a relevant article
/// - rendering or write failures from the render stage
///
/// A failed email is not an error: the PDF stays on disk and
/// `email_sent` is `Some(false)`.
pub async fn run_pipeline(
    feed: &dyn FeedSource,
    generator: Option<&dyn ProposalGenerator>,
    notification: Option<Notification<'_>>,
    pipeline: &PipelineConfig,
    report: &ReportConfig,
    progress: &dyn PipelineProgressCallback,
) -> Result<RunSummary, ReportError> {
    // ── Fetch ────────────────────────────────────────────────────────────
    progress.on_stage_start(Stage::Fetch);
    let articles = collect_articles(feed, pipeline, progress).await;
    progress.on_stage_complete(Stage::Fetch, &format!("{} articles", articles.len()));

    process_articles(articles, generator, notification, pipeline, report, progress).await
}

/// Run the enrich, render and notify stages over articles already in hand.
///
/// Same rules as [`run_pipeline`], which calls this after fetching.
pub async fn process_articles(
    mut articles: Vec<Article>,
    generator: Option<&dyn ProposalGenerator>,
    notification: Option<Notification<'_>>,
    pipeline: &PipelineConfig,
    report: &ReportConfig,
    progress: &dyn PipelineProgressCallback,
) -> Result<RunSummary, ReportError> {
    let total_start = Instant::now();
    if articles.is_empty() {
        return Err(ReportError::EmptyInput);
    }

    // ── Enrich ───────────────────────────────────────────────────────────
    let mut article_errors = Vec::new();
    if let (true, Some(generator)) = (pipeline.enrich, generator) {
        progress.on_stage_start(Stage::Enrich);
        article_errors = enrich_articles(generator, &mut articles, progress).await;
        let ok = articles.len() - article_errors.len();
        progress.on_stage_complete(Stage::Enrich, &format!("{ok}/{}", articles.len()));
    }

    // ── Render ───────────────────────────────────────────────────────────
    progress.on_stage_start(Stage::Render);
    let now = Local::now().naive_local();
    let pdf_path = report.resolve_output_path(now);
    let bytes = {
        let articles = articles.clone();
        let report = report.clone();
        tokio::task::spawn_blocking(move || render_report(&articles, &report, now))
            .await
            .map_err(|e| ReportError::Internal(format!("render task panicked: {e}")))??
    };
    write_pdf(&bytes, &pdf_path)?;
    progress.on_stage_complete(Stage::Render, &pdf_path.display().to_string());

    // ── Notify ───────────────────────────────────────────────────────────
    let email_sent = match (pipeline.notify, notification) {
        (true, Some(n)) => {
            progress.on_stage_start(Stage::Notify);
            let sent = match n
                .mailer
                .send(&pipeline.subject, &pipeline.body, n.recipients, &pdf_path)
                .await
            {
                Ok(sent) => sent,
                Err(e) => {
                    warn!("Email not sent: {}", e);
                    false
                }
            };
            progress.on_stage_complete(Stage::Notify, if sent { "sent" } else { "failed" });
            Some(sent)
        }
        _ => None,
    };

    info!(
        "Pipeline finished in {}ms: {} articles, {} article errors",
        total_start.elapsed().as_millis(),
        articles.len(),
        article_errors.len()
    );

    Ok(RunSummary {
        articles,
        pdf_path,
        email_sent,
        article_errors,
    })
}
