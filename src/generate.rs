//! Report generation entry points.
//!
//! These are synchronous: assembling and rendering a report is pure CPU work
//! followed by one file write. Async callers should wrap them in
//! `tokio::task::spawn_blocking`, as [`crate::etl::run_pipeline`] does.

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::model::Article;
use crate::pdf::{render_pdf, write_pdf};
use crate::report::assemble;
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Assemble and render `articles` to PDF bytes without touching the disk.
pub fn render_report(
    articles: &[Article],
    config: &ReportConfig,
    now: NaiveDateTime,
) -> Result<Vec<u8>, ReportError> {
    let doc = assemble(articles, config, now)?;
    render_pdf(&doc)
}

/// Generate the report at the configured (or timestamped) output path.
///
/// # Errors
/// - [`ReportError::EmptyInput`] when `articles` is empty; nothing is written
/// - [`ReportError::OutputWriteFailed`] when the file cannot be written
pub fn generate_report(
    articles: &[Article],
    config: &ReportConfig,
) -> Result<PathBuf, ReportError> {
    let now = Local::now().naive_local();
    let path = config.resolve_output_path(now);
    write_report(articles, &path, config, now)?;
    Ok(path)
}

/// Generate the report at `output_path`, ignoring the configured path.
pub fn generate_report_to_file(
    articles: &[Article],
    output_path: impl AsRef<Path>,
    config: &ReportConfig,
) -> Result<(), ReportError> {
    write_report(
        articles,
        output_path.as_ref(),
        config,
        Local::now().naive_local(),
    )
}

fn write_report(
    articles: &[Article],
    path: &Path,
    config: &ReportConfig,
    now: NaiveDateTime,
) -> Result<(), ReportError> {
    let start = Instant::now();
    let bytes = render_report(articles, config, now)?;
    write_pdf(&bytes, path)?;
    info!(
        "Wrote {} ({} articles, {} bytes) in {}ms",
        path.display(),
        articles.len(),
        bytes.len(),
        start.elapsed().as_millis()
    );
    Ok(())
}
