//! Record types passed between the pipeline stages.

use crate::error::ArticleError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const NO_TITLE: &str = "No Title";
pub const NO_DATE: &str = "No Date";
pub const NO_LINK: &str = "No Link Available";
pub const NO_SUMMARY: &str = "No summary available";

/// One news item as handed to the report pipeline.
///
/// Produced by the feed stage, optionally rewritten by the enrichment stage,
/// then consumed read-only by [`crate::report::assemble`]. Every field is
/// always present; absent values deserialise to their display fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Feed key, e.g. `ethereum_blog`.
    pub source: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_link")]
    pub link: String,
    /// Free-form publication date in whatever format the feed used.
    #[serde(default = "default_date")]
    pub date: String,
    /// Body text: plain prose, HTML-stripped feed summary or a markdown proposal.
    #[serde(default = "default_summary")]
    pub summary: String,
    /// The feed summary as it was before enrichment replaced `summary`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_summary: Option<String>,
}

fn default_title() -> String {
    NO_TITLE.to_string()
}

fn default_link() -> String {
    NO_LINK.to_string()
}

fn default_date() -> String {
    NO_DATE.to_string()
}

fn default_summary() -> String {
    NO_SUMMARY.to_string()
}

impl Article {
    pub fn new(
        source: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
        date: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            link: link.into(),
            date: date.into(),
            summary: summary.into(),
            original_summary: None,
        }
    }

    /// Title to display, falling back when the feed gave an empty one.
    pub fn display_title(&self) -> &str {
        non_empty_or(&self.title, NO_TITLE)
    }

    pub fn display_date(&self) -> &str {
        non_empty_or(&self.date, NO_DATE)
    }

    pub fn display_link(&self) -> &str {
        non_empty_or(&self.link, NO_LINK)
    }

    pub fn display_summary(&self) -> &str {
        non_empty_or(&self.summary, NO_SUMMARY)
    }

    /// Replace the body with an AI-written proposal, keeping the feed text.
    pub fn replace_summary(&mut self, proposal: String) {
        let previous = std::mem::replace(&mut self.summary, proposal);
        if self.original_summary.is_none() {
            self.original_summary = Some(previous);
        }
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// One feed item before relevance filtering, with every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
}

/// Outcome of one end-to-end pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Articles as they were rendered (after enrichment).
    pub articles: Vec<Article>,
    /// Where the PDF was written.
    pub pdf_path: PathBuf,
    /// `None` when notification was not attempted.
    pub email_sent: Option<bool>,
    /// Per-article failures that did not abort the run.
    pub article_errors: Vec<ArticleError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_deserialise_to_fallbacks() {
        let a: Article = serde_json::from_str(r#"{"source":"ethereum_blog"}"#).unwrap();
        assert_eq!(a.title, NO_TITLE);
        assert_eq!(a.date, NO_DATE);
        assert_eq!(a.link, NO_LINK);
        assert_eq!(a.summary, NO_SUMMARY);
        assert!(a.original_summary.is_none());
    }

    #[test]
    fn empty_fields_display_fallbacks() {
        let a = Article::new("flow_blog", "  ", "", "", "");
        assert_eq!(a.display_title(), NO_TITLE);
        assert_eq!(a.display_link(), NO_LINK);
        assert_eq!(a.display_date(), NO_DATE);
        assert_eq!(a.display_summary(), NO_SUMMARY);
    }

    #[test]
    fn replace_summary_retains_original_once() {
        let mut a = Article::new("s", "t", "l", "d", "feed text");
        a.replace_summary("proposal one".into());
        a.replace_summary("proposal two".into());
        assert_eq!(a.summary, "proposal two");
        assert_eq!(a.original_summary.as_deref(), Some("feed text"));
    }
}
