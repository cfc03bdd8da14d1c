//! Feed stage: download RSS/Atom feeds and keep the relevant entries.
//!
//! [`FeedSource`] is the seam between the pipeline and the network. The
//! production [`RssFeedSource`] downloads with `reqwest` and parses with
//! `feed-rs`; tests substitute an in-memory source.

use crate::config::PipelineConfig;
use crate::error::ReportError;
use crate::model::{Article, RawEntry, NO_DATE, NO_LINK, NO_SUMMARY, NO_TITLE};
use crate::progress::PipelineProgressCallback;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::time::Duration;
use tracing::{debug, info, warn};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Something that can return the raw entries of a named feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, source_name: &str, feed_url: &str) -> Result<Vec<RawEntry>, ReportError>;
}

/// HTTP feed reader.
#[derive(Debug, Clone)]
pub struct RssFeedSource {
    client: reqwest::Client,
}

impl RssFeedSource {
    pub fn new(timeout_secs: u64) -> Result<Self, ReportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "application/rss+xml,application/atom+xml,application/xml;q=0.9,text/xml;q=0.8,*/*;q=0.5",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|e| ReportError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for RssFeedSource {
    async fn fetch(&self, source_name: &str, feed_url: &str) -> Result<Vec<RawEntry>, ReportError> {
        let fetch_err = |reason: String| ReportError::FeedFetchFailed {
            source_name: source_name.to_string(),
            url: feed_url.to_string(),
            reason,
        };

        debug!("GET {}", feed_url);
        let response = self
            .client
            .get(feed_url)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;
        parse_feed(source_name, &bytes)
    }
}

/// Parse RSS or Atom bytes into raw entries, in document order.
pub fn parse_feed(source_name: &str, bytes: &[u8]) -> Result<Vec<RawEntry>, ReportError> {
    let feed = feed_rs::parser::parse(bytes).map_err(|e| ReportError::FeedParseFailed {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })?;

    Ok(feed
        .entries
        .into_iter()
        .map(|entry| RawEntry {
            title: entry.title.map(|t| t.content),
            summary: entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body)),
            link: entry.links.first().map(|l| l.href.clone()),
            published: entry.published.map(|d| d.to_rfc2822()),
            updated: entry.updated.map(|d| d.to_rfc2822()),
        })
        .collect())
}

/// Read every configured feed and return the relevant articles.
///
/// Only the first `max_entries_per_feed` entries of each feed are
/// considered. A feed that fails is logged, reported and skipped.
pub async fn collect_articles(
    source: &dyn FeedSource,
    config: &PipelineConfig,
    progress: &dyn PipelineProgressCallback,
) -> Vec<Article> {
    let mut articles = Vec::new();

    for feed in &config.feeds {
        info!("Fetching feed '{}' from {}", feed.name, feed.url);
        let entries = match source.fetch(&feed.name, &feed.url).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Skipping feed '{}': {}", feed.name, e);
                progress.on_feed_error(&feed.name, &e.to_string());
                continue;
            }
        };

        let before = articles.len();
        articles.extend(
            entries
                .into_iter()
                .take(config.max_entries_per_feed)
                .filter(|e| is_relevant(e, &config.keywords))
                .map(|e| to_article(&feed.name, e)),
        );
        let kept = articles.len() - before;
        debug!("Feed '{}': {} relevant entries", feed.name, kept);
        progress.on_feed_fetched(&feed.name, kept);
    }

    articles
}

/// Does the entry's title or summary mention one of `keywords`?
pub fn is_relevant(entry: &RawEntry, keywords: &[String]) -> bool {
    let text = format!(
        "{} {}",
        entry.title.as_deref().unwrap_or_default(),
        entry.summary.as_deref().unwrap_or_default()
    )
    .to_lowercase();
    keywords
        .iter()
        .any(|k| !k.is_empty() && text.contains(&k.to_lowercase()))
}

fn to_article(source: &str, entry: RawEntry) -> Article {
    let non_empty = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    let summary = entry
        .summary
        .map(|s| strip_html(&s))
        .filter(|s| !s.is_empty());

    Article::new(
        source,
        non_empty(entry.title).unwrap_or_else(|| NO_TITLE.to_string()),
        non_empty(entry.link).unwrap_or_else(|| NO_LINK.to_string()),
        non_empty(entry.published)
            .or_else(|| non_empty(entry.updated))
            .unwrap_or_else(|| NO_DATE.to_string()),
        summary.unwrap_or_else(|| NO_SUMMARY.to_string()),
    )
}

// ── HTML cleanup ─────────────────────────────────────────────────────────

static RE_BLOCK_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").unwrap()
});
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip tags, decode entities and collapse whitespace.
pub fn strip_html(html: &str) -> String {
    let text = RE_BLOCK_TAG.replace_all(html, " ");
    let text = RE_TAG.replace_all(&text, " ");

    let text = html_escape::decode_html_entities(&text);

    RE_WHITESPACE.replace_all(&text, " ").trim().to_string()
}
