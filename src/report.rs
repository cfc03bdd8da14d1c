//! Report assembler: articles in, one [`RenderedDocument`] out.
//!
//! Layout of the assembled document:
//!
//! ```text
//! Title
//! Generated on <date> at <time>
//! ── per source, first-seen order ──
//! Source header
//!   per article: title, "Published: …", "Link: …", body, spacer
//! <page break between sources, never after the last>
//! ```
//!
//! Bodies that look like markdown go through the full document engine; the
//! rest become one truncated paragraph.

use crate::config::ReportConfig;
use crate::document::inline::{Emphasis, RichText, Span};
use crate::document::layout::{layout_with, Block, LayoutOptions};
use crate::document::tokenize::tokenize;
use crate::error::ReportError;
use crate::model::{Article, NO_LINK};
use crate::style::StyleName;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use tracing::debug;

const TITLE_SPACING: f32 = 20.0;
const ARTICLE_SPACING: f32 = 15.0;

/// Ordered blocks plus the document title, ready for the PDF renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDocument {
    pub title: String,
    pub blocks: Vec<Block>,
}

/// Build the document for `articles`.
///
/// `now` is the generation timestamp printed under the title.
pub fn assemble(
    articles: &[Article],
    config: &ReportConfig,
    now: NaiveDateTime,
) -> Result<RenderedDocument, ReportError> {
    if articles.is_empty() {
        return Err(ReportError::EmptyInput);
    }

    let mut blocks = vec![
        Block::text(config.title.as_str(), StyleName::ReportTitle),
        Block::text(
            format!("Generated on {}", now.format("%B %d, %Y at %I:%M %p")).as_str(),
            StyleName::ReportDate,
        ),
        Block::spacer(TITLE_SPACING),
    ];

    let groups = group_by_source(articles);
    let last = groups.len() - 1;
    let layout_options = LayoutOptions {
        toc_threshold: config.toc_threshold,
    };

    for (i, (source, group)) in groups.iter().enumerate() {
        blocks.push(Block::text(
            format_source_name(source).as_str(),
            StyleName::SourceHeader,
        ));

        for article in group {
            blocks.push(Block::text(article.display_title(), StyleName::ArticleTitle));
            blocks.push(Block::text(
                format!("Published: {}", format_date(article.display_date())).as_str(),
                StyleName::ArticleDate,
            ));
            blocks.push(Block::text(link_line(article), StyleName::ArticleLink));

            let summary = article.display_summary();
            if is_structured(summary, config.structured_length_threshold) {
                let elements = tokenize(summary);
                debug!(
                    title = article.display_title(),
                    elements = elements.len(),
                    "structured body"
                );
                blocks.extend(layout_with(&elements, &layout_options));
            } else {
                blocks.push(Block::text(
                    truncate_plain(summary, config.plain_truncate_chars).as_str(),
                    StyleName::ArticleSummary,
                ));
            }
            blocks.push(Block::spacer(ARTICLE_SPACING));
        }

        if i < last {
            blocks.push(Block::PageBreak);
        }
    }

    Ok(RenderedDocument {
        title: config.title.clone(),
        blocks,
    })
}

fn group_by_source(articles: &[Article]) -> IndexMap<&str, Vec<&Article>> {
    let mut groups: IndexMap<&str, Vec<&Article>> = IndexMap::new();
    for article in articles {
        groups
            .entry(article.source.as_str())
            .or_default()
            .push(article);
    }
    groups
}

fn link_line(article: &Article) -> RichText {
    let link = article.display_link();
    let target = (link != NO_LINK && link.contains("://")).then(|| link.to_string());
    RichText::from_spans([
        Span {
            text: "Link: ".into(),
            emphasis: Emphasis::default(),
            link: None,
        },
        Span {
            text: link.to_string(),
            emphasis: Emphasis::default(),
            link: target,
        },
    ])
}

// ── Body routing ─────────────────────────────────────────────────────────

/// Does `summary` look like markdown worth tokenizing?
///
/// True when it is longer than `length_threshold` characters, or has more
/// than 2 `#`, more than 3 `**`, more than 3 `- `, or a literal `\n` escape.
pub fn is_structured(summary: &str, length_threshold: usize) -> bool {
    summary.chars().count() > length_threshold
        || summary.matches('#').count() > 2
        || summary.matches("**").count() > 3
        || summary.matches("- ").count() > 3
        || summary.contains("\\n")
}

/// Cut `text` to `max_chars` characters and append `...` when it was longer.
pub fn truncate_plain(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

// ── Display helpers ──────────────────────────────────────────────────────

const SOURCE_NAMES: [(&str, &str); 5] = [
    ("ethereum_blog", "Ethereum Blog"),
    ("arbitrum_medium", "Arbitrum Medium"),
    ("polygon_blog", "Polygon Blog"),
    ("solana_news", "Solana News"),
    ("flow_blog", "Flow Blog"),
];

/// Human-readable name for a feed key.
pub fn format_source_name(source: &str) -> String {
    if let Some((_, name)) = SOURCE_NAMES.iter().find(|(key, _)| *key == source) {
        return name.to_string();
    }
    source
        .replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

const DATETIME_PATTERNS: [&str; 1] = ["%a, %d %b %Y %H:%M:%S"];
const DATE_PATTERNS: [&str; 2] = ["%Y-%m-%d", "%d %b %Y"];

/// Best-effort `March 04, 2024` rendering of a feed date.
///
/// Unrecognised input is returned unchanged.
pub fn format_date(raw: &str) -> String {
    parse_date(raw)
        .map(|d| d.format("%B %d, %Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.replace("GMT", "");
    let cleaned = cleaned.trim();

    for pattern in DATETIME_PATTERNS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, pattern) {
            return Some(dt.date());
        }
    }
    for pattern in DATE_PATTERNS {
        if let Ok(d) = NaiveDate::parse_from_str(cleaned, pattern) {
            return Some(d);
        }
    }
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.date_naive())
}

// ── Summary ──────────────────────────────────────────────────────────────

/// Article counts per source display name, in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub sources: Vec<(String, usize)>,
    pub total: usize,
}

impl ReportSummary {
    pub fn from_articles(articles: &[Article]) -> Self {
        let sources = group_by_source(articles)
            .into_iter()
            .map(|(source, group)| (format_source_name(source), group.len()))
            .collect();
        Self {
            sources,
            total: articles.len(),
        }
    }
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total articles: {}", self.total)?;
        for (name, count) in &self.sources {
            writeln!(f, "  {name}: {count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    fn article(source: &str, title: &str, summary: &str) -> Article {
        Article::new(source, title, "https://example.org/a", "2024-03-01", summary)
    }

    fn texts_in(doc: &RenderedDocument, style: StyleName) -> Vec<String> {
        doc.blocks
            .iter()
            .filter(|b| b.style() == Some(style))
            .filter_map(Block::plain_text)
            .collect()
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = assemble(&[], &ReportConfig::default(), now()).unwrap_err();
        assert!(matches!(err, ReportError::EmptyInput));
    }

    #[test]
    fn length_boundary() {
        assert!(is_structured(&"a".repeat(501), 500));
        assert!(!is_structured(&"a".repeat(500), 500));
    }

    #[test]
    fn marker_counts_route_to_structured() {
        assert!(is_structured("# a # b # c", 500));
        assert!(!is_structured("# a # b", 500));
        assert!(is_structured("**a** **b**", 500));
        assert!(!is_structured("**a** b**", 500));
        assert!(is_structured("- a - b - c - d", 500));
        assert!(is_structured(r"line\nline", 500));
    }

    #[test]
    fn plain_truncation() {
        let out = truncate_plain(&"x".repeat(650), 600);
        assert_eq!(out.chars().count(), 603);
        assert!(out.ends_with("..."));
        assert_eq!(truncate_plain("short", 600), "short");
        assert_eq!(truncate_plain(&"é".repeat(601), 600).chars().count(), 603);
    }

    #[test]
    fn plain_body_is_truncated_in_document() {
        let body = "word ".repeat(130);
        assert!(body.chars().count() == 650);
        // Length alone would route it to the structured path.
        let config = ReportConfig::builder()
            .structured_length_threshold(1000)
            .build()
            .unwrap();
        let doc = assemble(&[article("s", "t", &body)], &config, now()).unwrap();
        let summary = &texts_in(&doc, StyleName::ArticleSummary)[0];
        assert_eq!(summary.chars().count(), 603);
    }

    #[test]
    fn one_source_two_articles() {
        let articles = [
            article("ethereum_blog", "First", "one"),
            article("ethereum_blog", "Second", "two"),
        ];
        let doc = assemble(&articles, &ReportConfig::default(), now()).unwrap();
        assert_eq!(texts_in(&doc, StyleName::SourceHeader), vec!["Ethereum Blog"]);
        assert_eq!(texts_in(&doc, StyleName::ArticleTitle), vec!["First", "Second"]);
        assert!(!doc.blocks.contains(&Block::PageBreak));
    }

    #[test]
    fn page_break_only_between_sources() {
        let articles = [
            article("ethereum_blog", "A", "one"),
            article("flow_blog", "B", "two"),
            article("ethereum_blog", "C", "three"),
        ];
        let doc = assemble(&articles, &ReportConfig::default(), now()).unwrap();
        assert_eq!(
            texts_in(&doc, StyleName::SourceHeader),
            vec!["Ethereum Blog", "Flow Blog"]
        );
        assert_eq!(texts_in(&doc, StyleName::ArticleTitle), vec!["A", "C", "B"]);
        let breaks = doc.blocks.iter().filter(|b| **b == Block::PageBreak).count();
        assert_eq!(breaks, 1);
        assert_ne!(doc.blocks.last(), Some(&Block::PageBreak));
    }

    #[test]
    fn header_lines() {
        let doc = assemble(&[article("s", "t", "b")], &ReportConfig::default(), now()).unwrap();
        assert_eq!(doc.title, "Web3 News Updates Report");
        assert_eq!(
            texts_in(&doc, StyleName::ReportDate),
            vec!["Generated on March 04, 2024 at 02:30 PM"]
        );
        assert_eq!(
            texts_in(&doc, StyleName::ArticleDate),
            vec!["Published: March 01, 2024"]
        );
    }

    #[test]
    fn link_line_is_annotated() {
        let doc = assemble(&[article("s", "t", "b")], &ReportConfig::default(), now()).unwrap();
        let link = doc
            .blocks
            .iter()
            .find(|b| b.style() == Some(StyleName::ArticleLink))
            .unwrap();
        match link {
            Block::Text { text, .. } => {
                assert_eq!(text.plain_text(), "Link: https://example.org/a");
                assert_eq!(
                    text.spans()[1].link.as_deref(),
                    Some("https://example.org/a")
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn long_structured_body_gets_toc_before_content() {
        let mut body = String::from("# Proposal\n\n");
        for i in 0..6 {
            body.push_str(&format!("## Section {i}\n\nText {i}.\n\n"));
        }
        let doc = assemble(
            &[article("s", "t", &body)],
            &ReportConfig::default(),
            now(),
        )
        .unwrap();
        let toc = doc
            .blocks
            .iter()
            .position(|b| matches!(b, Block::Toc { .. }))
            .expect("toc present");
        assert_eq!(doc.blocks[toc - 1].style(), Some(StyleName::ArticleLink));
        assert_eq!(doc.blocks[toc + 1], Block::PageBreak);
        assert_eq!(doc.blocks[toc + 2].plain_text().as_deref(), Some("Proposal"));
    }

    #[test]
    fn long_bullet_list_without_headers_gets_toc() {
        let body: String = (1..=12).map(|n| format!("- item {n}\n")).collect();
        assert!(is_structured(&body, 500));
        let doc = assemble(
            &[article("s", "t", &body)],
            &ReportConfig::default(),
            now(),
        )
        .unwrap();
        let toc = doc
            .blocks
            .iter()
            .position(|b| matches!(b, Block::Toc { .. }))
            .expect("toc present");
        match &doc.blocks[toc] {
            Block::Toc { entries, .. } => assert!(entries.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(doc.blocks[toc - 1].style(), Some(StyleName::ArticleLink));
        assert_eq!(doc.blocks[toc + 1], Block::PageBreak);
    }

    #[test]
    fn date_formats() {
        assert_eq!(format_date("Mon, 04 Mar 2024 10:00:00 GMT"), "March 04, 2024");
        assert_eq!(format_date("Mon, 04 Mar 2024 10:00:00 +0000"), "March 04, 2024");
        assert_eq!(format_date("2024-03-04"), "March 04, 2024");
        assert_eq!(format_date("04 Mar 2024"), "March 04, 2024");
        assert_eq!(format_date("2024-03-04T10:00:00+00:00"), "March 04, 2024");
        assert_eq!(format_date("sometime soon"), "sometime soon");
        assert_eq!(format_date("No Date"), "No Date");
    }

    #[test]
    fn source_names() {
        assert_eq!(format_source_name("arbitrum_medium"), "Arbitrum Medium");
        assert_eq!(format_source_name("polygon_blog"), "Polygon Blog");
        assert_eq!(format_source_name("base_chain_NEWS"), "Base Chain News");
    }

    #[test]
    fn summary_counts_in_order() {
        let articles = [
            article("flow_blog", "A", "x"),
            article("ethereum_blog", "B", "x"),
            article("flow_blog", "C", "x"),
        ];
        let s = ReportSummary::from_articles(&articles);
        assert_eq!(s.total, 3);
        assert_eq!(
            s.sources,
            vec![("Flow Blog".to_string(), 2), ("Ethereum Blog".to_string(), 1)]
        );
        assert!(s.to_string().contains("Flow Blog: 2"));
    }
}
