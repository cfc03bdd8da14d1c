//! Inline emphasis: `**bold**`, `*italic*`, `` `code` `` and `[label](url)`.
//!
//! The output is a presentation-neutral [`RichText`]: a list of text runs,
//! each carrying bold/italic/code flags and an optional link target. The PDF
//! renderer maps those flags to fonts; nothing here knows about PDF.
//!
//! ## Pass order
//!
//! Passes run in a fixed order so markers never collide:
//! 1. bold: `****x****` first, then `**x**`, then `__x__`
//! 2. italic: single `*x*` / `_x_`, rejected when the marker touches another
//!    marker of the same kind (so a stray `*` left next to a bold span is
//!    never read as italic)
//! 3. inline code: `` `x` ``
//! 4. links: `[label](url)`
//!
//! Each pass only rewrites the text of existing runs and ORs its flag into
//! the matched part, so applying the formatter to its own output changes
//! nothing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_BOLD_QUAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*\*\*(.*?)\*\*\*\*").unwrap());
static RE_BOLD_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static RE_BOLD_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__(.*?)__").unwrap());
static RE_ITALIC_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static RE_ITALIC_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_([^_]+)_").unwrap());
static RE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static RE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

/// Formatting flags of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Emphasis {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

/// A maximal run of text sharing one set of annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub emphasis: Emphasis,
    /// Hyperlink target, when the run is the label of a `[label](url)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Span {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: Emphasis::default(),
            link: None,
        }
    }

    fn same_annotations(&self, other: &Span) -> bool {
        self.emphasis == other.emphasis && self.link == other.link
    }
}

/// Text with bold/italic/code/link annotations over ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    spans: Vec<Span>,
}

/// Parse inline markers in `text`.
pub fn format_inline(text: &str) -> RichText {
    RichText::plain(text).apply_inline()
}

/// Which flag a pass turns on for the matched part of a run.
#[derive(Clone, Copy)]
enum Mark {
    Bold,
    Italic,
    Code,
}

impl RichText {
    /// A single unannotated run. Markers in `text` are kept literally.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::default();
        }
        Self {
            spans: vec![Span::plain(text)],
        }
    }

    /// Build from runs, merging neighbours with identical annotations.
    pub fn from_spans(spans: impl IntoIterator<Item = Span>) -> Self {
        let mut merged: Vec<Span> = Vec::new();
        for span in spans {
            if span.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.same_annotations(&span) => last.text.push_str(&span.text),
                _ => merged.push(span),
            }
        }
        Self { spans: merged }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The text with every annotation dropped.
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Number of characters in [`Self::plain_text`].
    pub fn char_len(&self) -> usize {
        self.spans.iter().map(|s| s.text.chars().count()).sum()
    }

    /// Prepend an unannotated prefix such as a bullet glyph.
    pub fn prefixed(self, prefix: &str) -> Self {
        let mut spans = Vec::with_capacity(self.spans.len() + 1);
        spans.push(Span::plain(prefix));
        spans.extend(self.spans);
        Self::from_spans(spans)
    }

    /// Run every inline pass over the text of each run.
    pub fn apply_inline(self) -> Self {
        let mut spans = self.spans;
        spans = mark_pass(spans, &RE_BOLD_QUAD, Mark::Bold, false);
        spans = mark_pass(spans, &RE_BOLD_STAR, Mark::Bold, false);
        spans = mark_pass(spans, &RE_BOLD_UNDERSCORE, Mark::Bold, false);
        spans = mark_pass(spans, &RE_ITALIC_STAR, Mark::Italic, true);
        spans = mark_pass(spans, &RE_ITALIC_UNDERSCORE, Mark::Italic, true);
        spans = mark_pass(spans, &RE_CODE, Mark::Code, false);
        spans = link_pass(spans);
        Self::from_spans(spans)
    }
}

impl From<&str> for RichText {
    fn from(text: &str) -> Self {
        RichText::plain(text)
    }
}

/// Split every run on `re` matches, flagging capture group 1 with `mark`.
///
/// With `isolated`, a match whose first or last byte is adjacent to the same
/// marker byte is skipped (the `(?<!\*)…(?!\*)` rule). The search then
/// resumes one character later so an inner candidate can still match.
fn mark_pass(spans: Vec<Span>, re: &Regex, mark: Mark, isolated: bool) -> Vec<Span> {
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        let text = span.text.as_str();
        let bytes = text.as_bytes();
        let mut cursor = 0;
        let mut search_from = 0;

        while search_from < text.len() {
            let Some(caps) = re.captures_at(text, search_from) else {
                break;
            };
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            let marker = bytes[whole.start()];
            let touches_marker = isolated
                && ((whole.start() > 0 && bytes[whole.start() - 1] == marker)
                    || bytes.get(whole.end()) == Some(&marker));
            if touches_marker {
                search_from = next_char_boundary(text, whole.start());
                continue;
            }

            push_piece(&mut out, &span, &text[cursor..whole.start()], None);
            push_piece(&mut out, &span, inner.as_str(), Some(mark));
            cursor = whole.end();
            search_from = whole.end().max(whole.start() + 1);
        }
        push_piece(&mut out, &span, &text[cursor..], None);
    }
    out
}

fn link_pass(spans: Vec<Span>) -> Vec<Span> {
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        // Code runs show link syntax literally.
        if span.emphasis.code {
            out.push(span);
            continue;
        }
        let text = span.text.as_str();
        let mut cursor = 0;
        for caps in RE_LINK.captures_iter(text) {
            let (Some(whole), Some(label), Some(url)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            push_piece(&mut out, &span, &text[cursor..whole.start()], None);
            if !label.as_str().is_empty() {
                out.push(Span {
                    text: label.as_str().to_string(),
                    emphasis: span.emphasis,
                    link: Some(url.as_str().trim().to_string()),
                });
            }
            cursor = whole.end();
        }
        push_piece(&mut out, &span, &text[cursor..], None);
    }
    out
}

fn push_piece(out: &mut Vec<Span>, base: &Span, text: &str, mark: Option<Mark>) {
    if text.is_empty() {
        return;
    }
    let mut emphasis = base.emphasis;
    match mark {
        Some(Mark::Bold) => emphasis.bold = true,
        Some(Mark::Italic) => emphasis.italic = true,
        Some(Mark::Code) => emphasis.code = true,
        None => {}
    }
    out.push(Span {
        text: text.to_string(),
        emphasis,
        link: base.link.clone(),
    });
}

fn next_char_boundary(text: &str, from: usize) -> usize {
    let mut i = from + 1;
    while i < text.len() && !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold(text: &str) -> Span {
        Span {
            text: text.into(),
            emphasis: Emphasis {
                bold: true,
                ..Default::default()
            },
            link: None,
        }
    }

    fn italic(text: &str) -> Span {
        Span {
            text: text.into(),
            emphasis: Emphasis {
                italic: true,
                ..Default::default()
            },
            link: None,
        }
    }

    #[test]
    fn bold_star_and_underscore() {
        let rt = format_inline("a **b** and __c__");
        assert_eq!(
            rt.spans(),
            &[
                Span::plain("a "),
                bold("b"),
                Span::plain(" and "),
                bold("c"),
            ]
        );
    }

    #[test]
    fn quadruple_asterisks_are_bold() {
        let rt = format_inline("****Primary Objective:**** understand");
        assert_eq!(
            rt.spans(),
            &[bold("Primary Objective:"), Span::plain(" understand")]
        );
    }

    #[test]
    fn italic_star_and_underscore() {
        let rt = format_inline("*one* then _two_");
        assert_eq!(
            rt.spans(),
            &[italic("one"), Span::plain(" then "), italic("two")]
        );
    }

    #[test]
    fn stray_star_next_to_star_is_not_italic() {
        // `* b*` would pair up, but its opening star sits next to another star.
        let rt = format_inline("a ** b*");
        assert_eq!(rt.plain_text(), "a ** b*");
        assert!(rt.spans().iter().all(|s| !s.emphasis.italic));
    }

    #[test]
    fn snake_case_words_stay_plain_when_unpaired() {
        let rt = format_inline("call get_value now");
        assert_eq!(rt.spans(), &[Span::plain("call get_value now")]);
    }

    #[test]
    fn inline_code() {
        let rt = format_inline("use `wallet.connect()` here");
        assert_eq!(rt.spans().len(), 3);
        assert!(rt.spans()[1].emphasis.code);
        assert_eq!(rt.spans()[1].text, "wallet.connect()");
    }

    #[test]
    fn links_become_annotated_labels() {
        let rt = format_inline("see [the blog](https://blog.ethereum.org) now");
        assert_eq!(rt.plain_text(), "see the blog now");
        let link = &rt.spans()[1];
        assert_eq!(link.text, "the blog");
        assert_eq!(link.link.as_deref(), Some("https://blog.ethereum.org"));
    }

    #[test]
    fn bold_link_keeps_both_annotations() {
        let rt = format_inline("**[docs](https://x.org)**");
        assert_eq!(rt.spans().len(), 1);
        assert!(rt.spans()[0].emphasis.bold);
        assert_eq!(rt.spans()[0].link.as_deref(), Some("https://x.org"));
    }

    #[test]
    fn reapplying_is_idempotent() {
        let once = format_inline("**Bold** then *it* and `c` with [l](u) and ****x****");
        let twice = once.clone().apply_inline();
        assert_eq!(once, twice);
        assert_eq!(once.plain_text(), twice.plain_text());
        assert_eq!(once.plain_text(), "Bold then it and c with l and x");
    }

    #[test]
    fn unicode_around_markers() {
        let rt = format_inline("café **naïve** “quoted”");
        assert_eq!(rt.plain_text(), "café naïve “quoted”");
        assert!(rt.spans()[1].emphasis.bold);
    }

    #[test]
    fn prefixed_merges_with_plain_head() {
        let rt = format_inline("item").prefixed("• ");
        assert_eq!(rt.spans(), &[Span::plain("• item")]);
    }
}
