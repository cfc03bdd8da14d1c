//! Layout engine: styled, grouped blocks from tokenized elements.
//!
//! Element → block mapping:
//!
//! | Element | Style |
//! |---------|-------|
//! | `Header` level 1 / 2 / 3 / 4 | `ArticleTitle` / `ProposalH2` / `ProposalH3` / `H4Header` |
//! | `Paragraph` | by [`SectionCategory`], `LongContent` fallback |
//! | `ListItem` | `BulletList`, one indent step per nesting level |
//! | `NumberedItem` | `NumberedList`, prefixed with the source number |
//! | `Quote` | `Quote`, prefixed with an opening quote mark |
//! | `Rule` | spacer, divider glyphs, spacer |
//!
//! Non-header blocks between two headers form one keep-together group. Headers
//! themselves stay outside the groups so the renderer can break before them.

use super::inline::{format_inline, RichText};
use super::tokenize::ContentElement;
use crate::style::StyleName;
use serde::{Deserialize, Serialize};

/// Documents with more elements than this get a table of contents.
pub const DEFAULT_TOC_THRESHOLD: usize = 10;

/// Extra left indent per observed list nesting level, in points.
pub const LIST_INDENT_STEP: f32 = 15.0;

pub const BULLET_PREFIX: &str = "\u{2022} ";
pub const QUOTE_PREFIX: &str = "\u{201C} ";
pub const DIVIDER_GLYPH: char = '\u{2500}';
pub const DIVIDER_WIDTH: usize = 60;
pub const TOC_TITLE: &str = "Table of Contents";

const RULE_SPACING: f32 = 10.0;

/// One unit handed to the PDF renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// A wrapped paragraph in a named style.
    Text {
        text: RichText,
        style: StyleName,
        /// Added to the style's own left indent.
        #[serde(default)]
        extra_indent: f32,
    },
    /// Vertical gap in points.
    Spacer { height: f32 },
    /// A horizontal run of divider glyphs.
    Divider { glyphs: String },
    /// Title plus one line per header, in document order.
    Toc {
        title: String,
        entries: Vec<TocEntry>,
    },
    PageBreak,
    /// Blocks that must not be split across a page boundary.
    KeepTogether { blocks: Vec<Block> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub text: String,
    pub level: u8,
}

impl TocEntry {
    /// Entry style: top-level headers stand out, deeper ones recede.
    pub fn style(&self) -> StyleName {
        match self.level {
            1 => StyleName::ArticleTitle,
            2 => StyleName::SectionHeader,
            _ => StyleName::LongContent,
        }
    }
}

impl Block {
    pub fn text(text: impl Into<RichText>, style: StyleName) -> Self {
        Block::Text {
            text: text.into(),
            style,
            extra_indent: 0.0,
        }
    }

    pub fn spacer(height: f32) -> Self {
        Block::Spacer { height }
    }

    /// The block's style, for text blocks.
    pub fn style(&self) -> Option<StyleName> {
        match self {
            Block::Text { style, .. } => Some(*style),
            _ => None,
        }
    }

    /// Plain text of a text block.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            Block::Text { text, .. } => Some(text.plain_text()),
            _ => None,
        }
    }
}

/// Knobs of [`layout_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    /// A table of contents is emitted when the element count is strictly
    /// greater than this.
    pub toc_threshold: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            toc_threshold: DEFAULT_TOC_THRESHOLD,
        }
    }
}

/// Lay out `elements` with the default options.
pub fn layout(elements: &[ContentElement]) -> Vec<Block> {
    layout_with(elements, &LayoutOptions::default())
}

pub fn layout_with(elements: &[ContentElement], options: &LayoutOptions) -> Vec<Block> {
    let mut out = Vec::new();

    // A long body gets a contents page even when it has no headers.
    if elements.len() > options.toc_threshold {
        out.push(Block::Toc {
            title: TOC_TITLE.to_string(),
            entries: toc_entries(elements),
        });
        out.push(Block::PageBreak);
    }

    let mut section: Vec<Block> = Vec::new();
    let mut lists = ListNesting::default();

    for element in elements {
        if !matches!(element, ContentElement::ListItem { .. }) {
            lists.reset();
        }

        match element {
            ContentElement::Header { text, level, .. } => {
                flush_section(&mut section, &mut out);
                out.push(Block::text(format_inline(text), header_style(*level)));
            }
            ContentElement::Paragraph { text, category } => {
                section.push(Block::text(
                    format_inline(text),
                    StyleName::for_category(*category),
                ));
            }
            ContentElement::ListItem { text, indent } => {
                let depth = lists.depth_for(*indent);
                section.push(Block::Text {
                    text: format_inline(text).prefixed(BULLET_PREFIX),
                    style: StyleName::BulletList,
                    extra_indent: depth as f32 * LIST_INDENT_STEP,
                });
            }
            ContentElement::NumberedItem { text, number } => {
                section.push(Block::text(
                    format_inline(text).prefixed(&format!("{number}. ")),
                    StyleName::NumberedList,
                ));
            }
            ContentElement::Quote { text } => {
                section.push(Block::text(
                    format_inline(text).prefixed(QUOTE_PREFIX),
                    StyleName::Quote,
                ));
            }
            ContentElement::Rule => {
                section.push(Block::spacer(RULE_SPACING));
                section.push(Block::Divider {
                    glyphs: DIVIDER_GLYPH.to_string().repeat(DIVIDER_WIDTH),
                });
                section.push(Block::spacer(RULE_SPACING));
            }
        }
    }

    flush_section(&mut section, &mut out);
    out
}

fn header_style(level: u8) -> StyleName {
    match level {
        0 | 1 => StyleName::ArticleTitle,
        2 => StyleName::ProposalH2,
        3 => StyleName::ProposalH3,
        _ => StyleName::H4Header,
    }
}

fn toc_entries(elements: &[ContentElement]) -> Vec<TocEntry> {
    elements
        .iter()
        .filter_map(|e| match e {
            ContentElement::Header { text, level, .. } => Some(TocEntry {
                text: format_inline(text).plain_text(),
                level: *level,
            }),
            _ => None,
        })
        .collect()
}

fn flush_section(section: &mut Vec<Block>, out: &mut Vec<Block>) {
    if section.is_empty() {
        return;
    }
    out.push(Block::KeepTogether {
        blocks: std::mem::take(section),
    });
}

/// Maps raw leading-whitespace counts of one contiguous list to depths.
///
/// Each distinct deeper indent seen opens one level; returning to a
/// shallower indent closes the levels above it.
#[derive(Default)]
struct ListNesting {
    stack: Vec<usize>,
}

impl ListNesting {
    fn depth_for(&mut self, indent: usize) -> usize {
        while self.stack.last().is_some_and(|&top| top > indent) {
            self.stack.pop();
        }
        if self.stack.last() != Some(&indent) {
            self.stack.push(indent);
        }
        self.stack.len() - 1
    }

    fn reset(&mut self) {
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tokenize::tokenize;

    fn group(block: &Block) -> &[Block] {
        match block {
            Block::KeepTogether { blocks } => blocks,
            other => panic!("expected keep-together group, got {other:?}"),
        }
    }

    #[test]
    fn header_levels_map_to_styles() {
        let blocks = layout(&tokenize("# A\n## B\n### C\n#### D\n##### E"));
        let styles: Vec<_> = blocks.iter().filter_map(Block::style).collect();
        assert_eq!(
            styles,
            vec![
                StyleName::ArticleTitle,
                StyleName::ProposalH2,
                StyleName::ProposalH3,
                StyleName::H4Header,
                StyleName::H4Header,
            ]
        );
    }

    #[test]
    fn paragraphs_take_category_style() {
        let blocks = layout(&tokenize("Our timeline is short.\n\nPlain words."));
        let inner = group(&blocks[0]);
        assert_eq!(inner[0].style(), Some(StyleName::Timeline));
        assert_eq!(inner[1].style(), Some(StyleName::LongContent));
    }

    #[test]
    fn sections_between_headers_are_grouped() {
        let src = "intro\n\n## Objectives\ngoal one\n- a\n- b\n## Timeline\nsoon";
        let blocks = layout(&tokenize(src));
        assert_eq!(blocks.len(), 5);
        assert_eq!(group(&blocks[0]).len(), 1);
        assert_eq!(blocks[1].plain_text().as_deref(), Some("Objectives"));
        assert_eq!(group(&blocks[2]).len(), 3);
        assert_eq!(blocks[3].plain_text().as_deref(), Some("Timeline"));
        assert_eq!(group(&blocks[4]).len(), 1);
    }

    #[test]
    fn consecutive_headers_have_no_empty_group() {
        let blocks = layout(&tokenize("# One\n## Two"));
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.style().is_some()));
    }

    #[test]
    fn nested_bullets_step_once_per_level() {
        let src = "- a\n    - b\n        - c\n    - d\n- e";
        let blocks = layout(&tokenize(src));
        let indents: Vec<f32> = group(&blocks[0])
            .iter()
            .map(|b| match b {
                Block::Text { extra_indent, .. } => *extra_indent,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        let step = LIST_INDENT_STEP;
        assert_eq!(indents, vec![0.0, step, 2.0 * step, step, 0.0]);
    }

    #[test]
    fn list_nesting_restarts_after_prose() {
        let blocks = layout(&tokenize("  - indented first\n\ntext\n\n    - again"));
        for b in group(&blocks[0]) {
            if let Block::Text { extra_indent, .. } = b {
                assert_eq!(*extra_indent, 0.0);
            }
        }
    }

    #[test]
    fn bullets_numbers_and_quotes_get_prefixes() {
        let blocks = layout(&tokenize("- item\n3. third\n> said"));
        let texts: Vec<String> = group(&blocks[0])
            .iter()
            .filter_map(Block::plain_text)
            .collect();
        assert_eq!(texts, vec!["\u{2022} item", "3. third", "\u{201C} said"]);
    }

    #[test]
    fn rule_is_spacer_divider_spacer() {
        let blocks = layout(&tokenize("---"));
        let inner = group(&blocks[0]);
        assert!(matches!(inner[0], Block::Spacer { .. }));
        match &inner[1] {
            Block::Divider { glyphs } => assert_eq!(glyphs.chars().count(), DIVIDER_WIDTH),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(inner[2], Block::Spacer { .. }));
    }

    #[test]
    fn inline_markup_is_resolved() {
        let blocks = layout(&tokenize("## **Bold** header"));
        match &blocks[0] {
            Block::Text { text, .. } => {
                assert_eq!(text.plain_text(), "Bold header");
                assert!(text.spans()[0].emphasis.bold);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    fn long_doc() -> Vec<ContentElement> {
        let mut src = String::from("# Proposal\n\n## Executive Summary\n\nshort\n\n");
        for i in 0..5 {
            src.push_str(&format!("### Part {i}\n\nbody {i}\n\n"));
        }
        tokenize(&src)
    }

    #[test]
    fn toc_precedes_content_and_forces_break() {
        let elements = long_doc();
        assert!(elements.len() > DEFAULT_TOC_THRESHOLD);
        let blocks = layout(&elements);
        match &blocks[0] {
            Block::Toc { title, entries } => {
                assert_eq!(title, TOC_TITLE);
                assert_eq!(entries.len(), 7);
                assert_eq!(entries[0].level, 1);
                assert_eq!(entries[0].style(), StyleName::ArticleTitle);
                assert_eq!(entries[1].text, "Executive Summary");
                assert_eq!(entries[1].style(), StyleName::SectionHeader);
                assert_eq!(entries[2].style(), StyleName::LongContent);
            }
            other => panic!("expected TOC, got {other:?}"),
        }
        assert_eq!(blocks[1], Block::PageBreak);
        assert_eq!(blocks[2].plain_text().as_deref(), Some("Proposal"));
    }

    #[test]
    fn no_toc_at_threshold() {
        let elements: Vec<ContentElement> = tokenize(&"# h\n\np\n\n".repeat(5));
        assert_eq!(elements.len(), DEFAULT_TOC_THRESHOLD);
        let blocks = layout(&elements);
        assert!(!blocks.iter().any(|b| matches!(b, Block::Toc { .. })));
    }

    #[test]
    fn headerless_long_body_still_gets_toc() {
        let src: String = (1..=12).map(|n| format!("- item {n}\n")).collect();
        let elements = tokenize(&src);
        assert_eq!(elements.len(), 12);
        let blocks = layout(&elements);
        match &blocks[0] {
            Block::Toc { title, entries } => {
                assert_eq!(title, TOC_TITLE);
                assert!(entries.is_empty());
            }
            other => panic!("expected TOC, got {other:?}"),
        }
        assert_eq!(blocks[1], Block::PageBreak);
        assert_eq!(group(&blocks[2]).len(), 12);
    }

    #[test]
    fn rules_count_toward_toc_threshold() {
        // Ten paragraphs sit at the threshold; one rule tips it over.
        let mut src: String = (0..10).map(|n| format!("para {n}\n\n")).collect();
        assert!(!layout(&tokenize(&src))
            .iter()
            .any(|b| matches!(b, Block::Toc { .. })));

        src.push_str("---\n");
        let elements = tokenize(&src);
        assert_eq!(elements.len(), DEFAULT_TOC_THRESHOLD + 1);
        assert!(matches!(elements.last(), Some(ContentElement::Rule)));
        let blocks = layout(&elements);
        assert!(matches!(blocks[0], Block::Toc { .. }));
        assert_eq!(blocks[1], Block::PageBreak);
    }

    #[test]
    fn custom_threshold() {
        let elements = tokenize("# a\n\nb");
        let blocks = layout_with(&elements, &LayoutOptions { toc_threshold: 1 });
        assert!(matches!(blocks[0], Block::Toc { .. }));
        assert_eq!(blocks[1], Block::PageBreak);
    }
}
