//! Pagination: blocks → positioned drawing operations per page.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner.
//! A cursor walks down from the top margin; text is wrapped greedily at
//! whitespace using the base-14 advance widths.

use super::fonts::Font;
use crate::document::inline::{RichText, Span};
use crate::document::layout::{Block, TocEntry, BULLET_PREFIX};
use crate::style::{Alignment, Color, FontFace, StyleName, StyleSheet, StyleSpec};

pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN: f32 = 50.0;

const TOP: f32 = PAGE_HEIGHT - MARGIN;
const BOTTOM: f32 = MARGIN;
const CONTENT_HEIGHT: f32 = TOP - BOTTOM;
const MIN_TEXT_WIDTH: f32 = 72.0;

const LINK_COLOR: Color = Color::hex(0x2563EB);
const TOC_LEVEL_INDENT: f32 = 12.0;
const TOC_TITLE_SPACING: f32 = 15.0;
const TOC_END_SPACING: f32 = 20.0;

/// One drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Text {
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Color,
        text: String,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Color>,
        stroke: Option<(Color, f32)>,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        color: Color,
        width: f32,
    },
}

/// A clickable area pointing at a URI.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkArea {
    /// `[x1, y1, x2, y2]`
    pub rect: [f32; 4],
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<Op>,
    pub links: Vec<LinkArea>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Concatenated text of every text operation, in drawing order.
    pub fn text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Lay `blocks` out on A4 pages. Always returns at least one page.
pub fn paginate(blocks: &[Block], sheet: &StyleSheet) -> Vec<Page> {
    let mut paginator = Paginator::new();
    for block in blocks {
        for item in prepare(block, sheet) {
            paginator.place(&item);
        }
    }
    paginator.finish()
}

// ── Preparation ──────────────────────────────────────────────────────────

/// A block with its text already wrapped to its column width.
#[derive(Debug)]
enum Prepared<'s> {
    Paragraph(Paragraph<'s>),
    Spacer(f32),
    PageBreak,
    Group(Vec<Prepared<'s>>),
}

impl Prepared<'_> {
    fn height(&self) -> f32 {
        match self {
            Prepared::Paragraph(p) => p.height(),
            Prepared::Spacer(h) => *h,
            Prepared::PageBreak => 0.0,
            Prepared::Group(items) => items.iter().map(Prepared::height).sum(),
        }
    }
}

fn prepare<'s>(block: &Block, sheet: &'s StyleSheet) -> Vec<Prepared<'s>> {
    match block {
        Block::Text {
            text,
            style,
            extra_indent,
        } => vec![Prepared::Paragraph(Paragraph::wrap(
            text,
            sheet.get(*style),
            *extra_indent,
        ))],
        Block::Spacer { height } => vec![Prepared::Spacer(*height)],
        Block::Divider { glyphs } => vec![Prepared::Paragraph(Paragraph::wrap(
            &RichText::plain(glyphs.as_str()),
            sheet.get(StyleName::Divider),
            0.0,
        ))],
        Block::PageBreak => vec![Prepared::PageBreak],
        Block::KeepTogether { blocks } => {
            let items = blocks.iter().flat_map(|b| prepare(b, sheet)).collect();
            vec![Prepared::Group(items)]
        }
        Block::Toc { title, entries } => prepare_toc(title, entries, sheet),
    }
}

fn prepare_toc<'s>(title: &str, entries: &[TocEntry], sheet: &'s StyleSheet) -> Vec<Prepared<'s>> {
    let mut items = vec![
        Prepared::Paragraph(Paragraph::wrap(
            &RichText::plain(title),
            sheet.get(StyleName::TocTitle),
            0.0,
        )),
        Prepared::Spacer(TOC_TITLE_SPACING),
    ];
    for entry in entries {
        let indent = entry.level.saturating_sub(1) as f32 * TOC_LEVEL_INDENT;
        items.push(Prepared::Paragraph(Paragraph::wrap(
            &RichText::plain(entry.text.as_str()).prefixed(BULLET_PREFIX),
            sheet.get(entry.style()),
            indent,
        )));
    }
    items.push(Prepared::Spacer(TOC_END_SPACING));
    items
}

/// Visual attributes shared by a run of characters.
#[derive(Debug, Clone, PartialEq)]
struct RunStyle {
    font: Font,
    size: f32,
    color: Color,
    link: Option<String>,
}

#[derive(Debug, Clone)]
struct Run {
    text: String,
    style: RunStyle,
    width: f32,
}

#[derive(Debug, Default)]
struct Line {
    runs: Vec<Run>,
    width: f32,
}

impl Line {
    fn push(&mut self, text: &str, style: &RunStyle) {
        let width = style.font.text_width(text, style.size);
        self.width += width;
        match self.runs.last_mut() {
            Some(last) if last.style == *style => {
                last.text.push_str(text);
                last.width += width;
            }
            _ => self.runs.push(Run {
                text: text.to_string(),
                style: style.clone(),
                width,
            }),
        }
    }
}

/// Characters between two whitespace gaps, possibly across style changes.
type Word = Vec<(String, RunStyle)>;

#[derive(Debug)]
struct Paragraph<'s> {
    spec: &'s StyleSpec,
    lines: Vec<Line>,
    left: f32,
    width: f32,
}

impl<'s> Paragraph<'s> {
    fn wrap(text: &RichText, spec: &'s StyleSpec, extra_indent: f32) -> Self {
        let padding = spec.frame.map(|f| f.padding).unwrap_or(0.0);
        let left = MARGIN + spec.left_indent + extra_indent + padding;
        let right = PAGE_WIDTH - MARGIN - spec.right_indent - padding;
        let width = (right - left).max(MIN_TEXT_WIDTH);

        let mut lines = Vec::new();
        let mut line = Line::default();
        for word in split_words(text.spans(), spec) {
            let word_width: f32 = word
                .iter()
                .map(|(t, s)| s.font.text_width(t, s.size))
                .sum();
            if let Some(prev) = line.runs.last() {
                let gap_style = gap_style(&prev.style, &word[0].1);
                let gap = gap_style.font.text_width(" ", gap_style.size);
                if line.width + gap + word_width <= width {
                    line.push(" ", &gap_style);
                    for (t, s) in &word {
                        line.push(t, s);
                    }
                    continue;
                }
                lines.push(std::mem::take(&mut line));
            }
            if word_width <= width {
                for (t, s) in &word {
                    line.push(t, s);
                }
            } else {
                for piece in hard_break(&word, width) {
                    if !line.runs.is_empty() {
                        lines.push(std::mem::take(&mut line));
                    }
                    line = piece;
                }
            }
        }
        if !line.runs.is_empty() {
            lines.push(line);
        }

        Self {
            spec,
            lines,
            left,
            width,
        }
    }

    fn padding(&self) -> f32 {
        self.spec.frame.map(|f| f.padding).unwrap_or(0.0)
    }

    fn height(&self) -> f32 {
        self.spec.space_before
            + self.lines.len() as f32 * self.spec.leading
            + 2.0 * self.padding()
            + self.spec.space_after
    }
}

fn run_style(span: &Span, spec: &StyleSpec) -> RunStyle {
    let font = if span.emphasis.code {
        Font::Courier
    } else {
        match spec.font {
            FontFace::Courier => Font::Courier,
            face => Font::helvetica(
                face == FontFace::HelveticaBold || span.emphasis.bold,
                face == FontFace::HelveticaOblique || span.emphasis.italic,
            ),
        }
    };
    RunStyle {
        font,
        size: spec.size,
        color: if span.link.is_some() {
            LINK_COLOR
        } else {
            spec.color
        },
        link: span.link.clone(),
    }
}

/// Style of the space between two words. A space inside one link belongs to
/// the link; a space leaving a link does not.
fn gap_style(prev: &RunStyle, next: &RunStyle) -> RunStyle {
    if prev.link.is_none() || prev.link == next.link {
        prev.clone()
    } else {
        next.clone()
    }
}

fn split_words(spans: &[Span], spec: &StyleSpec) -> Vec<Word> {
    let mut words = Vec::new();
    let mut word: Word = Vec::new();
    for span in spans {
        let style = run_style(span, spec);
        for c in span.text.chars() {
            if c.is_whitespace() {
                if !word.is_empty() {
                    words.push(std::mem::take(&mut word));
                }
                continue;
            }
            match word.last_mut() {
                Some((text, s)) if *s == style => text.push(c),
                _ => word.push((c.to_string(), style.clone())),
            }
        }
    }
    if !word.is_empty() {
        words.push(word);
    }
    words
}

/// Split a word wider than `width` into lines at character boundaries.
fn hard_break(word: &Word, width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut line = Line::default();
    let mut buf = [0u8; 4];
    for (text, style) in word {
        for c in text.chars() {
            let ch: &str = c.encode_utf8(&mut buf);
            let w = style.font.text_width(ch, style.size);
            if !line.runs.is_empty() && line.width + w > width {
                lines.push(std::mem::take(&mut line));
            }
            line.push(ch, style);
        }
    }
    if !line.runs.is_empty() {
        lines.push(line);
    }
    lines
}

// ── Placement ────────────────────────────────────────────────────────────

struct Paginator {
    pages: Vec<Page>,
    current: Page,
    y: f32,
}

/// A boxed paragraph's extent on one page.
struct Fragment {
    op_index: usize,
    top: f32,
}

impl Paginator {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Page::default(),
            y: TOP,
        }
    }

    fn remaining(&self) -> f32 {
        self.y - BOTTOM
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = TOP;
    }

    fn place(&mut self, item: &Prepared<'_>) {
        match item {
            Prepared::Paragraph(p) => self.place_paragraph(p),
            Prepared::Spacer(h) => {
                if self.current.is_empty() {
                    return;
                }
                if *h >= self.remaining() {
                    self.new_page();
                } else {
                    self.y -= h;
                }
            }
            Prepared::PageBreak => {
                if !self.current.is_empty() {
                    self.new_page();
                }
            }
            Prepared::Group(items) => {
                let height = item.height();
                if height > self.remaining()
                    && height <= CONTENT_HEIGHT
                    && !self.current.is_empty()
                {
                    self.new_page();
                }
                for inner in items {
                    self.place(inner);
                }
            }
        }
    }

    fn place_paragraph(&mut self, p: &Paragraph<'_>) {
        let spec = p.spec;
        let padding = p.padding();

        if !self.current.is_empty() {
            if spec.space_before + 2.0 * padding + spec.leading > self.remaining() {
                self.new_page();
            } else {
                self.y -= spec.space_before;
            }
        }

        let mut fragment = self.open_fragment(padding);
        for line in &p.lines {
            if self.y - spec.leading < BOTTOM + padding {
                self.close_fragment(fragment, p);
                self.new_page();
                fragment = self.open_fragment(padding);
            }
            let baseline = self.y - spec.size;
            self.draw_line(line, p, baseline);
            self.y -= spec.leading;
        }
        self.close_fragment(fragment, p);

        self.y = (self.y - spec.space_after).max(BOTTOM);
    }

    fn open_fragment(&mut self, padding: f32) -> Fragment {
        let fragment = Fragment {
            op_index: self.current.ops.len(),
            top: self.y,
        };
        self.y -= padding;
        fragment
    }

    /// Finish a fragment, inserting its box underneath the text drawn since
    /// it opened.
    fn close_fragment(&mut self, fragment: Fragment, p: &Paragraph<'_>) {
        let padding = p.padding();
        self.y -= padding;
        let Some(frame) = p.spec.frame else {
            return;
        };
        if self.current.ops.len() == fragment.op_index {
            return;
        }
        let stroke = (frame.border_width > 0.0).then_some((frame.border_color, frame.border_width));
        self.current.ops.insert(
            fragment.op_index,
            Op::Rect {
                x: p.left - padding,
                y: self.y,
                width: p.width + 2.0 * padding,
                height: fragment.top - self.y,
                fill: frame.background,
                stroke,
            },
        );
    }

    fn draw_line(&mut self, line: &Line, p: &Paragraph<'_>, baseline: f32) {
        let mut x = match p.spec.alignment {
            Alignment::Left => p.left,
            Alignment::Center => p.left + ((p.width - line.width) / 2.0).max(0.0),
        };
        for run in &line.runs {
            self.current.ops.push(Op::Text {
                x,
                y: baseline,
                font: run.style.font,
                size: run.style.size,
                color: run.style.color,
                text: run.text.clone(),
            });
            if let Some(uri) = &run.style.link {
                let underline = baseline - 1.5;
                self.current.ops.push(Op::Line {
                    from: (x, underline),
                    to: (x + run.width, underline),
                    color: run.style.color,
                    width: 0.5,
                });
                self.current.links.push(LinkArea {
                    rect: [x, baseline - 3.0, x + run.width, baseline + run.style.size],
                    uri: uri.clone(),
                });
            }
            x += run.width;
        }
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}
