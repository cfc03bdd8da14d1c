//! Typographic styles for report blocks.
//!
//! Every block in a [`crate::report::RenderedDocument`] names one
//! [`StyleName`]; the renderer resolves it through the process-wide
//! [`StyleSheet`]. The table is built once on first use and never mutated,
//! so per-category colours and indents live in one place instead of being
//! repeated at every call site.

use crate::document::classify::SectionCategory;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
        }
    }

    /// Components scaled to `0.0..=1.0`, as PDF colour operators expect.
    pub fn unit(self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

/// Font family plus base weight of a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    Courier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
}

/// Box drawn behind a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub border_width: f32,
    pub border_color: Color,
    pub padding: f32,
    pub background: Option<Color>,
}

/// Typographic attributes of one style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSpec {
    pub font: FontFace,
    pub size: f32,
    /// Baseline-to-baseline distance.
    pub leading: f32,
    pub color: Color,
    pub left_indent: f32,
    pub right_indent: f32,
    pub space_before: f32,
    pub space_after: f32,
    pub alignment: Alignment,
    pub frame: Option<Frame>,
}

impl StyleSpec {
    fn new(font: FontFace, size: f32, color: u32) -> Self {
        Self {
            font,
            size,
            leading: size * 1.2,
            color: Color::hex(color),
            left_indent: 0.0,
            right_indent: 0.0,
            space_before: 0.0,
            space_after: 0.0,
            alignment: Alignment::Left,
            frame: None,
        }
    }

    fn spacing(mut self, before: f32, after: f32) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }

    fn indent(mut self, left: f32, right: f32) -> Self {
        self.left_indent = left;
        self.right_indent = right;
        self
    }

    fn leading(mut self, leading: f32) -> Self {
        self.leading = leading;
        self
    }

    fn centered(mut self) -> Self {
        self.alignment = Alignment::Center;
        self
    }

    fn framed(mut self, width: f32, border: u32, padding: f32, background: Option<u32>) -> Self {
        self.frame = Some(Frame {
            border_width: width,
            border_color: Color::hex(border),
            padding,
            background: background.map(Color::hex),
        });
        self
    }
}

/// Every style the layout engine and report assembler can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleName {
    ReportTitle,
    ReportDate,
    SourceHeader,
    ArticleTitle,
    ArticleDate,
    ArticleLink,
    ArticleSummary,
    LongContent,
    SectionHeader,
    ProposalH2,
    ProposalH3,
    H4Header,
    TocTitle,
    BulletList,
    NumberedList,
    Quote,
    Divider,
    ExecutiveSummary,
    Background,
    Objective,
    Methodology,
    ResearchAreas,
    Timeline,
    Investment,
    Deliverable,
}

impl StyleName {
    pub const ALL: [StyleName; 25] = [
        StyleName::ReportTitle,
        StyleName::ReportDate,
        StyleName::SourceHeader,
        StyleName::ArticleTitle,
        StyleName::ArticleDate,
        StyleName::ArticleLink,
        StyleName::ArticleSummary,
        StyleName::LongContent,
        StyleName::SectionHeader,
        StyleName::ProposalH2,
        StyleName::ProposalH3,
        StyleName::H4Header,
        StyleName::TocTitle,
        StyleName::BulletList,
        StyleName::NumberedList,
        StyleName::Quote,
        StyleName::Divider,
        StyleName::ExecutiveSummary,
        StyleName::Background,
        StyleName::Objective,
        StyleName::Methodology,
        StyleName::ResearchAreas,
        StyleName::Timeline,
        StyleName::Investment,
        StyleName::Deliverable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StyleName::ReportTitle => "ReportTitle",
            StyleName::ReportDate => "ReportDate",
            StyleName::SourceHeader => "SourceHeader",
            StyleName::ArticleTitle => "ArticleTitle",
            StyleName::ArticleDate => "ArticleDate",
            StyleName::ArticleLink => "ArticleLink",
            StyleName::ArticleSummary => "ArticleSummary",
            StyleName::LongContent => "LongContent",
            StyleName::SectionHeader => "SectionHeader",
            StyleName::ProposalH2 => "ProposalH2",
            StyleName::ProposalH3 => "ProposalH3",
            StyleName::H4Header => "H4Header",
            StyleName::TocTitle => "TocTitle",
            StyleName::BulletList => "BulletList",
            StyleName::NumberedList => "NumberedList",
            StyleName::Quote => "Quote",
            StyleName::Divider => "Divider",
            StyleName::ExecutiveSummary => "ExecutiveSummary",
            StyleName::Background => "Background",
            StyleName::Objective => "Objective",
            StyleName::Methodology => "Methodology",
            StyleName::ResearchAreas => "ResearchAreas",
            StyleName::Timeline => "Timeline",
            StyleName::Investment => "Investment",
            StyleName::Deliverable => "Deliverable",
        }
    }

    /// Paragraph style for a section category.
    ///
    /// Research questions, participants and general prose share the
    /// long-form content style.
    pub fn for_category(category: SectionCategory) -> Self {
        match category {
            SectionCategory::ExecutiveSummary => StyleName::ExecutiveSummary,
            SectionCategory::Background => StyleName::Background,
            SectionCategory::Objective => StyleName::Objective,
            SectionCategory::Methodology => StyleName::Methodology,
            SectionCategory::ResearchAreas => StyleName::ResearchAreas,
            SectionCategory::Timeline => StyleName::Timeline,
            SectionCategory::Investment => StyleName::Investment,
            SectionCategory::Deliverable => StyleName::Deliverable,
            SectionCategory::ResearchQuestions
            | SectionCategory::Participants
            | SectionCategory::General => StyleName::LongContent,
        }
    }
}

impl fmt::Display for StyleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only `StyleName → StyleSpec` table.
#[derive(Debug, Clone)]
pub struct StyleSheet {
    specs: HashMap<StyleName, StyleSpec>,
}

static DEFAULT_SHEET: Lazy<StyleSheet> = Lazy::new(StyleSheet::build_default);

impl StyleSheet {
    /// The process-wide default table.
    pub fn global() -> &'static StyleSheet {
        &DEFAULT_SHEET
    }

    pub fn get(&self, name: StyleName) -> &StyleSpec {
        // `build_default` inserts every variant of `StyleName::ALL`.
        &self.specs[&name]
    }

    fn build_default() -> Self {
        use FontFace::*;

        let body = |color: u32| {
            StyleSpec::new(Helvetica, 11.0, color)
                .spacing(4.0, 6.0)
                .indent(20.0, 0.0)
                .leading(13.0)
        };

        let entries = [
            (
                StyleName::ReportTitle,
                StyleSpec::new(HelveticaBold, 26.0, 0x111827)
                    .spacing(20.0, 10.0)
                    .centered(),
            ),
            (
                StyleName::ReportDate,
                StyleSpec::new(Helvetica, 12.0, 0x6B7280)
                    .spacing(10.0, 25.0)
                    .centered(),
            ),
            (
                StyleName::SourceHeader,
                StyleSpec::new(HelveticaBold, 20.0, 0x1E3A8A).spacing(25.0, 15.0),
            ),
            (
                StyleName::ArticleTitle,
                StyleSpec::new(HelveticaBold, 16.0, 0x7C3AED).spacing(15.0, 10.0),
            ),
            (
                StyleName::ArticleDate,
                StyleSpec::new(Helvetica, 11.0, 0x6B7280).spacing(5.0, 5.0),
            ),
            (
                StyleName::ArticleLink,
                StyleSpec::new(Helvetica, 10.0, 0xF59E0B)
                    .spacing(5.0, 8.0)
                    .indent(20.0, 0.0),
            ),
            (
                StyleName::ArticleSummary,
                StyleSpec::new(Helvetica, 11.0, 0x1F2937)
                    .spacing(8.0, 20.0)
                    .indent(20.0, 0.0)
                    .leading(14.0),
            ),
            (
                StyleName::LongContent,
                StyleSpec::new(Helvetica, 10.0, 0x374151)
                    .spacing(6.0, 12.0)
                    .indent(25.0, 0.0)
                    .leading(13.0),
            ),
            (
                StyleName::SectionHeader,
                StyleSpec::new(HelveticaBold, 13.0, 0x059669).spacing(15.0, 8.0),
            ),
            (
                StyleName::ProposalH2,
                StyleSpec::new(HelveticaBold, 16.0, 0xFFFFFF)
                    .spacing(20.0, 12.0)
                    .indent(10.0, 0.0)
                    .framed(1.0, 0x047857, 8.0, Some(0x059669)),
            ),
            (
                StyleName::ProposalH3,
                StyleSpec::new(HelveticaBold, 14.0, 0xDC2626)
                    .spacing(15.0, 8.0)
                    .indent(15.0, 0.0),
            ),
            (
                StyleName::H4Header,
                StyleSpec::new(HelveticaBold, 12.0, 0x7C2D12).spacing(12.0, 6.0),
            ),
            (
                StyleName::TocTitle,
                StyleSpec::new(HelveticaBold, 22.0, 0x111827)
                    .spacing(20.0, 10.0)
                    .centered(),
            ),
            (
                StyleName::BulletList,
                StyleSpec::new(Helvetica, 10.0, 0x374151)
                    .spacing(2.0, 3.0)
                    .indent(35.0, 0.0)
                    .leading(12.0),
            ),
            (
                StyleName::NumberedList,
                StyleSpec::new(Helvetica, 10.0, 0x374151)
                    .spacing(2.0, 4.0)
                    .indent(30.0, 0.0)
                    .leading(12.0),
            ),
            (
                StyleName::Quote,
                StyleSpec::new(HelveticaOblique, 10.0, 0x4F46E5)
                    .spacing(8.0, 10.0)
                    .indent(30.0, 25.0)
                    .leading(13.0)
                    .framed(2.0, 0x6366F1, 10.0, Some(0xEEF2FF)),
            ),
            (
                StyleName::Divider,
                StyleSpec::new(Helvetica, 10.0, 0x9CA3AF).indent(25.0, 0.0),
            ),
            (
                StyleName::ExecutiveSummary,
                StyleSpec::new(Helvetica, 11.0, 0x1E40AF)
                    .spacing(10.0, 15.0)
                    .indent(20.0, 20.0)
                    .leading(14.0)
                    .framed(2.0, 0x3B82F6, 12.0, Some(0xEFF6FF)),
            ),
            (StyleName::Background, body(0x1E40AF).spacing(6.0, 8.0)),
            (
                StyleName::Objective,
                body(0x166534)
                    .spacing(6.0, 8.0)
                    .indent(25.0, 15.0)
                    .framed(1.0, 0x10B981, 8.0, Some(0xF0FDF4)),
            ),
            (StyleName::Methodology, body(0x7C2D12)),
            (StyleName::ResearchAreas, body(0x7C2D12)),
            (StyleName::Timeline, body(0x059669)),
            (StyleName::Investment, body(0xDC2626)),
            (StyleName::Deliverable, body(0x9D174D)),
        ];

        Self {
            specs: entries.into_iter().collect(),
        }
    }
}
