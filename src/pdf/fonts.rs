//! Base-14 fonts and their advance widths.
//!
//! Text is drawn with the standard fonts every PDF viewer ships, so nothing
//! is embedded. `printpdf` writes them with WinAnsiEncoding; the layout
//! needs their AFM widths (1/1000 em) to wrap lines before drawing.

use printpdf::BuiltinFont;
use std::borrow::Cow;

/// A concrete font face used on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Font {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    Courier,
}

impl Font {
    pub const ALL: [Font; 5] = [
        Font::Helvetica,
        Font::HelveticaBold,
        Font::HelveticaOblique,
        Font::HelveticaBoldOblique,
        Font::Courier,
    ];

    /// The Helvetica face for a bold/italic combination.
    pub fn helvetica(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Font::Helvetica,
            (true, false) => Font::HelveticaBold,
            (false, true) => Font::HelveticaOblique,
            (true, true) => Font::HelveticaBoldOblique,
        }
    }

    pub fn builtin(self) -> BuiltinFont {
        match self {
            Font::Helvetica => BuiltinFont::Helvetica,
            Font::HelveticaBold => BuiltinFont::HelveticaBold,
            Font::HelveticaOblique => BuiltinFont::HelveticaOblique,
            Font::HelveticaBoldOblique => BuiltinFont::HelveticaBoldOblique,
            Font::Courier => BuiltinFont::Courier,
        }
    }

    /// Advance width of one character, in 1/1000 em.
    pub fn glyph_width(self, c: char) -> u16 {
        let table = match self {
            Font::Courier => return 600,
            Font::Helvetica | Font::HelveticaOblique => &HELVETICA_WIDTHS,
            Font::HelveticaBold | Font::HelveticaBoldOblique => &HELVETICA_BOLD_WIDTHS,
        };
        match c {
            ' '..='~' => table[(c as u32 - 32) as usize],
            '\u{2022}' => 350,
            '\u{2018}'..='\u{201D}' => 333,
            '\u{2013}' => 556,
            '\u{2014}' | '\u{2026}' => 1000,
            '\u{2500}' | '\u{2501}' => table[(b'-' - 32) as usize],
            _ => 556,
        }
    }

    /// Width of `text` at `size` points.
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.glyph_width(c) as u32).sum();
        units as f32 * size / 1000.0
    }
}

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Text as it should be handed to a base-14 font.
///
/// Box-drawing horizontals have no WinAnsi glyph and become `-`.
pub fn drawable(text: &str) -> Cow<'_, str> {
    if text.contains(['\u{2500}', '\u{2501}']) {
        Cow::Owned(text.replace(['\u{2500}', '\u{2501}'], "-"))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths() {
        assert_eq!(Font::Helvetica.glyph_width(' '), 278);
        assert_eq!(Font::Helvetica.glyph_width('W'), 944);
        assert_eq!(Font::HelveticaBold.glyph_width('a'), 556);
        assert_eq!(Font::Courier.glyph_width('i'), 600);
        assert_eq!(Font::Helvetica.glyph_width('\u{2022}'), 350);
        let w = Font::Helvetica.text_width("ab", 10.0);
        assert!((w - 11.12).abs() < 1e-4);
    }

    #[test]
    fn rule_glyphs_measure_and_draw_as_hyphens() {
        assert_eq!(
            Font::Helvetica.glyph_width('\u{2500}'),
            Font::Helvetica.glyph_width('-')
        );
        assert_eq!(drawable("\u{2500}\u{2500}"), "--");
        assert!(matches!(drawable("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn face_selection() {
        assert_eq!(Font::helvetica(true, true), Font::HelveticaBoldOblique);
        assert_eq!(Font::helvetica(false, true).builtin(), BuiltinFont::HelveticaOblique);
        assert_eq!(Font::Courier.builtin(), BuiltinFont::Courier);
    }
}
