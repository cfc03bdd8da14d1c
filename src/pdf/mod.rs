//! PDF renderer for [`RenderedDocument`]s.
//!
//! ## Data Flow
//!
//! ```text
//! RenderedDocument ──▶ paginate ──▶ printpdf ──▶ bytes ──▶ write_pdf
//!  (blocks+styles)     (pages/ops)  (layers)              (temp + persist)
//! ```
//!
//! 1. [`paginate`] wraps text with base-14 metrics, places it on A4 pages,
//!    honours forced breaks and keep-together groups
//! 2. [`render_pdf`] replays each page's operations onto a `printpdf` layer
//!    and adds the link annotations
//! 3. [`write_pdf`] moves the finished bytes onto the output path atomically

pub mod fonts;
pub mod paginate;

use crate::error::ReportError;
use crate::report::RenderedDocument;
use crate::style::{Color, StyleSheet};
use fonts::Font;
use paginate::{LinkArea, Op, PAGE_HEIGHT, PAGE_WIDTH};
use printpdf::{
    Actions, BorderArray, ColorArray, HighlightingMode, IndirectFontRef, Line, LinkAnnotation,
    path::PaintMode, Mm, PdfDocument, PdfLayerReference, Point, Rect, Rgb,
};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tracing::debug;

pub use paginate::{paginate, Page};

const LAYER: &str = "Content";

/// Render `doc` to PDF bytes in memory.
pub fn render_pdf(doc: &RenderedDocument) -> Result<Vec<u8>, ReportError> {
    let pages = paginate(&doc.blocks, StyleSheet::global());
    debug!(pages = pages.len(), blocks = doc.blocks.len(), "paginated");

    let render_err = |e: printpdf::Error| ReportError::RenderFailed(e.to_string());
    let (pdf, first_page, first_layer) =
        PdfDocument::new(&doc.title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER);

    let mut fonts = HashMap::new();
    for font in Font::ALL {
        fonts.insert(font, pdf.add_builtin_font(font.builtin()).map_err(render_err)?);
    }

    for (index, page) in pages.iter().enumerate() {
        let layer = if index == 0 {
            pdf.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) = pdf.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER);
            pdf.get_page(page_index).get_layer(layer_index)
        };
        draw_page(&layer, page, &fonts);
    }

    pdf.save_to_bytes().map_err(render_err)
}

fn draw_page(layer: &PdfLayerReference, page: &Page, fonts: &HashMap<Font, IndirectFontRef>) {
    for op in &page.ops {
        match op {
            Op::Text {
                x,
                y,
                font,
                size,
                color,
                text,
            } => {
                if let Some(font_ref) = fonts.get(font) {
                    layer.set_fill_color(rgb(*color));
                    layer.use_text(fonts::drawable(text), *size, mm(*x), mm(*y), font_ref);
                }
            }
            Op::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => {
                let mode = match (fill, stroke) {
                    (Some(_), Some(_)) => PaintMode::FillStroke,
                    (Some(_), None) => PaintMode::Fill,
                    (None, Some(_)) => PaintMode::Stroke,
                    (None, None) => continue,
                };
                if let Some(fill) = fill {
                    layer.set_fill_color(rgb(*fill));
                }
                if let Some((color, width)) = stroke {
                    layer.set_outline_color(rgb(*color));
                    layer.set_outline_thickness(*width);
                }
                layer.add_rect(
                    Rect::new(mm(*x), mm(*y), mm(x + width), mm(y + height)).with_mode(mode),
                );
            }
            Op::Line {
                from,
                to,
                color,
                width,
            } => {
                layer.set_outline_color(rgb(*color));
                layer.set_outline_thickness(*width);
                layer.add_line(Line {
                    points: vec![
                        (Point::new(mm(from.0), mm(from.1)), false),
                        (Point::new(mm(to.0), mm(to.1)), false),
                    ],
                    is_closed: false,
                });
            }
        }
    }
    for link in &page.links {
        layer.add_link_annotation(link_annotation(link));
    }
}

fn link_annotation(link: &LinkArea) -> LinkAnnotation {
    let [x1, y1, x2, y2] = link.rect;
    LinkAnnotation::new(
        Rect::new(mm(x1), mm(y1), mm(x2), mm(y2)),
        Some(BorderArray::default()),
        Some(ColorArray::default()),
        Actions::uri(link.uri.clone()),
        Some(HighlightingMode::Invert),
    )
}

/// Points to millimetres.
fn mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

fn rgb(c: Color) -> printpdf::Color {
    let (r, g, b) = c.unit();
    printpdf::Color::Rgb(Rgb::new(r, g, b, None))
}

/// Write `bytes` to `path` without ever leaving a partial file there.
///
/// The bytes go to a temp file in the destination directory, which is then
/// renamed over `path`. On error the temp file is removed.
pub fn write_pdf(bytes: &[u8], path: &Path) -> Result<(), ReportError> {
    let write_err = |source| ReportError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".newsreport-")
        .suffix(".pdf.tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
