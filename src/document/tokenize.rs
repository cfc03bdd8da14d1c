//! Line-oriented markdown tokenizer.
//!
//! Turns loosely formatted text (typically an AI-written proposal) into a
//! flat, ordered list of [`ContentElement`]s. It is deliberately forgiving:
//! anything that is not recognised as a block marker is prose, and
//! soft-wrapped prose lines are joined back into one paragraph.
//!
//! ## Line rules
//!
//! Each line is matched against these rules in order; the first match wins:
//!
//! | Rule | Trigger (on the trimmed line) | Emits |
//! |------|-------------------------------|-------|
//! | blank | empty | flushes the paragraph |
//! | header | starts with `#` | `Header`, level = run of `#` (max 4) |
//! | bullet | `-`, `*` or `+` then whitespace | `ListItem`, indent = leading whitespace |
//! | numbered | `<digits>.` then spaces | `NumberedItem` with the literal number |
//! | quote | starts with `> ` | `Quote` |
//! | rule | exactly `---`, `***` or `___` | `Rule` |
//! | text | anything else | appended to the paragraph |

use super::classify::{classify, SectionCategory};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Deepest header level with its own style; deeper headers clamp to it.
pub const MAX_HEADER_LEVEL: u8 = 4;

static RE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*+]\s+").unwrap());
static RE_NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\. +(\S.*)$").unwrap());

/// One block-level piece of a markdown document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentElement {
    Paragraph {
        text: String,
        category: SectionCategory,
    },
    Header {
        text: String,
        level: u8,
        category: SectionCategory,
    },
    ListItem {
        text: String,
        /// Leading whitespace characters on the source line.
        indent: usize,
    },
    NumberedItem {
        text: String,
        /// The number exactly as written, e.g. `"3"` even after `"1"`.
        number: String,
    },
    Quote {
        text: String,
    },
    Rule,
}

impl ContentElement {
    pub fn is_header(&self) -> bool {
        matches!(self, ContentElement::Header { .. })
    }
}

/// Replace literal `\n` / `\t` escape sequences with real whitespace.
///
/// Model output sometimes arrives JSON-escaped, with the two characters
/// `\` `n` where a line break was meant.
pub fn normalise_escapes(raw: &str) -> String {
    raw.replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

/// Split `raw` into typed elements, in source order.
pub fn tokenize(raw: &str) -> Vec<ContentElement> {
    let text = normalise_escapes(raw);
    let mut elements = Vec::new();
    let mut paragraph = ParagraphBuffer::default();

    for original in text.split('\n') {
        let line = original.trim();

        if line.is_empty() {
            paragraph.flush_into(&mut elements);
            continue;
        }

        if line.starts_with('#') {
            paragraph.flush_into(&mut elements);
            let hashes = line.chars().take_while(|&c| c == '#').count();
            let header_text = line[hashes..].trim().to_string();
            let level = hashes.min(MAX_HEADER_LEVEL as usize) as u8;
            let category = classify(&header_text);
            elements.push(ContentElement::Header {
                text: header_text,
                level,
                category,
            });
            continue;
        }

        if let Some(marker) = RE_BULLET.find(line) {
            paragraph.flush_into(&mut elements);
            let indent = original.chars().take_while(|c| c.is_whitespace()).count();
            elements.push(ContentElement::ListItem {
                text: line[marker.end()..].trim().to_string(),
                indent,
            });
            continue;
        }

        if let Some(caps) = RE_NUMBERED.captures(line) {
            paragraph.flush_into(&mut elements);
            elements.push(ContentElement::NumberedItem {
                number: caps[1].to_string(),
                text: caps[2].trim().to_string(),
            });
            continue;
        }

        if let Some(quote) = line.strip_prefix("> ") {
            paragraph.flush_into(&mut elements);
            elements.push(ContentElement::Quote {
                text: quote.trim().to_string(),
            });
            continue;
        }

        if matches!(line, "---" | "***" | "___") {
            paragraph.flush_into(&mut elements);
            elements.push(ContentElement::Rule);
            continue;
        }

        paragraph.push(line);
    }

    paragraph.flush_into(&mut elements);
    elements
}

/// Accumulates soft-wrapped prose lines into one logical paragraph.
#[derive(Default)]
struct ParagraphBuffer {
    text: String,
}

impl ParagraphBuffer {
    fn push(&mut self, line: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(line);
    }

    fn flush_into(&mut self, elements: &mut Vec<ContentElement>) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        let category = classify(&text);
        elements.push(ContentElement::Paragraph { text, category });
    }
}
