//! Markdown-to-document engine for article bodies.
//!
//! ## Data Flow
//!
//! ```text
//! raw text ──▶ tokenize ──▶ classify ──▶ inline ──▶ layout
//!              (elements)   (category)   (RichText)  (Blocks)
//! ```
//!
//! 1. [`tokenize`] splits text into typed [`ContentElement`]s
//! 2. [`classify`] tags paragraphs and headers with a [`SectionCategory`]
//! 3. [`inline`] turns emphasis markers into [`RichText`] runs
//! 4. [`layout`] resolves styles and emits renderable [`Block`]s, with a
//!    table of contents and keep-together grouping

pub mod classify;
pub mod inline;
pub mod layout;
pub mod tokenize;

pub use classify::{classify, SectionCategory};
pub use inline::{format_inline, Emphasis, RichText, Span};
pub use layout::{layout, layout_with, Block, LayoutOptions, TocEntry};
pub use tokenize::{tokenize, ContentElement};
