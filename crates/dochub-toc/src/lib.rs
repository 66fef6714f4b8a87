//! Table of contents parsing.
//!
//! Two source formats are normalized into one [`TocNode`] tree:
//!
//! - [`OutlineParser`]: mdBook-style `SUMMARY.md` outlines built from
//!   headings and indented link bullets.
//! - [`parse_structured`]: VitePress-style sidebar definitions, either as
//!   JSON or as the `sidebar:` literal of a `config.ts` module.
//!
//! Consumers never need to know which format a tree came from.

mod literal;
mod node;
mod outline;
mod structured;

pub use literal::{extract_sidebar_literal, js_literal_to_json};
pub use node::{TocKind, TocNode};
pub use outline::{OutlineParser, parse_outline};
pub use structured::{SidebarItem, normalize_link, parse_structured, parse_structured_source};

/// Errors from reading a structured table of contents.
#[derive(Debug, thiserror::Error)]
pub enum TocError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid sidebar JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No sidebar definition found")]
    MissingSidebar,
    #[error("Unbalanced sidebar literal starting at byte {0}")]
    Unbalanced(usize),
    #[error("Unsupported expression in sidebar literal: {0}")]
    Unsupported(String),
}
