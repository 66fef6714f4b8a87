//! Link resolution and output generation for dochub.
//!
//! This crate provides:
//! - [`LinkMapBuilder`] / [`LinkMap`]: the original-to-canonical path table
//! - [`LinkResolver`]: lookups with fallbacks and deterministic placeholders
//! - [`OutlineRenderer`]: mdBook outline text from a resolved TOC tree
//! - [`SidebarBuilder`]: sidebar link JSON with breadcrumb trails
//! - [`BookWriter`] and [`combine_book`]: offline book output
//! - [`ingest`]: the two-phase pipeline tying it together
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use dochub_config::Config;
//! use dochub_site::{BookWriter, ingest};
//!
//! let config = Config::load(None, None)?;
//! let ingested = ingest(&config)?;
//!
//! let sections = ingested.book_sections(config.outline.indent_width);
//! let pages = ingested.book_pages();
//! BookWriter::new(&config.book, &config.book_dir).write(&sections, &pages)?;
//! # Ok(())
//! # }
//! ```

mod book;
mod combine;
mod link_map;
mod links;
mod pipeline;
mod render;
mod resolver;
mod sidebar;

use std::path::{Path, PathBuf};

pub use book::{BookPage, BookSection, BookWriter, book_toml, readme_text, summary_text};
pub use combine::combine_book;
pub use link_map::{LinkMap, LinkMapBuilder};
pub use links::{relative_link, rewrite_body_links};
pub use pipeline::{Collection, Ingested, Toc, ingest};
pub use render::{LINK_ISSUE_MARKER, OutlineRenderer, flat_entries, resolve_tree};
pub use resolver::{
    LinkResolver, PLACEHOLDER_PREFIX, Resolution, candidates, is_placeholder, sanitize,
};
pub use sidebar::{
    Breadcrumb, CollectionLinks, SidebarBuilder, SidebarLink, SidebarOrder, order_collections,
    write_sidebar_files,
};

/// Structural build failure.
///
/// Per-document, per-link and per-snippet problems never surface here;
/// they are logged and degraded in place.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid sidebar order file {}: {source}", path.display())]
    Order {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid glob pattern: {0}")]
    Pattern(String),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("book.toml serialization failed: {0}")]
    Toml(#[from] toml::ser::Error),
    #[error("No source documents found in any submodule")]
    NoSources,
}

/// Write `content` to `path`, creating parent directories.
pub(crate) fn write_file(path: &Path, content: &str) -> Result<(), BuildError> {
    let io_error = |source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, content).map_err(io_error)
}
