//! Source documents for dochub.
//!
//! Covers everything between a submodule's glob patterns and an in-memory
//! [`Document`]: enumeration with negated patterns, lexical path
//! normalization, canonical output paths, front matter and MDX stripping.
//!
//! All paths handled here are repository-relative strings with forward
//! slashes. They double as link map keys, so every producer goes through
//! [`normalize_path`].

mod document;
mod enumerate;
mod frontmatter;
mod mdx;
mod paths;

use std::path::PathBuf;

pub use document::Document;
pub use enumerate::enumerate_sources;
pub use frontmatter::{FrontMatter, split_front_matter};
pub use mdx::strip_mdx;
pub use paths::{
    canonical_path, file_stem, join_path, normalize_path, parent_dir, relative_to, to_slash,
};

/// Errors from reading source documents.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid front matter in {path}: {message}")]
    FrontMatter { path: String, message: String },
    #[error("{path} lies outside its source base directory '{base}'")]
    OutsideBase { path: String, base: String },
}
