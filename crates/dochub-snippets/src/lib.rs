//! Snippet inclusion for documentation sources.
//!
//! [`SnippetIncluder::expand`] replaces include directives in a document
//! body with the referenced code. Failures never abort: each one is
//! replaced by an HTML comment naming the problem.
//!
//! ```text
//! {{#include ../examples/deploy.rs:deploy}}   -> anchor-delimited fragment
//! <<< @/snippets/wallet.ts#connect{ts}          -> region-delimited fragment
//! ```

mod directive;
mod edits;
mod fragment;

use std::path::{Path, PathBuf};

use dochub_source::{join_path, normalize_path, parent_dir};

pub use directive::{LineRange, SnippetDirective, SnippetKind, scan_directives};
pub use edits::SpanEdits;
pub use fragment::{dedent, language_for_extension};

/// Prefix rewrite applied to directive paths before resolution.
///
/// `replacement` is relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCorrection {
    pub prefix: String,
    pub replacement: String,
}

/// Why a directive could not be satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeFailure {
    FileNotFound(String),
    AnchorNotFound { path: String, name: String },
    RegionNotFound { path: String, name: String },
    Unreadable(String),
}

impl IncludeFailure {
    /// HTML comment substituted for the failed directive.
    pub fn placeholder(&self) -> String {
        match self {
            Self::FileNotFound(path) => {
                format!("<!-- INCLUDE-ERROR: File not found '{path}' -->")
            }
            Self::AnchorNotFound { path, name } => {
                format!("<!-- INCLUDE-ERROR: Anchor '{name}' not found in '{path}' -->")
            }
            Self::RegionNotFound { path, name } => {
                format!("<!-- INCLUDE-ERROR: Region '{name}' not found in '{path}' -->")
            }
            Self::Unreadable(path) => {
                format!("<!-- INCLUDE-ERROR: Processing error for '{path}' -->")
            }
        }
    }
}

/// Resolves and expands include directives for one submodule.
#[derive(Debug, Clone)]
pub struct SnippetIncluder {
    root: PathBuf,
    snippet_root: String,
    corrections: Vec<PathCorrection>,
}

impl SnippetIncluder {
    /// Create an includer reading files below the repository `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            snippet_root: String::new(),
            corrections: Vec::new(),
        }
    }

    /// Directory that `@/` and root-relative `/` paths resolve against.
    #[must_use]
    pub fn with_snippet_root(mut self, snippet_root: &str) -> Self {
        self.snippet_root = normalize_path(snippet_root);
        self
    }

    #[must_use]
    pub fn with_path_corrections(mut self, corrections: Vec<PathCorrection>) -> Self {
        self.corrections = corrections;
        self
    }

    /// Repository-relative path a directive refers to.
    ///
    /// Rules, first match wins:
    /// 1. a configured correction prefix is replaced
    /// 2. `/../` is relative to the document (the leading `/` is a typo)
    /// 3. `@/` and `/` are relative to the snippet root
    /// 4. anything else is relative to the document
    pub fn resolve_path(&self, document_path: &str, raw: &str) -> String {
        let raw = raw.trim();
        let doc_dir = parent_dir(document_path);

        if let Some(correction) = self.corrections.iter().find(|c| raw.starts_with(&c.prefix)) {
            let rest = &raw[correction.prefix.len()..];
            return join_path(&correction.replacement, rest);
        }
        if raw.starts_with("/../") {
            return join_path(doc_dir, &raw[1..]);
        }
        if let Some(rest) = raw.strip_prefix("@/").or_else(|| raw.strip_prefix('/')) {
            return join_path(&self.snippet_root, rest);
        }
        join_path(doc_dir, raw)
    }

    /// Replace every directive in `content` with its fragment.
    ///
    /// `document_path` is the repository-relative path of the document.
    pub fn expand(&self, document_path: &str, content: &str) -> String {
        let directives = scan_directives(content);
        if directives.is_empty() {
            return content.to_owned();
        }

        let mut edits = SpanEdits::new();
        for (span, directive) in directives {
            let replacement = match self.include(document_path, &directive) {
                Ok(text) => text,
                Err(failure) => {
                    tracing::warn!(
                        document = %document_path,
                        directive = %directive.relative_path,
                        failure = ?failure,
                        "Snippet include failed"
                    );
                    failure.placeholder()
                }
            };
            edits.add(span, replacement);
        }
        edits.apply(content)
    }

    fn include(
        &self,
        document_path: &str,
        directive: &SnippetDirective,
    ) -> Result<String, IncludeFailure> {
        let resolved = self.resolve_path(document_path, &directive.relative_path);
        let full_path = self.root.join(&resolved);
        if !full_path.is_file() {
            return Err(IncludeFailure::FileNotFound(directive.relative_path.clone()));
        }
        let source = std::fs::read_to_string(&full_path).map_err(|e| {
            tracing::debug!(path = %full_path.display(), error = %e, "Failed to read snippet");
            IncludeFailure::Unreadable(directive.relative_path.clone())
        })?;

        let fragment = match &directive.kind {
            SnippetKind::FullFile => fragment::extract_full(&source),
            SnippetKind::Lines(range) => fragment::extract_lines(&source, *range),
            SnippetKind::Anchor | SnippetKind::Region => {
                let name = directive.selector.clone().unwrap_or_default();
                let region = directive.kind == SnippetKind::Region;
                fragment::extract_named(&source, &name, region).ok_or_else(|| {
                    let path = directive.relative_path.clone();
                    if region {
                        IncludeFailure::RegionNotFound { path, name }
                    } else {
                        IncludeFailure::AnchorNotFound { path, name }
                    }
                })?
            }
        };

        let text = if directive.in_fence {
            fragment
        } else {
            let language = directive
                .language_hint
                .clone()
                .unwrap_or_else(|| language_for_path(&full_path).to_owned());
            format!("```{language}\n{fragment}\n```")
        };
        Ok(indent_continuation(&text, &directive.indent))
    }
}

/// Prefix every line after the first with `indent`. Blank lines stay empty.
fn indent_continuation(text: &str, indent: &str) -> String {
    if indent.is_empty() {
        return text.to_owned();
    }
    let mut lines = text.split('\n');
    let mut out = lines.next().unwrap_or_default().to_owned();
    for line in lines {
        out.push('\n');
        if !line.is_empty() {
            out.push_str(indent);
            out.push_str(line);
        }
    }
    out
}

fn language_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or("text", language_for_extension)
}
