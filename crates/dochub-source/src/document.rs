//! Ingested source documents.

use std::path::Path;

use crate::SourceError;
use crate::frontmatter::{FrontMatter, split_front_matter};
use crate::mdx::strip_mdx;
use crate::paths::{canonical_path, file_stem, normalize_path, parent_dir, relative_to};

/// Default sort position for documents without an `order` field.
pub const DEFAULT_ORDER: i64 = 999;

/// One source file belonging to a submodule.
///
/// `content` is the body without front matter. It is replaced once by
/// snippet inclusion and is read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Repository-relative path, normalized.
    pub original_path: String,
    pub submodule_key: String,
    pub source_base_dir: String,
    /// Output path computed by [`canonical_path`].
    pub canonical_path: String,
    pub content: String,
    pub title: String,
    pub category: String,
    pub order: i64,
    /// Explicit sidebar slug from front matter.
    pub slug: Option<String>,
}

impl Document {
    /// Read and parse a document from disk.
    ///
    /// # Arguments
    ///
    /// * `root` - Repository root
    /// * `original_path` - Path relative to `root`
    /// * `key` - Owning submodule key
    /// * `source_base_dir` - Submodule content root, relative to `root`
    pub fn load(
        root: &Path,
        original_path: &str,
        key: &str,
        source_base_dir: &str,
    ) -> Result<Self, SourceError> {
        let full_path = root.join(original_path);
        let raw = std::fs::read_to_string(&full_path).map_err(|source| SourceError::Io {
            path: full_path,
            source,
        })?;
        Self::parse(original_path, key, source_base_dir, &raw)
    }

    /// Build a document from already-read text.
    ///
    /// A file outside `source_base_dir` has no place under its submodule's
    /// output directory and is rejected with [`SourceError::OutsideBase`].
    pub fn parse(
        original_path: &str,
        key: &str,
        source_base_dir: &str,
        raw: &str,
    ) -> Result<Self, SourceError> {
        let original_path = normalize_path(original_path);
        let source_base_dir = normalize_path(source_base_dir);
        let rel = relative_to(&source_base_dir, &original_path);
        if rel == ".." || rel.starts_with("../") {
            return Err(SourceError::OutsideBase {
                path: original_path,
                base: source_base_dir,
            });
        }

        let (yaml, body) = split_front_matter(raw);
        let front_matter = match yaml {
            Some(yaml) => FrontMatter::parse(yaml).map_err(|e| SourceError::FrontMatter {
                path: original_path.clone(),
                message: e.to_string(),
            })?,
            None => FrontMatter::default(),
        };

        let content = if original_path.ends_with(".mdx") {
            strip_mdx(body)
        } else {
            body.to_owned()
        };

        let title = front_matter
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| fallback_title(&original_path, &source_base_dir, key));

        Ok(Self {
            canonical_path: canonical_path(key, &source_base_dir, &original_path),
            submodule_key: key.to_owned(),
            content,
            title,
            category: front_matter.category.unwrap_or_else(|| key.to_owned()),
            order: front_matter.order.unwrap_or(DEFAULT_ORDER),
            slug: front_matter.slug,
            original_path,
            source_base_dir,
        })
    }

    /// Return the document with its body replaced.
    #[must_use]
    pub fn with_content(mut self, content: String) -> Self {
        self.content = content;
        self
    }

    /// Directory of the original file, used to resolve relative references.
    pub fn original_dir(&self) -> &str {
        parent_dir(&self.original_path)
    }
}

/// Title from the file name: `-` and `_` become spaces. Index pages take
/// the name of their directory, or the submodule key at the content root.
fn fallback_title(original_path: &str, source_base_dir: &str, key: &str) -> String {
    let stem = file_stem(original_path);
    let name = if stem.eq_ignore_ascii_case("index") || stem.eq_ignore_ascii_case("readme") {
        let dir = parent_dir(original_path);
        if dir.is_empty() || dir == source_base_dir.trim_end_matches('/') {
            key
        } else {
            dir.rsplit('/').next().unwrap_or(key)
        }
    } else {
        stem
    };
    name.replace(['-', '_'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    static_assertions::assert_impl_all!(Document: Send, Sync);

    #[test]
    fn test_parse_with_front_matter() {
        let raw = "---\ntitle: Installing\ncategory: Guides\norder: 2\n---\n# Install\n";
        let doc = Document::parse("docs/x/guide/install.md", "x", "docs/x", raw).unwrap();

        assert_eq!(doc.original_path, "docs/x/guide/install.md");
        assert_eq!(doc.canonical_path, "x/guide/install.md");
        assert_eq!(doc.title, "Installing");
        assert_eq!(doc.category, "Guides");
        assert_eq!(doc.order, 2);
        assert_eq!(doc.content, "# Install\n");
        assert_eq!(doc.original_dir(), "docs/x/guide");
    }

    #[test]
    fn test_parse_fallbacks() {
        let doc = Document::parse("./docs/x/getting_started-guide.md", "x", "docs/x/", "Body").unwrap();
        assert_eq!(doc.original_path, "docs/x/getting_started-guide.md");
        assert_eq!(doc.source_base_dir, "docs/x/");
        assert_eq!(doc.title, "getting started guide");
        assert_eq!(doc.category, "x");
        assert_eq!(doc.order, DEFAULT_ORDER);
        assert_eq!(doc.slug, None);
    }

    #[test]
    fn test_index_title_fallback() {
        let nested = Document::parse("docs/x/wallets/index.md", "x", "docs/x", "").unwrap();
        assert_eq!(nested.title, "wallets");

        let root = Document::parse("docs/x/README.md", "sdk-docs", "docs/x", "").unwrap();
        assert_eq!(root.title, "sdk docs");
    }

    #[test]
    fn test_mdx_is_stripped() {
        let raw = "---\ntitle: T\n---\nimport X from './x';\n<X />\nText\n";
        let doc = Document::parse("docs/x/page.mdx", "x", "docs/x", raw).unwrap();
        assert_eq!(doc.canonical_path, "x/page.md");
        assert_eq!(doc.content, "<!-- X component here -->\nText\n");
    }

    #[test]
    fn test_invalid_front_matter() {
        let raw = "---\ntitle: [broken\n---\nBody";
        let err = Document::parse("docs/x/a.md", "x", "docs/x", raw).unwrap_err();
        assert!(matches!(err, SourceError::FrontMatter { ref path, .. } if path == "docs/x/a.md"));
    }

    #[test]
    fn test_document_outside_base_is_rejected() {
        for (path, base) in [
            ("docs/other/a.md", "docs/x/src"),
            ("a.md", "docs/x/src/deep"),
            ("../outside.md", ""),
        ] {
            let err = Document::parse(path, "x", base, "# A\n").unwrap_err();
            assert!(
                matches!(err, SourceError::OutsideBase { .. }),
                "{path} under {base}: {err}"
            );
        }
    }

    #[test]
    fn test_document_at_base_root_is_accepted() {
        let doc = Document::parse("docs/x/src/a.md", "x", "docs/x/src/", "# A\n").unwrap();
        assert_eq!(doc.canonical_path, "x/a.md");
    }

    #[test]
    fn test_load_from_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("docs/x")).unwrap();
        std::fs::write(temp_dir.path().join("docs/x/a.md"), "# A").unwrap();

        let doc = Document::load(temp_dir.path(), "docs/x/a.md", "x", "docs/x").unwrap();
        assert_eq!(doc.content, "# A");

        let err = Document::load(temp_dir.path(), "docs/x/missing.md", "x", "docs/x").unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
