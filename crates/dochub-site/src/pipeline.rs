//! Two-phase build: ingest every collection, freeze the link map, then
//! resolve and emit.
//!
//! Ingestion of different files runs on the global rayon pool. The
//! [`LinkMap`] only exists once ingestion of every collection has
//! finished, so no lookup can observe a partial table.

use std::path::Path;

use dochub_config::{Config, SubmoduleConfig, SubmoduleKind};
use dochub_snippets::{PathCorrection, SnippetIncluder};
use dochub_source::{Document, SourceError, enumerate_sources, normalize_path, parent_dir};
use dochub_toc::{OutlineParser, TocNode, parse_structured_source};
use rayon::prelude::*;

use crate::book::{BookPage, BookSection};
use crate::link_map::{LinkMap, LinkMapBuilder};
use crate::links::rewrite_body_links;
use crate::render::{OutlineRenderer, flat_entries, resolve_tree};
use crate::resolver::LinkResolver;
use crate::sidebar::{CollectionLinks, SidebarBuilder, SidebarOrder, order_collections};
use crate::BuildError;

/// Parsed table of contents and the directory its targets are relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toc {
    pub nodes: Vec<TocNode>,
    pub base_dir: String,
}

/// One submodule after ingestion.
#[derive(Debug)]
pub struct Collection {
    pub config: SubmoduleConfig,
    pub documents: Vec<Document>,
    /// `None` for flat collections.
    pub toc: Option<Toc>,
}

/// Every ingested collection plus the frozen link map.
#[derive(Debug)]
pub struct Ingested {
    pub collections: Vec<Collection>,
    pub link_map: LinkMap,
}

/// Ingest every configured submodule.
///
/// A submodule whose table of contents is missing or unparsable, or whose
/// patterns are invalid, is logged and skipped. Documents that fail to load
/// are logged and excluded.
///
/// # Errors
///
/// Returns [`BuildError::NoSources`] if no document could be ingested.
pub fn ingest(config: &Config) -> Result<Ingested, BuildError> {
    let root = config.root_dir.as_path();
    let parser = OutlineParser::new(config.outline.indent_width);

    let mut collections = Vec::new();
    for submodule in &config.submodules {
        let toc = match load_toc(root, submodule, &parser) {
            Ok(toc) => toc,
            Err(message) => {
                tracing::error!(submodule = %submodule.key, error = %message, "Skipping submodule");
                continue;
            }
        };
        let documents = match ingest_documents(root, submodule) {
            Ok(documents) => documents,
            Err(e) => {
                tracing::error!(submodule = %submodule.key, error = %e, "Skipping submodule");
                continue;
            }
        };
        tracing::info!(
            submodule = %submodule.key,
            documents = documents.len(),
            "Ingested submodule"
        );
        collections.push(Collection {
            config: submodule.clone(),
            documents,
            toc,
        });
    }

    let mut builder = LinkMapBuilder::new();
    for doc in collections.iter().flat_map(|c| &c.documents) {
        builder.insert(&doc.original_path, &doc.canonical_path);
    }
    if builder.is_empty() {
        return Err(BuildError::NoSources);
    }

    Ok(Ingested {
        collections,
        link_map: builder.build(),
    })
}

fn load_toc(
    root: &Path,
    submodule: &SubmoduleConfig,
    parser: &OutlineParser,
) -> Result<Option<Toc>, String> {
    if submodule.kind == SubmoduleKind::Flat {
        return Ok(None);
    }
    let Some(toc_path) = submodule.toc_path.as_deref().map(normalize_path) else {
        return Ok(None);
    };
    let full_path = root.join(&toc_path);
    if !full_path.is_file() {
        return Err(format!("table of contents not found: {}", full_path.display()));
    }

    match submodule.kind {
        SubmoduleKind::Flat => Ok(None),
        SubmoduleKind::Outline => {
            let text = std::fs::read_to_string(&full_path).map_err(|e| e.to_string())?;
            Ok(Some(Toc {
                nodes: parser.parse(&text),
                base_dir: parent_dir(&toc_path).to_owned(),
            }))
        }
        SubmoduleKind::Structured => {
            let nodes = parse_structured_source(&full_path).map_err(|e| e.to_string())?;
            Ok(Some(Toc {
                nodes,
                base_dir: normalize_path(&submodule.source_base_dir),
            }))
        }
    }
}

fn ingest_documents(root: &Path, submodule: &SubmoduleConfig) -> Result<Vec<Document>, SourceError> {
    let paths = enumerate_sources(root, &submodule.effective_patterns())?;
    let includer = SnippetIncluder::new(root)
        .with_snippet_root(submodule.snippet_root())
        .with_path_corrections(
            submodule
                .path_corrections
                .iter()
                .map(|c| PathCorrection {
                    prefix: c.prefix.clone(),
                    replacement: c.replacement.clone(),
                })
                .collect(),
        );

    let results: Vec<Result<Document, SourceError>> = paths
        .par_iter()
        .map(|path| {
            let doc = Document::load(root, path, &submodule.key, &submodule.source_base_dir)?;
            let content = includer.expand(&doc.original_path, &doc.content);
            Ok(doc.with_content(content))
        })
        .collect();

    let mut documents = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(doc) => documents.push(doc),
            Err(e) => tracing::warn!(error = %e, "Skipping document"),
        }
    }
    Ok(documents)
}

impl Ingested {
    pub fn resolver(&self) -> LinkResolver<'_> {
        LinkResolver::new(&self.link_map)
    }

    pub fn document_count(&self) -> usize {
        self.collections.iter().map(|c| c.documents.len()).sum()
    }

    /// Resolved navigation tree of a collection. Flat collections list
    /// their documents by order and title.
    pub fn resolved_tree(&self, collection: &Collection) -> Vec<TocNode> {
        match &collection.toc {
            Some(toc) => resolve_tree(&toc.nodes, &self.resolver(), Some(&toc.base_dir)),
            None => {
                let documents: Vec<&Document> = collection.documents.iter().collect();
                flat_entries(&documents)
            }
        }
    }

    /// Book parts for every collection with at least one document.
    pub fn book_sections(&self, indent_width: usize) -> Vec<BookSection> {
        let renderer = OutlineRenderer::new(indent_width);
        self.collections
            .iter()
            .filter(|c| {
                if c.documents.is_empty() {
                    tracing::info!(submodule = %c.config.key, "Skipping empty submodule");
                }
                !c.documents.is_empty()
            })
            .map(|c| BookSection {
                key: c.config.key.clone(),
                name: c.config.display_name().to_owned(),
                outline: renderer.render(&self.resolved_tree(c)),
            })
            .collect()
    }

    /// Every document with its body links rewritten.
    pub fn book_pages(&self) -> Vec<BookPage> {
        let resolver = self.resolver();
        let documents: Vec<&Document> = self
            .collections
            .iter()
            .flat_map(|c| &c.documents)
            .collect();
        documents
            .par_iter()
            .map(|doc| BookPage {
                canonical_path: doc.canonical_path.clone(),
                content: rewrite_body_links(doc, &resolver),
            })
            .collect()
    }

    /// Sidebar links for every collection, in `collection_order`.
    pub fn sidebars(&self, config: &Config) -> Vec<CollectionLinks> {
        let builder = SidebarBuilder::new(&config.sidebar);
        let mut collections: Vec<CollectionLinks> = self
            .collections
            .iter()
            .map(|c| {
                let links = if c.toc.is_some() {
                    builder.from_tree(&self.resolved_tree(c))
                } else {
                    let order = load_order(&config.root_dir, &c.config);
                    let documents: Vec<&Document> = c.documents.iter().collect();
                    builder.from_documents(&c.config.key, &documents, &order)
                };
                CollectionLinks {
                    key: c.config.key.clone(),
                    sidebar_name: c.config.display_name().to_owned(),
                    links,
                }
            })
            .collect();
        order_collections(&mut collections, &config.sidebar.collection_order);
        collections
    }
}

fn load_order(root: &Path, submodule: &SubmoduleConfig) -> SidebarOrder {
    let Some(order_path) = &submodule.order_path else {
        return SidebarOrder::default();
    };
    SidebarOrder::load(&root.join(order_path)).unwrap_or_else(|e| {
        tracing::warn!(submodule = %submodule.key, error = %e, "Ignoring sidebar order");
        SidebarOrder::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config(root: &Path, toml: &str) -> Config {
        Config::from_toml(toml, root).unwrap()
    }

    const OUTLINE_CONFIG: &str = r#"
[[submodules]]
key = "x"
type = "outline"
toc_path = "docs/x/SUMMARY.md"
source_base_dir = "docs/x"
patterns = ["docs/x/**/*.md", "!**/SUMMARY.md"]
"#;

    #[test]
    fn test_end_to_end_outline() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(root, "docs/x/SUMMARY.md", "# Summary\n\n- [Setup](./guide/setup.md)\n");
        write(root, "docs/x/guide/setup.md", "# Setup\n");

        let ingested = ingest(&config(root, OUTLINE_CONFIG)).unwrap();
        assert_eq!(ingested.document_count(), 1);
        assert_eq!(
            ingested.resolver().lookup("docs/x/guide/setup.md"),
            Some("x/guide/setup.md")
        );

        let sections = ingested.book_sections(2);
        assert!(sections[0].outline.contains("- [Setup](x/guide/setup.md)"));
    }

    #[test]
    fn test_flat_collection_orders_by_front_matter() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(root, "docs/g/z-first.md", "---\ntitle: First\norder: 1\n---\n");
        write(root, "docs/g/a-second.md", "---\ntitle: Second\norder: 2\n---\n");
        let toml = "[[submodules]]\nkey = \"g\"\nsource_base_dir = \"docs/g\"\n";

        let ingested = ingest(&config(root, toml)).unwrap();
        let outline = &ingested.book_sections(2)[0].outline;
        assert_eq!(outline, "- [First](g/z-first.md)\n- [Second](g/a-second.md)\n");
    }

    #[test]
    fn test_missing_toc_skips_submodule() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(root, "docs/x/guide/setup.md", "# Setup\n");
        write(root, "docs/g/a.md", "# A\n");
        let toml = format!("{OUTLINE_CONFIG}\n[[submodules]]\nkey = \"g\"\nsource_base_dir = \"docs/g\"\n");

        let ingested = ingest(&config(root, &toml)).unwrap();
        let keys: Vec<&str> = ingested.collections.iter().map(|c| c.config.key.as_str()).collect();
        assert_eq!(keys, vec!["g"]);
    }

    #[test]
    fn test_no_sources_is_structural() {
        let temp_dir = tempfile::tempdir().unwrap();
        let toml = "[[submodules]]\nkey = \"g\"\nsource_base_dir = \"docs/g\"\n";
        let err = ingest(&config(temp_dir.path(), toml)).unwrap_err();
        assert!(matches!(err, BuildError::NoSources));
    }

    #[test]
    fn test_bad_document_is_excluded() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(root, "docs/g/good.md", "# Good\n");
        write(root, "docs/g/bad.md", "---\ntitle: [broken\n---\n");
        let toml = "[[submodules]]\nkey = \"g\"\nsource_base_dir = \"docs/g\"\n";

        let ingested = ingest(&config(root, toml)).unwrap();
        let paths: Vec<&str> = ingested.collections[0]
            .documents
            .iter()
            .map(|d| d.original_path.as_str())
            .collect();
        assert_eq!(paths, vec!["docs/g/good.md"]);
    }

    #[test]
    fn test_document_outside_base_is_excluded() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(root, "docs/g/src/a.md", "# A\n");
        write(root, "docs/g/notes.md", "# Notes\n");
        let toml = r#"
[[submodules]]
key = "g"
source_base_dir = "docs/g/src"
patterns = ["docs/g/**/*.md"]
"#;

        let ingested = ingest(&config(root, toml)).unwrap();
        let canonical: Vec<&str> = ingested.collections[0]
            .documents
            .iter()
            .map(|d| d.canonical_path.as_str())
            .collect();
        assert_eq!(canonical, vec!["g/a.md"]);
        assert!(ingested.resolver().lookup("docs/g/notes.md").is_none());
    }

    #[test]
    fn test_structured_targets_resolve_against_source_base() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(
            root,
            "docs/ts/.vitepress/config.ts",
            r"export default defineConfig({
  themeConfig: {
    sidebar: [
      {
        text: 'Guide',
        link: '/guide/',
        items: [{ text: 'Setup', link: '/guide/setup' }],
      },
    ],
  },
});
",
        );
        write(root, "docs/ts/src/guide/index.md", "# Guide\n");
        write(root, "docs/ts/src/guide/setup.md", "# Setup\n");
        let toml = r#"
[[submodules]]
key = "ts"
type = "structured"
toc_path = "docs/ts/.vitepress/config.ts"
source_base_dir = "docs/ts/src"
"#;
        let config = config(root, toml);

        let ingested = ingest(&config).unwrap();
        let outline = &ingested.book_sections(2)[0].outline;
        assert!(outline.contains("- [Guide](ts/guide/index.md)"), "{outline}");
        assert!(outline.contains("[Setup](ts/guide/setup.md)"), "{outline}");
        assert!(!outline.contains("link-error"), "{outline}");

        let sidebars = ingested.sidebars(&config);
        let guide = &sidebars[0].links[0];
        assert_eq!(guide.slug.as_deref(), Some("docs/ts/guide"));
        assert_eq!(guide.submenu[0].slug.as_deref(), Some("docs/ts/guide/setup"));
    }

    #[test]
    fn test_pages_have_snippets_and_rewritten_links() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(root, "docs/x/SUMMARY.md", "- [A](a.md)\n- [B](sub/b.md)\n");
        write(
            root,
            "docs/x/a.md",
            "See [B](sub/b.md).\n\n```rust\n{{#include code/lib.rs:demo}}\n```\n",
        );
        write(root, "docs/x/sub/b.md", "Back to [A](../a.md#top)\n");
        write(
            root,
            "docs/x/code/lib.rs",
            "// ANCHOR: demo\n    fn demo() {}\n// ANCHOR_END: demo\n",
        );

        let ingested = ingest(&config(root, OUTLINE_CONFIG)).unwrap();
        let mut pages = ingested.book_pages();
        pages.sort_by(|a, b| a.canonical_path.cmp(&b.canonical_path));

        assert_eq!(pages[0].canonical_path, "x/a.md");
        assert_eq!(
            pages[0].content,
            "See [B](sub/b.md).\n\n```rust\nfn demo() {}\n```\n"
        );
        assert_eq!(pages[1].content, "Back to [A](../a.md#top)\n");
    }

    #[test]
    fn test_run_twice_is_identical() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write(root, "docs/x/SUMMARY.md", "- [A](a.md)\n  - [Gone](gone.md)\n");
        write(root, "docs/x/a.md", "# A\n");
        let config = config(root, OUTLINE_CONFIG);

        let first = ingest(&config).unwrap();
        let second = ingest(&config).unwrap();
        assert_eq!(first.book_sections(2), second.book_sections(2));
        assert_eq!(first.sidebars(&config), second.sidebars(&config));
        assert!(
            first.book_sections(2)[0]
                .outline
                .contains("[Gone](#link-error-missing-docs-x-gone-md) <!-- Link Resolution Issue -->")
        );
    }
}
