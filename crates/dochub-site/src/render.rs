//! Tree resolution and outline text emission.

use std::fmt::Write as _;

use dochub_source::Document;
use dochub_toc::{TocKind, TocNode};

use crate::resolver::{LinkResolver, is_placeholder};

/// Trailing marker on outline lines whose target is a placeholder.
pub const LINK_ISSUE_MARKER: &str = "<!-- Link Resolution Issue -->";

/// Resolve every link target in a TOC forest.
///
/// `base_dir` is the directory TOC targets are relative to: the outline
/// file's directory for outlines, the content root for structured sidebars.
pub fn resolve_tree(
    nodes: &[TocNode],
    resolver: &LinkResolver<'_>,
    base_dir: Option<&str>,
) -> Vec<TocNode> {
    nodes
        .iter()
        .map(|node| {
            node.map_targets(&mut |link| {
                link.target
                    .as_deref()
                    .map(|target| resolver.resolve(target, base_dir).into_link())
            })
        })
        .collect()
}

/// Link entries for a submodule without a TOC, sorted by declared order
/// then title.
pub fn flat_entries(documents: &[&Document]) -> Vec<TocNode> {
    let mut sorted: Vec<&Document> = documents.to_vec();
    sorted.sort_by(|a, b| {
        a.order
            .cmp(&b.order)
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.canonical_path.cmp(&b.canonical_path))
    });
    sorted
        .into_iter()
        .map(|doc| TocNode::link(&doc.title, Some(doc.canonical_path.clone()), 0))
        .collect()
}

/// Emits mdBook outline text from a resolved TOC forest.
///
/// Link bullets are indented by the number of link ancestors and alternate
/// between `-` and `*` per level. Headers keep their own depth.
#[derive(Debug, Clone, Copy)]
pub struct OutlineRenderer {
    indent_width: usize,
}

impl Default for OutlineRenderer {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

impl OutlineRenderer {
    pub fn new(indent_width: usize) -> Self {
        Self {
            indent_width: indent_width.max(1),
        }
    }

    pub fn render(&self, nodes: &[TocNode]) -> String {
        let mut out = String::new();
        for node in nodes {
            self.render_node(node, 0, &mut out);
        }
        out
    }

    fn render_node(&self, node: &TocNode, depth: usize, out: &mut String) {
        match node.kind {
            TocKind::Header => {
                let hashes = "#".repeat(node.level.max(1));
                let _ = write!(out, "\n{hashes} {}\n\n", node.title);
                for child in &node.children {
                    self.render_node(child, depth, out);
                }
            }
            TocKind::Link => {
                let indent = " ".repeat(depth * self.indent_width);
                let bullet = if depth % 2 == 0 { '-' } else { '*' };
                let target = node.target.as_deref().unwrap_or("");
                let _ = write!(out, "{indent}{bullet} [{}]({target})", node.title);
                if is_placeholder(target) {
                    let _ = write!(out, " {LINK_ISSUE_MARKER}");
                }
                out.push('\n');
                for child in &node.children {
                    self.render_node(child, depth + 1, out);
                }
            }
        }
    }
}
