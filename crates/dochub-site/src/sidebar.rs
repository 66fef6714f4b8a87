//! Sidebar link JSON and breadcrumb trails for the live site.

use std::collections::HashMap;
use std::path::Path;

use dochub_config::SidebarConfig;
use dochub_source::Document;
use dochub_toc::{TocKind, TocNode};
use serde::{Deserialize, Serialize};

use crate::{BuildError, write_file};
use crate::resolver::{is_external, is_placeholder};

/// One entry of the navigation sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarLink {
    pub label: String,
    /// Site slug without leading slash, or the URL of an external link.
    /// `None` for category entries and unresolved targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub is_external: bool,
    pub should_be_lower_case: bool,
    pub breadcrumbs: Vec<Breadcrumb>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub submenu: Vec<SidebarLink>,
}

/// One step of a breadcrumb trail. The leaf step has no link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Sidebar links of one collection, as written to `all-orders.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionLinks {
    pub key: String,
    pub sidebar_name: String,
    pub links: Vec<SidebarLink>,
}

/// Explicit ordering for a flat collection.
///
/// ```json
/// {"menu": ["intro", "guides"], "guides": ["install", "deploy"]}
/// ```
///
/// Entries compare case-insensitively with `-` and spaces folded to `_`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SidebarOrder {
    #[serde(default)]
    pub menu: Vec<String>,
    #[serde(flatten)]
    pub categories: HashMap<String, Vec<String>>,
}

impl SidebarOrder {
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let content = std::fs::read_to_string(path).map_err(|source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| BuildError::Order {
            path: path.to_path_buf(),
            source,
        })
    }

    fn menu_rank(&self, label: &str) -> Option<usize> {
        rank(&self.menu, label)
    }

    fn category_rank(&self, category: &str, label: &str) -> Option<usize> {
        let folded = fold(category);
        self.categories
            .iter()
            .find(|(name, _)| fold(name) == folded)
            .and_then(|(_, entries)| rank(entries, label))
    }
}

fn fold(text: &str) -> String {
    text.to_lowercase().replace(['-', ' '], "_")
}

fn rank(entries: &[String], label: &str) -> Option<usize> {
    let folded = fold(label);
    entries.iter().position(|entry| fold(entry) == folded)
}

/// Builds [`SidebarLink`] trees from resolved TOCs or flat document sets.
#[derive(Debug, Clone, Copy)]
pub struct SidebarBuilder<'a> {
    config: &'a SidebarConfig,
}

impl<'a> SidebarBuilder<'a> {
    pub fn new(config: &'a SidebarConfig) -> Self {
        Self { config }
    }

    /// Site slug for a canonical path: `.md` dropped, index pages collapse
    /// to their directory, prefixed with the base path.
    pub fn slug_for(&self, canonical: &str) -> String {
        let (path, fragment) = match canonical.find('#') {
            Some(idx) => canonical.split_at(idx),
            None => (canonical, ""),
        };
        let path = path
            .strip_suffix(".md")
            .or_else(|| path.strip_suffix(".mdx"))
            .unwrap_or(path);
        let path = ["index", "README"]
            .iter()
            .find_map(|name| {
                if path == *name {
                    Some("")
                } else {
                    path.strip_suffix(name).and_then(|p| p.strip_suffix('/'))
                }
            })
            .unwrap_or(path);

        let base = self.config.base_path.trim_matches('/');
        let slug = match (base.is_empty(), path.is_empty()) {
            (true, _) => path.to_owned(),
            (false, true) => base.to_owned(),
            (false, false) => format!("{base}/{path}"),
        };
        format!("{slug}{fragment}")
    }

    /// Whether labels under `slug` keep their original casing.
    pub fn is_lowercase(&self, slug: &str) -> bool {
        let slug = slug.to_lowercase();
        self.config
            .lowercase_paths
            .iter()
            .any(|prefix| slug.starts_with(&prefix.to_lowercase()))
    }

    /// Label for a category derived from a name or path segment.
    pub fn edit_label(&self, label: &str, lowercase: bool) -> String {
        let spaced = label.replace(['_', '-'], " ");
        let edited = join_beta_number(&spaced);
        if lowercase {
            edited
        } else {
            capitalize(&edited)
        }
    }

    /// Sidebar for a resolved TOC forest.
    pub fn from_tree(&self, nodes: &[TocNode]) -> Vec<SidebarLink> {
        let mut links: Vec<SidebarLink> = nodes.iter().map(|n| self.tree_link(n)).collect();
        self.fill_breadcrumbs(&mut links);
        links
    }

    fn tree_link(&self, node: &TocNode) -> SidebarLink {
        let target = match node.kind {
            TocKind::Header => None,
            TocKind::Link => node.target.as_deref(),
        };
        let (slug, is_external) = match target {
            Some(t) if is_external(t) => (Some(t.to_owned()), true),
            Some(t) if !t.is_empty() && !t.starts_with('#') && !is_placeholder(t) => {
                (Some(self.slug_for(t)), false)
            }
            _ => (None, false),
        };
        let should_be_lower_case = slug.as_deref().is_some_and(|s| self.is_lowercase(s));

        SidebarLink {
            label: node.title.clone(),
            slug,
            is_external,
            should_be_lower_case,
            breadcrumbs: Vec::new(),
            submenu: node.children.iter().map(|c| self.tree_link(c)).collect(),
        }
    }

    /// Sidebar for a collection without a TOC.
    ///
    /// Documents whose category is the submodule key sit at the top level;
    /// the others are grouped under one entry per category.
    pub fn from_documents(
        &self,
        key: &str,
        documents: &[&Document],
        order: &SidebarOrder,
    ) -> Vec<SidebarLink> {
        let mut top: Vec<(i64, SidebarLink)> = Vec::new();
        let mut groups: Vec<(String, i64, Vec<(i64, SidebarLink)>)> = Vec::new();

        for doc in documents {
            let link = self.document_link(doc);
            if doc.category == key {
                top.push((doc.order, link));
                continue;
            }
            match groups.iter_mut().find(|(name, _, _)| *name == doc.category) {
                Some((_, min_order, items)) => {
                    *min_order = (*min_order).min(doc.order);
                    items.push((doc.order, link));
                }
                None => groups.push((doc.category.clone(), doc.order, vec![(doc.order, link)])),
            }
        }

        for (category, min_order, mut items) in groups {
            items.sort_by(|(oa, a), (ob, b)| {
                let ra = order.category_rank(&category, &a.label).unwrap_or(usize::MAX);
                let rb = order.category_rank(&category, &b.label).unwrap_or(usize::MAX);
                ra.cmp(&rb).then(oa.cmp(ob)).then_with(|| a.label.cmp(&b.label))
            });
            let lowercase = items.iter().all(|(_, l)| l.should_be_lower_case);
            top.push((
                min_order,
                SidebarLink {
                    label: self.edit_label(&category, lowercase),
                    slug: None,
                    is_external: false,
                    should_be_lower_case: lowercase,
                    breadcrumbs: Vec::new(),
                    submenu: items.into_iter().map(|(_, link)| link).collect(),
                },
            ));
        }

        top.sort_by(|(oa, a), (ob, b)| {
            let ra = order.menu_rank(&a.label).unwrap_or(usize::MAX);
            let rb = order.menu_rank(&b.label).unwrap_or(usize::MAX);
            ra.cmp(&rb).then(oa.cmp(ob)).then_with(|| a.label.cmp(&b.label))
        });

        let mut links: Vec<SidebarLink> = top.into_iter().map(|(_, link)| link).collect();
        self.fill_breadcrumbs(&mut links);
        links
    }

    fn document_link(&self, doc: &Document) -> SidebarLink {
        let slug = match &doc.slug {
            Some(explicit) => explicit.trim_start_matches('/').to_owned(),
            None => self.slug_for(&doc.canonical_path),
        };
        SidebarLink {
            label: doc.title.clone(),
            should_be_lower_case: self.is_lowercase(&slug),
            is_external: is_external(&slug),
            slug: Some(slug),
            breadcrumbs: Vec::new(),
            submenu: Vec::new(),
        }
    }

    /// Root crumb, then every ancestor, then the entry itself without link.
    fn fill_breadcrumbs(&self, links: &mut [SidebarLink]) {
        let root = Breadcrumb {
            label: self.config.root_label.clone(),
            link: Some("/".to_owned()),
        };
        let mut trail = vec![root];
        fill_level(links, &mut trail);
    }
}

fn fill_level(links: &mut [SidebarLink], trail: &mut Vec<Breadcrumb>) {
    for link in links {
        let mut crumbs = trail.clone();
        crumbs.push(Breadcrumb {
            label: link.label.clone(),
            link: None,
        });
        link.breadcrumbs = crumbs;

        if !link.submenu.is_empty() {
            trail.push(Breadcrumb {
                label: link.label.clone(),
                link: link
                    .slug
                    .as_ref()
                    .filter(|_| !link.is_external)
                    .map(|s| format!("/{s}")),
            });
            fill_level(&mut link.submenu, trail);
            trail.pop();
        }
    }
}

/// `Beta 4` becomes `Beta-4`.
fn join_beta_number(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut rest = label;
    while let Some(idx) = rest.find("eta ") {
        let is_beta = rest[..idx].ends_with(['b', 'B']);
        let after = &rest[idx + 4..];
        out.push_str(&rest[..idx + 3]);
        if is_beta && after.starts_with(|c: char| c.is_ascii_digit()) {
            out.push('-');
        } else {
            out.push(' ');
        }
        rest = after;
    }
    out.push_str(rest);
    out
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Sort collections by `collection_order`; unknown keys keep their
/// relative order after the listed ones.
pub fn order_collections(collections: &mut [CollectionLinks], collection_order: &[String]) {
    collections.sort_by_key(|c| {
        collection_order
            .iter()
            .position(|key| *key == c.key)
            .unwrap_or(usize::MAX)
    });
}

/// Write `<key>.json` for each collection and the aggregate `all-orders.json`.
pub fn write_sidebar_files(dir: &Path, collections: &[CollectionLinks]) -> Result<(), BuildError> {
    for collection in collections {
        let json = serde_json::to_string_pretty(&collection.links)?;
        write_file(&dir.join(format!("{}.json", collection.key)), &json)?;
    }
    write_file(
        &dir.join("all-orders.json"),
        &serde_json::to_string_pretty(collections)?,
    )?;
    tracing::info!(
        collections = collections.len(),
        dir = %dir.display(),
        "Sidebar links written"
    );
    Ok(())
}
