//! VitePress-style sidebar parsing.
//!
//! The sidebar is deserialized into typed [`SidebarItem`]s and then
//! transformed recursively into [`TocNode`]s. Accepted shapes:
//!
//! - a bare array of items (JSON nav files)
//! - `{ "items": [...] }`
//! - `{ "sidebar": [...] }` or `{ "sidebar": { "/route/": [...] | { "items": [...] } } }`

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde::de::{MapAccess, Visitor};

use crate::TocError;
use crate::literal::{extract_sidebar_literal, js_literal_to_json};
use crate::node::{TocNode, count_nodes};

/// One sidebar entry as written in the source configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SidebarItem {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub items: Vec<SidebarItem>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RouteSidebar {
    List(Vec<SidebarItem>),
    Group { items: Vec<SidebarItem> },
}

impl RouteSidebar {
    fn into_items(self) -> Vec<SidebarItem> {
        match self {
            Self::List(items) | Self::Group { items } => items,
        }
    }
}

/// Route-keyed sidebars in declaration order.
struct Routes(Vec<SidebarItem>);

impl<'de> Deserialize<'de> for Routes {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RoutesVisitor;

        impl<'de> Visitor<'de> for RoutesVisitor {
            type Value = Routes;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of route prefixes to sidebar item lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Routes, A::Error> {
                let mut items = Vec::new();
                while let Some((_route, sidebar)) = map.next_entry::<String, RouteSidebar>()? {
                    items.extend(sidebar.into_items());
                }
                Ok(Routes(items))
            }
        }

        deserializer.deserialize_map(RoutesVisitor)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SidebarShape {
    List(Vec<SidebarItem>),
    Routes(Routes),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SidebarDocument {
    List(Vec<SidebarItem>),
    Wrapped { sidebar: SidebarShape },
    Nav { items: Vec<SidebarItem> },
}

impl SidebarDocument {
    fn into_items(self) -> Vec<SidebarItem> {
        match self {
            Self::List(items) | Self::Nav { items } => items,
            Self::Wrapped {
                sidebar: SidebarShape::List(items),
            } => items,
            Self::Wrapped {
                sidebar: SidebarShape::Routes(Routes(items)),
            } => items,
        }
    }
}

/// Parse a JSON sidebar document into a normalized tree.
pub fn parse_structured(json: &str) -> Result<Vec<TocNode>, TocError> {
    let document: SidebarDocument = serde_json::from_str(json)?;
    let nodes = transform_items(&document.into_items(), 0);
    tracing::debug!(nodes = count_nodes(&nodes), "Parsed structured sidebar");
    Ok(nodes)
}

/// Read a structured sidebar from a `.json` nav file or a JS/TS config module.
pub fn parse_structured_source(path: &Path) -> Result<Vec<TocNode>, TocError> {
    let source = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return parse_structured(&source);
    }

    let literal = extract_sidebar_literal(&source)?;
    let json = js_literal_to_json(literal)?;
    let wrapped = format!("{{\"sidebar\":{json}}}");
    parse_structured(&wrapped)
}

fn transform_items(items: &[SidebarItem], level: usize) -> Vec<TocNode> {
    let mut nodes = Vec::new();
    for item in items {
        let text = item.text.as_deref().map(str::trim).filter(|t| !t.is_empty());
        match (text, &item.link) {
            // Transparent grouping wrapper
            (None, None) if !item.items.is_empty() => {
                nodes.extend(transform_items(&item.items, level));
            }
            (None, _) => {
                tracing::debug!(link = ?item.link, "Skipping sidebar item without text");
            }
            (Some(text), link) => {
                let target = link.as_deref().map(normalize_link);
                nodes.push(
                    TocNode::link(text, target, level)
                        .with_children(transform_items(&item.items, level + 1)),
                );
            }
        }
    }
    nodes
}

fn is_external(link: &str) -> bool {
    link.starts_with("http://") || link.starts_with("https://") || link.starts_with("mailto:")
}

/// Normalize a VitePress route into a markdown file reference.
///
/// Leading `/` is stripped. Directory routes (trailing `/`) always get
/// `index.md`; extension-less routes get `.md`. Anchors and external links
/// are returned unchanged.
pub fn normalize_link(link: &str) -> String {
    let link = link.trim();
    if link.is_empty() || link.starts_with('#') || is_external(link) {
        return link.to_owned();
    }

    let (path, fragment) = match link.find('#') {
        Some(idx) => link.split_at(idx),
        None => (link, ""),
    };
    let stripped = path.trim_start_matches('/');

    if path.ends_with('/') {
        return format!("{stripped}index.md{fragment}");
    }

    let file_name = stripped.rsplit('/').next().unwrap_or(stripped);
    let has_extension = file_name
        .rfind('.')
        .is_some_and(|idx| idx > 0 && idx < file_name.len() - 1);
    if has_extension {
        format!("{stripped}{fragment}")
    } else {
        format!("{stripped}.md{fragment}")
    }
}
