use serde::Serialize;

/// Whether a node is a section title or a clickable entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TocKind {
    Header,
    Link,
}

/// A node in the normalized outline tree.
///
/// `level` is the heading depth for headers and the nesting depth for
/// links. Children keep source declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocNode {
    pub kind: TocKind,
    pub title: String,
    /// Original reference for links; `None` for headers and unlinked entries.
    pub target: Option<String>,
    pub level: usize,
    pub children: Vec<TocNode>,
}

impl TocNode {
    pub fn header(title: impl Into<String>, level: usize) -> Self {
        Self {
            kind: TocKind::Header,
            title: title.into(),
            target: None,
            level,
            children: Vec::new(),
        }
    }

    pub fn link(title: impl Into<String>, target: Option<String>, level: usize) -> Self {
        Self {
            kind: TocKind::Link,
            title: title.into(),
            target,
            level,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<TocNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_header(&self) -> bool {
        self.kind == TocKind::Header
    }

    /// Visit this node and all descendants depth-first, parents first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TocNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Rebuild the tree, mapping each link target.
    #[must_use]
    pub fn map_targets(&self, map: &mut impl FnMut(&TocNode) -> Option<String>) -> Self {
        let target = match self.kind {
            TocKind::Link => map(self),
            TocKind::Header => None,
        };
        Self {
            kind: self.kind,
            title: self.title.clone(),
            target,
            level: self.level,
            children: self.children.iter().map(|c| c.map_targets(map)).collect(),
        }
    }
}

/// Count every node in a forest.
pub(crate) fn count_nodes(nodes: &[TocNode]) -> usize {
    nodes.iter().map(|n| 1 + count_nodes(&n.children)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_walk_is_preorder() {
        let tree = TocNode::header("Guide", 1).with_children(vec![
            TocNode::link("A", Some("a.md".to_owned()), 0)
                .with_children(vec![TocNode::link("B", Some("b.md".to_owned()), 1)]),
            TocNode::link("C", Some("c.md".to_owned()), 0),
        ]);

        let mut titles = Vec::new();
        tree.walk(&mut |n| titles.push(n.title.as_str()));
        assert_eq!(titles, vec!["Guide", "A", "B", "C"]);
    }

    #[test]
    fn test_map_targets_skips_headers() {
        let tree = TocNode::header("Guide", 1)
            .with_children(vec![TocNode::link("A", Some("a.md".to_owned()), 0)]);

        let mapped = tree.map_targets(&mut |n| n.target.as_ref().map(|t| format!("x/{t}")));
        assert_eq!(mapped.target, None);
        assert_eq!(mapped.children[0].target.as_deref(), Some("x/a.md"));
    }

    #[test]
    fn test_count_nodes() {
        let nodes = vec![
            TocNode::link("A", None, 0).with_children(vec![TocNode::link("B", None, 1)]),
            TocNode::link("C", None, 0),
        ];
        assert_eq!(count_nodes(&nodes), 3);
    }
}
