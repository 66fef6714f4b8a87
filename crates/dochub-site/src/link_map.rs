//! Original path to canonical path table.

use std::collections::HashMap;

use dochub_source::normalize_path;

/// Accumulates `original -> canonical` entries while documents are ingested.
///
/// Consumed by [`build`](Self::build); lookups are only possible on the
/// resulting [`LinkMap`], so no reader can observe a partial table.
#[derive(Debug, Default)]
pub struct LinkMapBuilder {
    entries: HashMap<String, String>,
}

impl LinkMapBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a repository-relative path into a map key.
    ///
    /// Lookups go through the same function.
    pub fn normalize(path: &str) -> String {
        normalize_path(path)
    }

    /// Record a document mapping. A later insert for the same key wins.
    pub fn insert(&mut self, original_path: &str, canonical_path: &str) {
        let key = Self::normalize(original_path);
        if let Some(previous) = self.entries.insert(key, canonical_path.to_owned())
            && previous != canonical_path
        {
            tracing::warn!(
                original = %original_path,
                previous = %previous,
                canonical = %canonical_path,
                "Duplicate link map entry"
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the table.
    pub fn build(self) -> LinkMap {
        tracing::debug!(entries = self.entries.len(), "Link map built");
        LinkMap {
            entries: self.entries,
        }
    }
}

/// Immutable `original -> canonical` table.
#[derive(Debug, Default)]
pub struct LinkMap {
    entries: HashMap<String, String>,
}

impl LinkMap {
    /// Exact lookup of an already-normalized key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(LinkMap: Send, Sync);

    #[test]
    fn test_insert_normalizes_key() {
        let mut builder = LinkMapBuilder::new();
        builder.insert("./docs/x/a.md", "x/a.md");
        builder.insert("docs\\x\\b.md", "x/b.md");
        let map = builder.build();

        assert_eq!(map.get("docs/x/a.md"), Some("x/a.md"));
        assert_eq!(map.get("docs/x/b.md"), Some("x/b.md"));
        assert_eq!(map.get("./docs/x/a.md"), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_later_insert_wins() {
        let mut builder = LinkMapBuilder::new();
        builder.insert("docs/a.md", "one/a.md");
        builder.insert("docs/a.md", "two/a.md");
        assert_eq!(builder.len(), 1);
        assert_eq!(builder.build().get("docs/a.md"), Some("two/a.md"));
    }

    #[test]
    fn test_empty() {
        assert!(LinkMapBuilder::new().is_empty());
        assert!(LinkMapBuilder::new().build().is_empty());
    }
}
