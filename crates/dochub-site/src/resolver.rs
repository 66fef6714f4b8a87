//! Link target resolution against a complete [`LinkMap`].

use dochub_source::join_path;

use crate::link_map::{LinkMap, LinkMapBuilder};

/// Prefix shared by every placeholder link.
pub const PLACEHOLDER_PREFIX: &str = "#link-error-";

/// Outcome of resolving one link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Anchor-only, empty or external target, returned unchanged.
    Passthrough(String),
    /// Canonical path, with the original fragment re-attached.
    Found(String),
    /// Deterministic placeholder link.
    Missing(String),
}

impl Resolution {
    pub fn link(&self) -> &str {
        match self {
            Self::Passthrough(link) | Self::Found(link) | Self::Missing(link) => link,
        }
    }

    pub fn into_link(self) -> String {
        match self {
            Self::Passthrough(link) | Self::Found(link) | Self::Missing(link) => link,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }
}

/// Whether a rendered link is a placeholder produced by the resolver.
pub fn is_placeholder(link: &str) -> bool {
    link.starts_with(PLACEHOLDER_PREFIX)
}

/// Replace every character outside `[A-Za-z0-9]` with `-`.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

pub(crate) fn is_external(target: &str) -> bool {
    target.contains("://") || target.starts_with("mailto:") || target.starts_with("tel:")
}

/// Resolves link targets through a frozen [`LinkMap`].
#[derive(Debug, Clone, Copy)]
pub struct LinkResolver<'a> {
    map: &'a LinkMap,
}

impl<'a> LinkResolver<'a> {
    pub fn new(map: &'a LinkMap) -> Self {
        Self { map }
    }

    /// Resolve `target` written in a file whose directory is `base_dir`.
    ///
    /// `base_dir` is repository-relative. `None` means the origin is
    /// unknown and only passthrough targets can succeed.
    pub fn resolve(&self, target: &str, base_dir: Option<&str>) -> Resolution {
        let target = target.trim();
        if target.is_empty() || target.starts_with('#') || is_external(target) {
            return Resolution::Passthrough(target.to_owned());
        }

        let Some(base_dir) = base_dir else {
            tracing::warn!(target = %target, "Cannot resolve link without a base directory");
            return Resolution::Missing(format!(
                "{PLACEHOLDER_PREFIX}unresolvable-{}",
                sanitize(target)
            ));
        };

        let (path, fragment) = match target.find('#') {
            Some(idx) => target.split_at(idx),
            None => (target, ""),
        };
        let key = LinkMapBuilder::normalize(&join_path(base_dir, path));

        match self.lookup(&key) {
            Some(canonical) => Resolution::Found(format!("{canonical}{fragment}")),
            None => {
                tracing::warn!(target = %target, key = %key, "Link mapping failed");
                Resolution::Missing(format!("{PLACEHOLDER_PREFIX}missing-{}", sanitize(&key)))
            }
        }
    }

    /// Look up a normalized key, trying fallback candidates in order.
    pub fn lookup(&self, key: &str) -> Option<&'a str> {
        candidates(key).iter().find_map(|candidate| {
            let found = self.map.get(candidate);
            if found.is_some() && candidate != key {
                tracing::debug!(key = %key, candidate = %candidate, "Resolved via fallback");
            }
            found
        })
    }
}

/// Ordered, deduplicated lookup keys for `key`.
///
/// 1. the key itself
/// 2. `key.md`
/// 3. `key/index.md`, then `key/README.md` (directory references)
/// 4. the key with its extension stripped, as `.md`, `.mdx`, directory
///    index and finally bare
pub fn candidates(key: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(9);
    let mut push = |candidate: String| {
        if !candidate.is_empty() && !out.contains(&candidate) {
            out.push(candidate);
        }
    };

    push(key.to_owned());
    let dir = key.trim_end_matches('/');
    if !key.ends_with('/') {
        push(format!("{key}.md"));
    }
    push(format!("{dir}/index.md"));
    push(format!("{dir}/README.md"));

    let stem = strip_extension(dir);
    if stem != dir {
        push(format!("{stem}.md"));
        push(format!("{stem}.mdx"));
        push(format!("{stem}/index.md"));
        push(format!("{stem}/README.md"));
        push(stem.to_owned());
    }
    out
}

fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |idx| idx + 1);
    match path[name_start..].rfind('.') {
        Some(idx) if idx > 0 => &path[..name_start + idx],
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(entries: &[(&str, &str)]) -> LinkMap {
        let mut builder = LinkMapBuilder::new();
        for (original, canonical) in entries {
            builder.insert(original, canonical);
        }
        builder.build()
    }

    #[test]
    fn test_candidates_order() {
        assert_eq!(
            candidates("a/b"),
            vec!["a/b", "a/b.md", "a/b/index.md", "a/b/README.md"]
        );
        assert_eq!(
            candidates("a/b/"),
            vec!["a/b/", "a/b/index.md", "a/b/README.md"]
        );
        assert_eq!(
            candidates("a/b.html"),
            vec![
                "a/b.html",
                "a/b.html.md",
                "a/b.html/index.md",
                "a/b.html/README.md",
                "a/b.md",
                "a/b.mdx",
                "a/b/index.md",
                "a/b/README.md",
                "a/b",
            ]
        );
    }

    #[test]
    fn test_direct_lookup() {
        let map = map(&[("docs/x/guide/setup.md", "x/guide/setup.md")]);
        let resolver = LinkResolver::new(&map);
        assert_eq!(
            resolver.resolve("./guide/setup.md", Some("docs/x")),
            Resolution::Found("x/guide/setup.md".to_owned())
        );
    }

    #[test]
    fn test_directory_fallbacks() {
        let map = map(&[("a/b/index.md", "k/b/index.md")]);
        let resolver = LinkResolver::new(&map);
        assert_eq!(
            resolver.resolve("a/b/", Some("")),
            Resolution::Found("k/b/index.md".to_owned())
        );
        assert_eq!(
            resolver.resolve("a/b", Some("")),
            Resolution::Found("k/b/index.md".to_owned())
        );
    }

    #[test]
    fn test_readme_and_extension_fallbacks() {
        let map = map(&[
            ("docs/guide/README.md", "g/README.md"),
            ("docs/page.mdx", "g/page.md"),
            ("docs/intro.md", "g/intro.md"),
        ]);
        let resolver = LinkResolver::new(&map);
        assert_eq!(resolver.resolve("guide/", Some("docs")).link(), "g/README.md");
        assert_eq!(resolver.resolve("page.html", Some("docs")).link(), "g/page.md");
        assert_eq!(resolver.resolve("intro", Some("docs")).link(), "g/intro.md");
    }

    #[test]
    fn test_fragment_preserved() {
        let map = map(&[("docs/a.md", "x/a.md")]);
        let resolver = LinkResolver::new(&map);
        assert_eq!(
            resolver.resolve("a.md#install", Some("docs")),
            Resolution::Found("x/a.md#install".to_owned())
        );
    }

    #[test]
    fn test_passthrough() {
        let map = LinkMap::default();
        let resolver = LinkResolver::new(&map);
        for target in ["", "#", "#section", "https://fuel.network", "mailto:a@b.c"] {
            assert_eq!(
                resolver.resolve(target, Some("docs")),
                Resolution::Passthrough(target.to_owned())
            );
        }
    }

    #[test]
    fn test_missing_placeholder_is_deterministic() {
        let map = LinkMap::default();
        let resolver = LinkResolver::new(&map);
        let first = resolver.resolve("../other/missing.md", Some("docs/x"));
        let second = resolver.resolve("../other/missing.md", Some("docs/x"));
        assert_eq!(first, second);
        assert_eq!(
            first,
            Resolution::Missing("#link-error-missing-docs-other-missing-md".to_owned())
        );
        assert!(first.is_missing());
        assert!(is_placeholder(first.link()));
    }

    #[test]
    fn test_unresolvable_without_base() {
        let map = map(&[("a.md", "x/a.md")]);
        let resolver = LinkResolver::new(&map);
        assert_eq!(
            resolver.resolve("a.md", None),
            Resolution::Missing("#link-error-unresolvable-a-md".to_owned())
        );
    }

    #[test]
    fn test_symmetry_with_builder_normalization() {
        let originals = ["./docs/x/a.md", "docs/x/sub/../b.md", "docs\\x\\c.mdx"];
        let mut builder = LinkMapBuilder::new();
        for original in originals {
            builder.insert(original, &format!("canon/{original}"));
        }
        let map = builder.build();
        let resolver = LinkResolver::new(&map);

        for original in originals {
            let key = LinkMapBuilder::normalize(original);
            assert_eq!(
                resolver.resolve(&key, Some("")),
                Resolution::Found(format!("canon/{original}"))
            );
        }
    }
}
