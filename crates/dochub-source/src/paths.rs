//! Lexical path handling for repository-relative paths.
//!
//! Nothing here touches the filesystem. Paths are `/`-separated strings
//! with no leading `./`; `..` segments are collapsed where a parent exists.

use std::path::Path;

/// Normalize a path: `\` becomes `/`, `.` and empty segments are dropped,
/// `..` collapses against the previous segment.
///
/// Leading `..` that cannot collapse are kept. A trailing `/` is preserved
/// so directory-style references stay distinguishable.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            s => segments.push(s),
        }
    }

    let mut normalized = segments.join("/");
    if path.ends_with('/') && !normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

/// Join `rel` onto directory `base` and normalize.
///
/// A leading `/` on `rel` makes it relative to the repository root.
pub fn join_path(base: &str, rel: &str) -> String {
    if rel.starts_with('/') || base.is_empty() {
        normalize_path(rel)
    } else {
        normalize_path(&format!("{base}/{rel}"))
    }
}

/// Directory part of a path, or `""` for a bare file name.
pub fn parent_dir(path: &str) -> &str {
    path.trim_end_matches('/')
        .rfind('/')
        .map_or("", |idx| &path[..idx])
}

/// File name without its last extension.
pub fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Lexical equivalent of `path.relative(base, path)`.
pub fn relative_to(base: &str, path: &str) -> String {
    let base = normalize_path(base);
    let path = normalize_path(path);
    let base_segs: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    let path_segs: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let common = base_segs
        .iter()
        .zip(&path_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts = vec![".."; base_segs.len() - common];
    parts.extend_from_slice(&path_segs[common..]);
    parts.join("/")
}

/// Canonical output path of a document.
///
/// The document's path relative to `source_base_dir`, prefixed with the
/// submodule `key`, with `.mdx` rewritten to `.md`. Every canonical path
/// in the system comes from this function.
pub fn canonical_path(key: &str, source_base_dir: &str, original_path: &str) -> String {
    let rel = relative_to(source_base_dir, original_path);
    let joined = normalize_path(&format!("{key}/{rel}"));
    match joined.strip_suffix(".mdx") {
        Some(stem) => format!("{stem}.md"),
        None => joined,
    }
}

/// Convert a relative filesystem path to a `/`-separated string.
pub fn to_slash(path: &Path) -> String {
    let parts: Vec<_> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    normalize_path(&parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./docs/x/a.md"), "docs/x/a.md");
        assert_eq!(normalize_path("docs\\x\\a.md"), "docs/x/a.md");
        assert_eq!(normalize_path("docs//x/./a.md"), "docs/x/a.md");
        assert_eq!(normalize_path("docs/x/../y/a.md"), "docs/y/a.md");
        assert_eq!(normalize_path("../a.md"), "../a.md");
        assert_eq!(normalize_path("a/../../b"), "../b");
        assert_eq!(normalize_path("docs/guide/"), "docs/guide/");
        assert_eq!(normalize_path("./"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["./a/./b/../c.md", "x\\y/", "../../q", ""] {
            let once = normalize_path(input);
            assert_eq!(normalize_path(&once), once);
        }
    }

    #[test]
    fn test_join_path() {
        assert_eq!(
            join_path("docs/x/src", "./guide/setup.md"),
            "docs/x/src/guide/setup.md"
        );
        assert_eq!(join_path("docs/x/src", "../shared/a.md"), "docs/x/shared/a.md");
        assert_eq!(join_path("docs/x", "/docs/y/a.md"), "docs/y/a.md");
        assert_eq!(join_path("", "a.md"), "a.md");
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("docs/x/SUMMARY.md"), "docs/x");
        assert_eq!(parent_dir("README.md"), "");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("docs/getting-started.md"), "getting-started");
        assert_eq!(file_stem("docs/archive.tar.gz"), "archive.tar");
        assert_eq!(file_stem(".gitignore"), ".gitignore");
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(relative_to("docs/x", "docs/x/guide/setup.md"), "guide/setup.md");
        assert_eq!(relative_to("docs/x/", "docs/y/a.md"), "../y/a.md");
        assert_eq!(relative_to("", "docs/a.md"), "docs/a.md");
    }

    #[test]
    fn test_canonical_path() {
        assert_eq!(
            canonical_path("x", "docs/x", "docs/x/guide/setup.md"),
            "x/guide/setup.md"
        );
        assert_eq!(
            canonical_path("ts", "apps/docs/src", "apps/docs/src/guide/intro.mdx"),
            "ts/guide/intro.md"
        );
        assert_eq!(
            canonical_path("x", "./docs/x/", "docs\\x\\index.md"),
            "x/index.md"
        );
    }

    #[test]
    fn test_canonical_path_is_idempotent() {
        let first = canonical_path("x", "docs/x", "docs/x/a/b.mdx");
        let second = canonical_path("x", "docs/x", "docs/x/a/b.mdx");
        assert_eq!(first, second);
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("docs/x/a.md")), "docs/x/a.md");
    }
}
