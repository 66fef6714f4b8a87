//! Glob-based source enumeration.

use std::collections::BTreeSet;
use std::path::Path;

use glob::{MatchOptions, Pattern};

use crate::SourceError;
use crate::paths::to_slash;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Expand ordered glob patterns relative to `root` into document paths.
///
/// Patterns starting with `!` exclude matching paths from the result,
/// regardless of their position in the list. Returned paths are
/// repository-relative, normalized, deduplicated and sorted.
///
/// A positive pattern without matches only logs a warning.
///
/// # Errors
///
/// Returns [`SourceError::Pattern`] if any pattern is not a valid glob.
pub fn enumerate_sources(root: &Path, patterns: &[String]) -> Result<Vec<String>, SourceError> {
    let (excludes, includes): (Vec<&String>, Vec<&String>) =
        patterns.iter().partition(|p| p.starts_with('!'));

    let excludes = excludes
        .into_iter()
        .map(|p| {
            let raw = p.trim_start_matches('!').trim_start_matches("./");
            Pattern::new(raw).map_err(|e| pattern_error(p, &e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let escaped_root = Pattern::escape(&root.to_string_lossy());
    let mut found = BTreeSet::new();

    for pattern in includes {
        let full = format!(
            "{}/{}",
            escaped_root.trim_end_matches('/'),
            pattern.trim_start_matches("./")
        );
        let entries = glob::glob_with(&full, MATCH_OPTIONS).map_err(|e| pattern_error(pattern, &e))?;

        let mut matched = 0usize;
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "Unreadable path while expanding glob");
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let Ok(rel) = path.strip_prefix(root) else {
                continue;
            };
            let rel = to_slash(rel);
            if excludes.iter().any(|ex| ex.matches_with(&rel, MATCH_OPTIONS)) {
                continue;
            }
            matched += 1;
            found.insert(rel);
        }

        if matched == 0 {
            tracing::warn!(pattern = %pattern, "Glob pattern matched no files");
        }
    }

    tracing::debug!(count = found.len(), "Enumerated source files");
    Ok(found.into_iter().collect())
}

fn pattern_error(pattern: &str, error: &impl std::fmt::Display) -> SourceError {
    SourceError::Pattern {
        pattern: pattern.to_owned(),
        message: error.to_string(),
    }
}
