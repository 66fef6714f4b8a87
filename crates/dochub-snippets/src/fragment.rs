//! Fragment extraction from included files.

use crate::directive::LineRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerKind {
    AnchorStart,
    AnchorEnd,
    RegionStart,
    RegionEnd,
}

#[derive(Debug, PartialEq, Eq)]
struct Marker<'a> {
    kind: MarkerKind,
    name: &'a str,
}

const COMMENT_OPENERS: [&str; 5] = ["//", "<!--", "/*", "--", "#"];

/// Recognize `ANCHOR:`/`ANCHOR_END:` and `#region`/`#endregion` marker lines
/// behind any common comment opener.
fn parse_marker(line: &str) -> Option<Marker<'_>> {
    let trimmed = line.trim_start();
    let opener = COMMENT_OPENERS
        .iter()
        .find(|opener| trimmed.starts_with(**opener))?;
    let text = trimmed[opener.len()..].trim_start();

    let (kind, rest) = if let Some(rest) = text.strip_prefix("ANCHOR_END") {
        (MarkerKind::AnchorEnd, rest.trim_start().strip_prefix(':')?)
    } else if let Some(rest) = text.strip_prefix("ANCHOR") {
        (MarkerKind::AnchorStart, rest.trim_start().strip_prefix(':')?)
    } else if let Some(rest) = text.strip_prefix("#endregion") {
        (MarkerKind::RegionEnd, rest)
    } else if let Some(rest) = text.strip_prefix("#region") {
        (MarkerKind::RegionStart, rest)
    } else {
        return None;
    };

    let name = rest
        .trim()
        .trim_end_matches("-->")
        .trim_end_matches("*/")
        .split_whitespace()
        .next()
        .unwrap_or("");
    Some(Marker { kind, name })
}

fn is_marker_line(line: &str) -> bool {
    parse_marker(line).is_some()
}

/// Lines strictly between the start and end markers named `name`.
///
/// Returns `None` unless both markers are present in order.
pub(crate) fn extract_named(source: &str, name: &str, region: bool) -> Option<String> {
    let (start_kind, end_kind) = if region {
        (MarkerKind::RegionStart, MarkerKind::RegionEnd)
    } else {
        (MarkerKind::AnchorStart, MarkerKind::AnchorEnd)
    };

    let lines: Vec<&str> = source.lines().collect();
    let is = |line: &str, kind: MarkerKind| {
        parse_marker(line).is_some_and(|m| m.kind == kind && m.name == name)
    };

    let start = lines.iter().position(|line| is(line, start_kind))?;
    let end = lines[start + 1..]
        .iter()
        .position(|line| is(line, end_kind))
        .map(|offset| start + 1 + offset)?;

    let body: Vec<&str> = lines[start + 1..end]
        .iter()
        .copied()
        .filter(|line| !is_marker_line(line))
        .collect();
    Some(finish(&body))
}

/// Whole file with marker lines removed.
pub(crate) fn extract_full(source: &str) -> String {
    let body: Vec<&str> = source.lines().filter(|line| !is_marker_line(line)).collect();
    finish(&body)
}

/// Inclusive 1-based line range with marker lines removed.
pub(crate) fn extract_lines(source: &str, range: LineRange) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let start = range.start.unwrap_or(1).saturating_sub(1).min(lines.len());
    let end = range.end.unwrap_or(lines.len()).clamp(start, lines.len());
    let body: Vec<&str> = lines[start..end]
        .iter()
        .copied()
        .filter(|line| !is_marker_line(line))
        .collect();
    finish(&body)
}

fn finish(lines: &[&str]) -> String {
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    match (first, last) {
        (Some(first), Some(last)) => dedent(&lines[first..=last]),
        _ => String::new(),
    }
}

/// Strip the common leading whitespace of non-blank lines.
///
/// The indent is counted in characters, so mixed Unicode whitespace never
/// splits a code point. Whitespace-only lines become empty.
pub fn dedent(lines: &[&str]) -> String {
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                line.char_indices()
                    .nth(indent)
                    .map_or("", |(idx, _)| &line[idx..])
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Code fence language for a file extension.
pub fn language_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "sw" => "sway",
        "rs" => "rust",
        "ts" => "typescript",
        "tsx" => "tsx",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "jsx",
        "py" => "python",
        "sh" | "bash" => "bash",
        "md" => "markdown",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "graphql" | "gql" => "graphql",
        "sol" => "solidity",
        "go" => "go",
        _ => "text",
    }
}
