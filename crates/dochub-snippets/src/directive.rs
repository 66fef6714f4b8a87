//! Lexical pre-pass locating include directives.
//!
//! Two families are recognized:
//!
//! - mdBook: `{{#include path}}`, `{{#include path:anchor}}`,
//!   `{{#include path:10:20}}` (also `#rustdoc_include`), anywhere in a line
//! - VitePress: `<<< @/path#region{lang}` at the start of a line
//!
//! Scanning produces `(span, directive)` records in document order before
//! anything is substituted.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static MDBOOK_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{#(?:include|rustdoc_include)\s+([^}:]+?)(?::([^}]+))?\s*\}\}").unwrap()
});

static VITEPRESS_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*<<<\s*([^#{\s>\[]+)(?:#([^\s{>\[]+))?(?:\{([^}]*)\})?").unwrap()
});

/// Inclusive 1-based line range. Open ends run to the file boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl LineRange {
    /// Parse `N`, `N:M`, `N:` or `:M`. Returns `None` for anchor names.
    fn parse(selector: &str) -> Option<Self> {
        if !selector.chars().all(|c| c.is_ascii_digit() || c == ':') {
            return None;
        }
        let number = |s: &str| (!s.is_empty()).then(|| s.parse::<usize>().ok()).flatten();
        match selector.split_once(':') {
            None => {
                let line = number(selector)?;
                Some(Self {
                    start: Some(line),
                    end: Some(line),
                })
            }
            Some((start, end)) => Some(Self {
                start: number(start),
                end: number(end),
            }),
        }
    }
}

/// What part of the referenced file to include.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetKind {
    FullFile,
    /// `ANCHOR: name` / `ANCHOR_END: name`.
    Anchor,
    /// `#region name` / `#endregion name`.
    Region,
    Lines(LineRange),
}

/// A parsed include request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetDirective {
    pub kind: SnippetKind,
    /// Path exactly as written in the directive.
    pub relative_path: String,
    /// Anchor or region name.
    pub selector: Option<String>,
    pub language_hint: Option<String>,
    /// Whether the directive sits inside a fenced code block.
    pub in_fence: bool,
    /// Leading whitespace of the directive's line.
    pub indent: String,
}

/// Locate every directive in `content`, in document order.
pub fn scan_directives(content: &str) -> Vec<(Range<usize>, SnippetDirective)> {
    let mut found = Vec::new();
    let mut fence: Option<String> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let body = line.trim_end_matches(['\n', '\r']);
        let trimmed = body.trim_start();

        if let Some(marker) = &fence {
            if trimmed.starts_with(marker.as_str()) && trimmed[marker.len()..].trim().is_empty() {
                fence = None;
                continue;
            }
        } else if let Some(marker) = fence_opener(trimmed) {
            fence = Some(marker);
            continue;
        }
        let in_fence = fence.is_some();
        let indent = &body[..body.len() - trimmed.len()];

        if let Some(caps) = VITEPRESS_IMPORT.captures(body) {
            let hint = caps.get(3).and_then(|m| language_from_options(m.as_str()));
            let selector = caps.get(2).map(|m| m.as_str().to_owned());
            found.push((
                line_start + indent.len()..line_start + body.len(),
                SnippetDirective {
                    kind: if selector.is_some() {
                        SnippetKind::Region
                    } else {
                        SnippetKind::FullFile
                    },
                    relative_path: caps[1].to_owned(),
                    selector,
                    language_hint: hint,
                    in_fence,
                    indent: indent.to_owned(),
                },
            ));
            continue;
        }

        for caps in MDBOOK_INCLUDE.captures_iter(body) {
            let Some(whole) = caps.get(0) else { continue };
            let selector = caps.get(2).map(|m| m.as_str().trim().to_owned());
            let kind = match selector.as_deref() {
                None => SnippetKind::FullFile,
                Some(sel) => LineRange::parse(sel).map_or(SnippetKind::Anchor, SnippetKind::Lines),
            };
            let selector = match kind {
                SnippetKind::Anchor => selector,
                _ => None,
            };
            found.push((
                line_start + whole.start()..line_start + whole.end(),
                SnippetDirective {
                    kind,
                    relative_path: caps[1].trim().to_owned(),
                    selector,
                    language_hint: None,
                    in_fence,
                    indent: indent.to_owned(),
                },
            ));
        }
    }

    found
}

fn fence_opener(trimmed: &str) -> Option<String> {
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run: String = trimmed.chars().take_while(|c| *c == ch).collect();
    (run.len() >= 3).then_some(run)
}

/// Language from a VitePress `{...}` option block such as `{ts}` or `{1,3 ts:line-numbers}`.
fn language_from_options(options: &str) -> Option<String> {
    options
        .split_whitespace()
        .map(|token| token.split(':').next().unwrap_or(token))
        .find(|token| {
            !token.is_empty()
                && token.chars().all(|c| c.is_ascii_alphanumeric())
                && !token.chars().all(|c| c.is_ascii_digit())
        })
        .map(str::to_owned)
}
