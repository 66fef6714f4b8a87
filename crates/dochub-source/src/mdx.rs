//! MDX to plain markdown.
//!
//! Module syntax is removed and JSX components are replaced by HTML
//! comments naming the component. Fenced code blocks are left untouched.

use std::sync::LazyLock;

use regex::Regex;

static IMPORT_FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bfrom\s+['"][^'"]*['"]\s*;?\s*$"#).unwrap());

static SIDE_EFFECT_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^import\s+['"][^'"]*['"]\s*;?\s*$"#).unwrap());

/// Strip MDX-only constructs from `content`.
pub fn strip_mdx(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut fence: Option<String> = None;
    let mut in_import = false;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();

        if let Some(marker) = &fence {
            if trimmed.starts_with(marker.as_str()) {
                fence = None;
            }
            out.push_str(line);
            continue;
        }
        if let Some(marker) = fence_marker(trimmed) {
            fence = Some(marker);
            out.push_str(line);
            continue;
        }

        if in_import {
            in_import = !IMPORT_FROM.is_match(trimmed);
            continue;
        }
        if trimmed.starts_with("import ") || trimmed.starts_with("import{") {
            if !IMPORT_FROM.is_match(trimmed) && !SIDE_EFFECT_IMPORT.is_match(trimmed) {
                in_import = true;
            }
            continue;
        }
        if trimmed.starts_with("export default") {
            continue;
        }

        out.push_str(&replace_components(line));
    }

    out
}

/// Opening fence marker (run of backticks or tildes) of a code block line.
fn fence_marker(trimmed: &str) -> Option<String> {
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run: String = trimmed.chars().take_while(|c| *c == ch).collect();
    (run.len() >= 3).then_some(run)
}

/// Replace same-line `<Name ...>...</Name>` and `<Name ... />` elements.
fn replace_components(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(start) = find_component_start(rest) {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let name_len = tail[1..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '.' || c == '_'))
            .unwrap_or(tail.len() - 1);
        let name = &tail[1..=name_len];

        let Some(open_end) = tail.find('>') else {
            out.push_str(tail);
            return out;
        };

        let consumed = if tail[..open_end].ends_with('/') {
            Some(open_end + 1)
        } else {
            let closing = format!("</{name}>");
            tail[open_end..]
                .find(&closing)
                .map(|idx| open_end + idx + closing.len())
        };

        match consumed {
            Some(len) => {
                out.push_str("<!-- ");
                out.push_str(name);
                out.push_str(" component here -->");
                rest = &tail[len..];
            }
            None => {
                out.push_str(&tail[..=open_end]);
                rest = &tail[open_end + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn find_component_start(text: &str) -> Option<usize> {
    text.char_indices()
        .find(|&(idx, c)| {
            c == '<'
                && text[idx + 1..]
                    .chars()
                    .next()
                    .is_some_and(|n| n.is_ascii_uppercase())
        })
        .map(|(idx, _)| idx)
}
