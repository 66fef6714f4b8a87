//! Extraction of a `sidebar:` literal from a VitePress config module.
//!
//! The config is never evaluated. The literal is located textually, cut
//! out by bracket balancing and rewritten into JSON. Anything that needs
//! evaluation (variables, spreads, interpolated templates) is rejected.

use std::iter::Peekable;
use std::str::Chars;
use std::sync::LazyLock;

use regex::Regex;

use crate::TocError;

static SIDEBAR_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bsidebar['"]?\s*:"#).unwrap());

/// Find the `sidebar:` value in a config module and return its source text.
pub fn extract_sidebar_literal(source: &str) -> Result<&str, TocError> {
    let key = SIDEBAR_KEY.find(source).ok_or(TocError::MissingSidebar)?;
    let rest = &source[key.end()..];
    let offset = key.end() + (rest.len() - rest.trim_start().len());
    let value = &source[offset..];

    match value.chars().next() {
        Some('[' | '{') => {}
        _ => {
            let token: String = value
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
                .collect();
            return Err(TocError::Unsupported(token));
        }
    }

    let end = balanced_end(value).ok_or(TocError::Unbalanced(offset))?;
    Ok(&value[..end])
}

/// Byte length of the bracketed value at the start of `text`.
fn balanced_end(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            quote @ (b'\'' | b'"' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Rewrite a JS object/array literal as JSON.
///
/// Handles bare keys, single-quoted and plain template strings, comments
/// and trailing commas.
pub fn js_literal_to_json(literal: &str) -> Result<String, TocError> {
    let mut out = String::with_capacity(literal.len() + literal.len() / 4);
    let mut chars = literal.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
            }
            '\'' | '"' | '`' => {
                let content = read_string(&mut chars, c)?;
                push_json_string(&mut out, &content);
            }
            ']' | '}' => {
                let trimmed = out.trim_end().len();
                if out[..trimmed].ends_with(',') {
                    out.truncate(trimmed - 1);
                }
                out.push(c);
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let mut ident = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' || next == '$' {
                        ident.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if matches!(ident.as_str(), "true" | "false" | "null") {
                    out.push_str(&ident);
                } else if next_non_space(&chars) == Some(':') {
                    push_json_string(&mut out, &ident);
                } else {
                    return Err(TocError::Unsupported(ident));
                }
            }
            '.' if chars.peek() == Some(&'.') => {
                return Err(TocError::Unsupported("...".to_owned()));
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn next_non_space(chars: &Peekable<Chars<'_>>) -> Option<char> {
    chars.clone().find(|c| !c.is_whitespace())
}

/// Read string contents up to the closing `quote`, decoding escapes.
fn read_string(chars: &mut Peekable<Chars<'_>>, quote: char) -> Result<String, TocError> {
    let mut content = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => content.push('\n'),
                Some('t') => content.push('\t'),
                Some(escaped) => content.push(escaped),
                None => break,
            },
            '$' if quote == '`' && chars.peek() == Some(&'{') => {
                return Err(TocError::Unsupported("template interpolation".to_owned()));
            }
            c if c == quote => return Ok(content),
            c => content.push(c),
        }
    }
    Err(TocError::Unsupported(format!("unterminated string {quote}{content}")))
}

fn push_json_string(out: &mut String, content: &str) {
    out.push('"');
    for c in content.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}
