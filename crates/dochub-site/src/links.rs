//! Cross-document link rewriting inside document bodies.

use dochub_snippets::SpanEdits;
use dochub_source::Document;
use pulldown_cmark::{Event, LinkType, Options, Parser, Tag};

use crate::resolver::{LinkResolver, Resolution};

/// Relative URL from one canonical page to another.
///
/// Both paths are relative to the output root. The last segment of `from`
/// is the current document; a trailing slash marks a directory.
///
/// ```
/// use dochub_site::relative_link;
///
/// assert_eq!(relative_link("x/guide/a.md", "x/guide/b.md"), "b.md");
/// assert_eq!(relative_link("x/a.md", "y/b.md#top"), "../y/b.md#top");
/// ```
pub fn relative_link(from: &str, to: &str) -> String {
    let (to_path, fragment) = match to.find('#') {
        Some(idx) => to.split_at(idx),
        None => (to, ""),
    };
    let from_segs: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_segs: Vec<&str> = to_path.split('/').filter(|s| !s.is_empty()).collect();

    let from_dir = if from.ends_with('/') || from_segs.is_empty() {
        &from_segs[..]
    } else {
        &from_segs[..from_segs.len() - 1]
    };

    let common = from_dir
        .iter()
        .zip(&to_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = "../".repeat(from_dir.len() - common);
    let down = to_segs[common..].join("/");
    let path = format!("{ups}{down}");
    if path.is_empty() {
        format!("./{fragment}")
    } else {
        format!("{path}{fragment}")
    }
}

/// Rewrite inline links in a document body through the link map.
///
/// Only links that resolve are touched; they become relative to the
/// document's canonical location. Code spans and blocks are never scanned.
pub fn rewrite_body_links(doc: &Document, resolver: &LinkResolver<'_>) -> String {
    let content = doc.content.as_str();
    let mut edits = SpanEdits::new();

    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_GFM;
    for (event, range) in Parser::new_ext(content, options).into_offset_iter() {
        let Event::Start(Tag::Link {
            link_type: LinkType::Inline,
            dest_url,
            ..
        }) = event
        else {
            continue;
        };
        let dest = dest_url.as_ref();
        if dest.is_empty() {
            continue;
        }

        match resolver.resolve(dest, Some(doc.original_dir())) {
            Resolution::Found(canonical) => {
                if let Some(span) = destination_span(&content[range.clone()], dest) {
                    let start = range.start + span.start;
                    let end = range.start + span.end;
                    edits.add(start..end, relative_link(&doc.canonical_path, &canonical));
                }
            }
            Resolution::Missing(_) => {
                tracing::debug!(
                    document = %doc.original_path,
                    target = %dest,
                    "Body link left unresolved"
                );
            }
            Resolution::Passthrough(_) => {}
        }
    }

    if edits.is_empty() {
        return content.to_owned();
    }
    edits.apply(content)
}

/// Byte range of the destination inside the source text of one link.
fn destination_span(link_source: &str, dest: &str) -> Option<std::ops::Range<usize>> {
    link_source
        .match_indices("](")
        .map(|(idx, _)| idx + 2)
        .filter_map(|after| {
            let rest = &link_source[after..];
            let skipped = rest.len() - rest.trim_start().len();
            let mut start = after + skipped;
            if link_source[start..].starts_with('<') {
                start += 1;
            }
            link_source[start..]
                .starts_with(dest)
                .then_some(start..start + dest.len())
        })
        .last()
}
