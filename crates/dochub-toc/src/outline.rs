//! mdBook `SUMMARY.md` outline parser.
//!
//! A line-oriented state machine over an explicit frame stack. Heading
//! frames nest by heading depth and link frames by indentation; the two
//! spaces are never compared with each other, so links always nest under
//! the closest open heading.

use std::sync::LazyLock;

use regex::Regex;

use crate::node::{TocNode, count_nodes};

/// `- [Title](target)` with any bullet and leading whitespace.
static LIST_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+\[(.*?)\]\((.*?)\)").unwrap());

/// Bare `[Title](target)` prefix/suffix chapters.
static BARE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[(.*?)\]\((.*?)\)\s*$").unwrap());

/// `## Title`, tolerating a missing space after the hashes.
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(#+)\s*(.*?)\s*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    Header,
    Link,
}

struct Frame {
    kind: FrameKind,
    level: usize,
    node: TocNode,
}

/// Stack of open frames. The bottom frame is the root and is never popped.
struct FrameStack {
    frames: Vec<Frame>,
}

impl FrameStack {
    fn new() -> Self {
        Self {
            frames: vec![Frame {
                kind: FrameKind::Root,
                level: 0,
                node: TocNode::header("", 0),
            }],
        }
    }

    fn top(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    /// Close the top frame, attaching its node to the new top.
    fn pop(&mut self) {
        if self.frames.len() <= 1 {
            return;
        }
        if let Some(frame) = self.frames.pop() {
            let parent = self.frames.len() - 1;
            self.frames[parent].node.children.push(frame.node);
        }
    }

    fn pop_while(&mut self, mut should_pop: impl FnMut(&Frame) -> bool) {
        while self.top().kind != FrameKind::Root && should_pop(self.top()) {
            self.pop();
        }
    }

    fn push(&mut self, kind: FrameKind, level: usize, node: TocNode) {
        self.frames.push(Frame { kind, level, node });
    }

    fn finish(mut self) -> Vec<TocNode> {
        while self.frames.len() > 1 {
            self.pop();
        }
        self.frames
            .pop()
            .map(|root| root.node.children)
            .unwrap_or_default()
    }
}

/// Outline parser with a configurable indentation unit.
#[derive(Debug, Clone, Copy)]
pub struct OutlineParser {
    indent_width: usize,
}

impl Default for OutlineParser {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

impl OutlineParser {
    /// Create a parser counting `indent_width` columns per nesting level.
    ///
    /// A width of zero is treated as one.
    pub fn new(indent_width: usize) -> Self {
        Self {
            indent_width: indent_width.max(1),
        }
    }

    /// Parse outline text into a forest of top-level nodes.
    pub fn parse(&self, text: &str) -> Vec<TocNode> {
        let mut stack = FrameStack::new();
        let mut in_comment = false;

        for raw in text.lines() {
            let line = strip_comments(raw, &mut in_comment);
            if line.trim().is_empty() {
                continue;
            }

            if let Some((title, target)) = match_link(line) {
                let level = self.indent_level(line);
                stack.pop_while(|f| f.kind == FrameKind::Link && f.level >= level);
                stack.push(
                    FrameKind::Link,
                    level,
                    TocNode::link(title, target, level),
                );
            } else if let Some(caps) = HEADING.captures(line) {
                let depth = caps[1].len();
                let title = caps[2].trim_end_matches('#').trim();
                if title.is_empty() || (depth == 1 && title.eq_ignore_ascii_case("summary")) {
                    continue;
                }
                stack.pop_while(|f| f.kind == FrameKind::Link || f.level >= depth);
                stack.push(FrameKind::Header, depth, TocNode::header(title, depth));
            }
        }

        let nodes = stack.finish();
        tracing::debug!(nodes = count_nodes(&nodes), "Parsed outline");
        nodes
    }

    /// Nesting level from leading whitespace. Tabs count as one full unit.
    fn indent_level(&self, line: &str) -> usize {
        let columns: usize = line
            .chars()
            .take_while(|c| c.is_whitespace())
            .map(|c| if c == '\t' { self.indent_width } else { 1 })
            .sum();
        columns / self.indent_width
    }
}

/// Drop HTML comments that open at the start of a line or continue from a
/// previous line. Returns the text left after the last closed comment.
fn strip_comments<'a>(line: &'a str, in_comment: &mut bool) -> &'a str {
    let mut rest = line;
    if *in_comment {
        let Some(idx) = rest.find("-->") else {
            return "";
        };
        *in_comment = false;
        rest = &rest[idx + 3..];
    }
    while let Some(body) = rest.trim_start().strip_prefix("<!--") {
        let Some(idx) = body.find("-->") else {
            *in_comment = true;
            return "";
        };
        rest = &body[idx + 3..];
    }
    rest
}

/// Parse outline text with the default two-space indentation unit.
pub fn parse_outline(text: &str) -> Vec<TocNode> {
    OutlineParser::default().parse(text)
}

fn match_link(line: &str) -> Option<(String, Option<String>)> {
    let caps = LIST_LINK
        .captures(line)
        .or_else(|| BARE_LINK.captures(line))?;
    let title = caps[1].trim().to_owned();
    let target = caps[2].trim();
    let target = (!target.is_empty()).then(|| target.to_owned());
    Some((title, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TocKind;
    use pretty_assertions::assert_eq;

    fn link(title: &str, target: &str, level: usize) -> TocNode {
        TocNode::link(title, Some(target.to_owned()), level)
    }

    #[test]
    fn test_parse_flat_list() {
        let nodes = parse_outline("- [A](a.md)\n- [B](b.md)\n");
        assert_eq!(nodes, vec![link("A", "a.md", 0), link("B", "b.md", 0)]);
    }

    #[test]
    fn test_parse_nested_list() {
        let text = "\
- [Guide](guide/index.md)
  - [Setup](guide/setup.md)
    - [Linux](guide/linux.md)
  - [Usage](guide/usage.md)
- [Reference](ref.md)
";
        let nodes = parse_outline(text);
        assert_eq!(
            nodes,
            vec![
                link("Guide", "guide/index.md", 0).with_children(vec![
                    link("Setup", "guide/setup.md", 1)
                        .with_children(vec![link("Linux", "guide/linux.md", 2)]),
                    link("Usage", "guide/usage.md", 1),
                ]),
                link("Reference", "ref.md", 0),
            ]
        );
    }

    #[test]
    fn test_links_nest_under_headers() {
        let text = "\
# Summary

[Introduction](README.md)

# Basics

- [Variables](basics/variables.md)
- [Functions](basics/functions.md)

# Advanced

- [Generics](advanced/generics.md)
";
        let nodes = parse_outline(text);
        assert_eq!(
            nodes,
            vec![
                link("Introduction", "README.md", 0),
                TocNode::header("Basics", 1).with_children(vec![
                    link("Variables", "basics/variables.md", 0),
                    link("Functions", "basics/functions.md", 0),
                ]),
                TocNode::header("Advanced", 1)
                    .with_children(vec![link("Generics", "advanced/generics.md", 0)]),
            ]
        );
    }

    #[test]
    fn test_subheaders_nest_by_depth() {
        let text = "# Part\n## Chapter\n- [A](a.md)\n## Other\n- [B](b.md)\n# Next\n";
        let nodes = parse_outline(text);
        assert_eq!(nodes.len(), 2);
        let part = &nodes[0];
        assert_eq!(part.children.len(), 2);
        assert_eq!(part.children[0].title, "Chapter");
        assert_eq!(part.children[0].children[0].title, "A");
        assert_eq!(part.children[1].title, "Other");
        assert_eq!(part.children[1].children[0].title, "B");
        assert_eq!(nodes[1].title, "Next");
    }

    #[test]
    fn test_heading_without_space() {
        let nodes = parse_outline("#Reference\n- [A](a.md)\n");
        assert_eq!(nodes[0].kind, TocKind::Header);
        assert_eq!(nodes[0].title, "Reference");
        assert_eq!(nodes[0].level, 1);
        assert_eq!(nodes[0].children, vec![link("A", "a.md", 0)]);
    }

    #[test]
    fn test_comments_skipped() {
        let text = "\
<!-- - [Hidden](hidden.md) -->
- [A](a.md)
<!--
# Not a header
- [Also hidden](x.md)
-->
- [B](b.md)
";
        let nodes = parse_outline(text);
        assert_eq!(nodes, vec![link("A", "a.md", 0), link("B", "b.md", 0)]);
    }

    #[test]
    fn test_entries_after_closing_comment_are_parsed() {
        let text = "\
- [A](a.md)
<!--
- [Hidden](x.md)
--> - [B](b.md)
<!-- note --> - [C](c.md)
";
        let nodes = parse_outline(text);
        assert_eq!(
            nodes,
            vec![link("A", "a.md", 0), link("B", "b.md", 0), link("C", "c.md", 0)]
        );
    }

    #[test]
    fn test_strip_comments_tracks_state() {
        let mut in_comment = false;
        assert_eq!(strip_comments("<!-- open", &mut in_comment), "");
        assert!(in_comment);
        assert_eq!(strip_comments("still hidden", &mut in_comment), "");
        assert_eq!(strip_comments("done --> tail", &mut in_comment), " tail");
        assert!(!in_comment);
        assert_eq!(strip_comments("- [A](a.md)", &mut in_comment), "- [A](a.md)");
    }

    #[test]
    fn test_prose_ignored() {
        let text = "Some intro text.\n\n---\n- [A](a.md)\n";
        assert_eq!(parse_outline(text), vec![link("A", "a.md", 0)]);
    }

    #[test]
    fn test_star_bullets_and_draft_chapters() {
        let nodes = parse_outline("* [A](a.md)\n  * [Draft]()\n");
        assert_eq!(
            nodes,
            vec![link("A", "a.md", 0).with_children(vec![TocNode::link("Draft", None, 1)])]
        );
    }

    #[test]
    fn test_dedent_pops_to_matching_level() {
        let text = "- [A](a.md)\n    - [Deep](deep.md)\n  - [Mid](mid.md)\n";
        let nodes = parse_outline(text);
        assert_eq!(nodes.len(), 1);
        let titles: Vec<_> = nodes[0].children.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Deep", "Mid"]);
    }

    #[test]
    fn test_custom_indent_width() {
        let text = "- [A](a.md)\n    - [B](b.md)\n";
        let nodes = OutlineParser::new(4).parse(text);
        assert_eq!(nodes[0].children, vec![link("B", "b.md", 1)]);
    }

    #[test]
    fn test_tabs_count_as_unit() {
        let nodes = parse_outline("- [A](a.md)\n\t- [B](b.md)\n");
        assert_eq!(nodes[0].children, vec![link("B", "b.md", 1)]);
    }

    #[test]
    fn test_unclosed_frames_are_flushed() {
        let nodes = parse_outline("# Part\n- [A](a.md)\n  - [B](b.md)");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].children[0].children[0].title, "B");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_outline("").is_empty());
        assert!(parse_outline("\n\n   \n").is_empty());
    }
}
