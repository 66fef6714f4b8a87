//! Byte-range edits applied in one pass.

use std::ops::Range;

/// Collects replacements keyed by byte range in the original text.
///
/// Edits are applied back-to-front so earlier ranges stay valid while
/// later ones are rewritten. An edit overlapping one already accepted
/// is dropped.
#[derive(Debug, Default)]
pub struct SpanEdits {
    items: Vec<(Range<usize>, String)>,
}

impl SpanEdits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a replacement of `range` with `text`.
    pub fn add(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.items.push((range, text.into()));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Apply every edit to `text`, consuming the collector.
    pub fn apply(mut self, text: &str) -> String {
        if self.items.is_empty() {
            return text.to_owned();
        }

        self.items.sort_by(|a, b| b.0.start.cmp(&a.0.start));
        let mut out = text.to_owned();
        let mut floor = usize::MAX;
        for (range, replacement) in self.items {
            if range.end > floor || range.end > text.len() || range.start > range.end {
                tracing::debug!(?range, "Dropping overlapping edit");
                continue;
            }
            out.replace_range(range.clone(), &replacement);
            floor = range.start;
        }
        out
    }
}
