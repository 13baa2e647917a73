// Protected search and replace over markup source
// Literal replacement that never touches link/image destinations or
// attribute blocks, so rewriting prose cannot corrupt the document's
// metadata syntax.

use regex::{NoExpand, Regex, RegexBuilder};
use std::ops::Range;

/// What a protected span shields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// A `{: ... }` attribute block.
    AttributeBlock,
    /// The destination part of `[label](destination)` or `![label](destination)`.
    LinkDestination,
}

/// A byte range of the markup that replacement must leave untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedSpan {
    pub range: Range<usize>,
    pub kind: SpanKind,
}

/// Collect the spans of `markup` that are shielded from replacement,
/// sorted by position.
///
/// Attribute blocks are collected first. Link/image destinations are then
/// matched against a copy of the markup with every attribute-block byte
/// blanked out, so a bracket or paren inside an attribute block cannot
/// terminate the destination pattern. An attribute block overlapping a
/// destination therefore keeps its AttributeBlock identity, and unbalanced
/// markup simply fails to match and stays replaceable.
pub fn protected_spans(markup: &str) -> Vec<ProtectedSpan> {
    let attr_re = Regex::new(r"\{:.*?\}").unwrap();
    let mut spans: Vec<ProtectedSpan> = attr_re
        .find_iter(markup)
        .map(|m| ProtectedSpan {
            range: m.range(),
            kind: SpanKind::AttributeBlock,
        })
        .collect();

    // Blank out attribute blocks before looking for destinations. Match
    // ranges sit on char boundaries and 0x01 is ASCII, so offsets into the
    // masked copy are offsets into the original.
    let mut masked = markup.as_bytes().to_vec();
    for span in &spans {
        for byte in &mut masked[span.range.clone()] {
            *byte = 0x01;
        }
    }
    let masked = String::from_utf8(masked).unwrap();

    let link_re = Regex::new(r"!?\[.*?\]\((.*?)\)").unwrap();
    for captures in link_re.captures_iter(&masked) {
        if let Some(destination) = captures.get(1) {
            spans.push(ProtectedSpan {
                range: destination.range(),
                kind: SpanKind::LinkDestination,
            });
        }
    }

    spans.sort_by_key(|s| (s.range.start, s.range.end));
    spans
}

/// Replace every occurrence of the literal `search_text` with
/// `replace_text`, leaving attribute blocks and link/image destinations
/// untouched. `search_text` is matched literally regardless of content;
/// the replacement is inserted literally as well. Matches never cross a
/// protected-span boundary. An empty `search_text` is a no-op.
pub fn safe_replace(
    markup: &str,
    search_text: &str,
    replace_text: &str,
    case_sensitive: bool,
) -> String {
    if search_text.is_empty() {
        return markup.to_string();
    }

    let matcher = RegexBuilder::new(&regex::escape(search_text))
        .case_insensitive(!case_sensitive)
        .build()
        .unwrap();

    let mut result = String::with_capacity(markup.len());
    let mut pos = 0;

    for span in protected_spans(markup) {
        // Spans may nest or overlap (an attribute block inside a
        // destination); only the part past `pos` is still pending
        if span.range.end <= pos {
            continue;
        }
        let start = span.range.start.max(pos);
        if start > pos {
            result.push_str(&matcher.replace_all(&markup[pos..start], NoExpand(replace_text)));
        }
        result.push_str(&markup[start..span.range.end]);
        pos = span.range.end;
    }
    result.push_str(&matcher.replace_all(&markup[pos..], NoExpand(replace_text)));

    result
}
