// Literal search over the flattened document text
// Tries the raw query first, then progressively normalized spellings, and
// finally the zero-width-stripped view of the text with hits mapped back
// to raw offsets. All offsets are character offsets, not byte offsets.

use regex::{Regex, RegexBuilder};

use crate::normalize::{find_original_position, generate_search_variants, strip_zero_width};

/// One occurrence, as a half-open char range `[start_index, end_index)`
/// into the flattened text. `search_str` is the variant that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub start_index: usize,
    pub end_index: usize,
    pub search_str: String,
}

/// Find all occurrences of the literal `query` in `flattened`.
///
/// Each search variant is tried in order; the first variant with hits
/// wins. When no variant matches directly and the text contains
/// zero-width characters, the variants are retried against the stripped
/// text and the hits mapped back through `find_original_position`.
/// Returns an empty vec when nothing matches.
pub fn find_matches(flattened: &str, query: &str, case_sensitive: bool) -> Vec<SearchMatch> {
    let variants = generate_search_variants(query);

    for variant in &variants {
        let matches = match_literal(flattened, variant, case_sensitive);
        if !matches.is_empty() {
            return matches;
        }
    }

    let normalized = strip_zero_width(flattened);
    if normalized.len() == flattened.len() {
        return Vec::new();
    }

    for variant in &variants {
        let found = match_literal(&normalized, variant, case_sensitive);
        if found.is_empty() {
            continue;
        }
        let mapped: Vec<SearchMatch> = found
            .into_iter()
            .filter_map(|m| {
                let start_index = find_original_position(flattened, m.start_index)?;
                let end_index = find_original_position(flattened, m.end_index)?;
                Some(SearchMatch {
                    start_index,
                    end_index,
                    search_str: m.search_str,
                })
            })
            .collect();
        if !mapped.is_empty() {
            return mapped;
        }
    }

    Vec::new()
}

// Escaping makes construction infallible
fn literal_matcher(needle: &str, case_sensitive: bool) -> Regex {
    RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(!case_sensitive)
        .build()
        .unwrap()
}

fn match_literal(haystack: &str, needle: &str, case_sensitive: bool) -> Vec<SearchMatch> {
    if needle.is_empty() {
        return Vec::new();
    }
    let matcher = literal_matcher(needle, case_sensitive);

    let mut matches = Vec::new();
    let mut char_pos = 0;
    let mut byte_pos = 0;
    for m in matcher.find_iter(haystack) {
        char_pos += haystack[byte_pos..m.start()].chars().count();
        let match_chars = haystack[m.start()..m.end()].chars().count();
        matches.push(SearchMatch {
            start_index: char_pos,
            end_index: char_pos + match_chars,
            search_str: needle.to_string(),
        });
        char_pos += match_chars;
        byte_pos = m.end();
    }
    matches
}
